use serde::Serialize;

pub type CompileResult<T> = Result<T, CompileError>;

/// Failures raised while compiling a call site.
///
/// Only [`CompileError::UnsupportedDynamicValue`] is non-fatal; it is reported
/// through [`crate::CompileOutput::diagnostics`] rather than returned as `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CompileError {
  #[error("malformed declaration at {}: {reason}", display_path(.path))]
  MalformedDeclaration { path: Vec<String>, reason: String },

  #[error("'{property}' uses the runtime expression '{expression}' and is applied as an inline style")]
  UnsupportedDynamicValue {
    property: String,
    expression: String,
  },

  #[error("class name '{class_name}' is claimed by both {existing} and {incoming}")]
  #[serde(rename_all = "camelCase")]
  ClassNameCollision {
    class_name: String,
    existing: String,
    incoming: String,
  },

  #[error("invalid config: {reason}")]
  InvalidConfig { reason: String },
}

impl CompileError {
  pub fn malformed(path: &[String], reason: impl Into<String>) -> Self {
    CompileError::MalformedDeclaration {
      path: path.to_vec(),
      reason: reason.into(),
    }
  }

  pub fn invalid_config(reason: impl Into<String>) -> Self {
    CompileError::InvalidConfig {
      reason: reason.into(),
    }
  }

  pub fn is_fatal(&self) -> bool {
    !matches!(self, CompileError::UnsupportedDynamicValue { .. })
  }
}

fn display_path(path: &[String]) -> String {
  if path.is_empty() {
    "<root>".to_string()
  } else {
    path.join(" > ")
  }
}
