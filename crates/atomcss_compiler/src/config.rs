use atomcss_core::{is_css_identifier, ConditionTable, UnitTable};
use serde::{Deserialize, Serialize};

use crate::errors::{CompileError, CompileResult};

/// How atomic class names are derived from a rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClassNameStrategy {
  /// Reversible base32hex encoding of the rule; distinct rules never share a name.
  #[default]
  Encoded,
  /// Eight base36 characters of murmurhash. Short, but a collision is
  /// possible and fails the call site that causes it.
  Hashed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerConfig {
  ///
  /// Replaces the leading `_` of every generated class name.
  /// Useful in micro frontend environments to avoid clashing classes.
  ///
  /// Defaults to `"_"`
  ///
  #[serde(default = "default_class_name_prefix")]
  pub class_name_prefix: String,
  ///
  /// Defaults to `encoded`
  ///
  #[serde(default)]
  pub class_name_strategy: ClassNameStrategy,
  ///
  /// Recognized scope keys and their relative priority.
  ///
  #[serde(default)]
  pub conditions: ConditionTable,
  ///
  /// Units appended to bare numbers.
  ///
  #[serde(default)]
  pub units: UnitTable,
}

fn default_class_name_prefix() -> String {
  "_".to_string()
}

impl Default for CompilerConfig {
  fn default() -> Self {
    Self {
      class_name_prefix: default_class_name_prefix(),
      class_name_strategy: ClassNameStrategy::default(),
      conditions: ConditionTable::default(),
      units: UnitTable::default(),
    }
  }
}

impl CompilerConfig {
  pub fn from_json(json: &str) -> CompileResult<Self> {
    let config: CompilerConfig =
      serde_json::from_str(json).map_err(|error| CompileError::invalid_config(error.to_string()))?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> CompileResult<()> {
    if !is_css_identifier(&self.class_name_prefix) {
      return Err(CompileError::invalid_config(format!(
        "class name prefix '{}' is not a valid CSS identifier",
        self.class_name_prefix
      )));
    }

    self
      .conditions
      .validate()
      .map_err(CompileError::invalid_config)?;

    for (property, unit) in &self.units.units {
      if unit.is_empty() || !unit.chars().all(|ch| ch.is_ascii_alphabetic() || ch == '%') {
        return Err(CompileError::invalid_config(format!(
          "unit '{}' for '{}' is not a CSS unit",
          unit, property
        )));
      }
    }

    Ok(())
  }
}
