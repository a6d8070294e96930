use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{CompileError, CompileResult};

/// A reference to a value only known at runtime, written `{"$dynamic": "props.width"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DynamicValue {
  #[serde(rename = "$dynamic")]
  pub expression: String,
}

/// One value of a [`Declaration`], before normalization.
///
/// Variants are tried in order when deserializing, so anything that is not a
/// string, number, list, dynamic reference or object lands in `Invalid` and
/// is rejected by the normalizer with a useful path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeclarationValue {
  Dynamic(DynamicValue),
  Number(f64),
  Str(String),
  List(Vec<DeclarationValue>),
  Scope(Declaration),
  Invalid(serde_json::Value),
}

impl From<&str> for DeclarationValue {
  fn from(value: &str) -> Self {
    DeclarationValue::Str(value.to_string())
  }
}

impl From<String> for DeclarationValue {
  fn from(value: String) -> Self {
    DeclarationValue::Str(value)
  }
}

impl From<f64> for DeclarationValue {
  fn from(value: f64) -> Self {
    DeclarationValue::Number(value)
  }
}

impl From<i32> for DeclarationValue {
  fn from(value: i32) -> Self {
    DeclarationValue::Number(f64::from(value))
  }
}

impl<T: Into<DeclarationValue>> From<Vec<T>> for DeclarationValue {
  fn from(values: Vec<T>) -> Self {
    DeclarationValue::List(values.into_iter().map(Into::into).collect())
  }
}

impl From<Declaration> for DeclarationValue {
  fn from(declaration: Declaration) -> Self {
    DeclarationValue::Scope(declaration)
  }
}

/// The styles declared at one call site: property names and condition keys
/// (`:hover`, `::before`, `@media (...)`) in authoring order.
///
/// Setting a key twice keeps its original position and the later value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Declaration {
  entries: IndexMap<String, DeclarationValue>,
}

impl Declaration {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_json(json: &str) -> CompileResult<Self> {
    serde_json::from_str(json)
      .map_err(|error| CompileError::malformed(&[], format!("not a declaration object: {}", error)))
  }

  pub fn property(mut self, name: impl Into<String>, value: impl Into<DeclarationValue>) -> Self {
    self.entries.insert(name.into(), value.into());
    self
  }

  pub fn scope(mut self, condition: impl Into<String>, declaration: Declaration) -> Self {
    self
      .entries
      .insert(condition.into(), DeclarationValue::Scope(declaration));
    self
  }

  pub fn dynamic(mut self, name: impl Into<String>, expression: impl Into<String>) -> Self {
    self.entries.insert(
      name.into(),
      DeclarationValue::Dynamic(DynamicValue {
        expression: expression.into(),
      }),
    );
    self
  }

  pub fn entries(&self) -> impl Iterator<Item = (&str, &DeclarationValue)> {
    self.entries.iter().map(|(key, value)| (key.as_str(), value))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
