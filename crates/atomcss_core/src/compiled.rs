use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::precedence::SpecificityRank;
use crate::property::is_normalized_property_name;
use crate::units::{NumberUnit, UnitTable};

/// Version stamp serialized under `$$atomcss`; objects without it are foreign.
pub const COMPILED_MARKER: u32 = 1;

static BASE_RANK: SpecificityRank = SpecificityRank::base();

/// A compiled object was not produced by the compiler, or was altered since.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid compiled style: {reason}")]
pub struct InvalidCompiledStyle {
  pub reason: String,
}

impl InvalidCompiledStyle {
  pub fn new(reason: impl Into<String>) -> Self {
    Self {
      reason: reason.into(),
    }
  }
}

/// How one property of a compiled style group is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PropertyStyle {
  /// A single unconditional atomic class.
  #[serde(rename_all = "camelCase")]
  Static { class_name: String },
  /// Conditional variants (optionally including the base one), ordered by rank.
  Conditional { variants: Vec<ConditionalVariant> },
  /// A value only known at runtime; applied as an inline style.
  Dynamic {
    expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    /// Unit the compiler would have given a number for this property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit: Option<NumberUnit>,
  },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalVariant {
  pub condition_path: Vec<String>,
  pub rank: SpecificityRank,
  pub class_name: String,
}

/// A value supplied at render time for a dynamic property.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeValue {
  Text(String),
  Number(f64),
}

impl From<&str> for RuntimeValue {
  fn from(value: &str) -> Self {
    RuntimeValue::Text(value.to_string())
  }
}

impl From<String> for RuntimeValue {
  fn from(value: String) -> Self {
    RuntimeValue::Text(value)
  }
}

impl From<f64> for RuntimeValue {
  fn from(value: f64) -> Self {
    RuntimeValue::Number(value)
  }
}

impl From<i32> for RuntimeValue {
  fn from(value: i32) -> Self {
    RuntimeValue::Number(f64::from(value))
  }
}

/// One (property, condition) fact of a compiled object, in object order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleEntry<'a> {
  pub property: &'a str,
  pub condition_path: &'a [String],
  pub rank: &'a SpecificityRank,
  pub value: EntryValue<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryValue<'a> {
  Class(&'a str),
  Dynamic {
    expression: &'a str,
    value: Option<&'a str>,
  },
}

/// The compiled representation of one declared style group.
///
/// Instances are only created by the compiler, by [`CompiledStyleObject::from_json`]
/// or by binding dynamic values; all of them validate the shape, so the merge
/// engine can trust what it receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledStyleObject {
  #[serde(rename = "$$atomcss")]
  marker: u32,
  properties: IndexMap<String, PropertyStyle>,
}

impl CompiledStyleObject {
  pub fn new(properties: IndexMap<String, PropertyStyle>) -> Result<Self, InvalidCompiledStyle> {
    let object = Self {
      marker: COMPILED_MARKER,
      properties,
    };
    object.validate()?;
    Ok(object)
  }

  pub fn from_json(json: &str) -> Result<Self, InvalidCompiledStyle> {
    let object: Self = serde_json::from_str(json)
      .map_err(|error| InvalidCompiledStyle::new(format!("not a compiled style object: {}", error)))?;
    object.validate()?;
    Ok(object)
  }

  pub fn to_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string(self)
  }

  pub fn properties(&self) -> &IndexMap<String, PropertyStyle> {
    &self.properties
  }

  pub fn get(&self, property: &str) -> Option<&PropertyStyle> {
    self.properties.get(property)
  }

  pub fn is_empty(&self) -> bool {
    self.properties.is_empty()
  }

  /// Every atomic class referenced by this object.
  pub fn class_names(&self) -> impl Iterator<Item = &str> {
    self.entries().filter_map(|entry| match entry.value {
      EntryValue::Class(class_name) => Some(class_name),
      EntryValue::Dynamic { .. } => None,
    })
  }

  pub fn entries(&self) -> impl Iterator<Item = StyleEntry<'_>> {
    self.properties.iter().flat_map(|(property, style)| {
      let entries: Vec<StyleEntry<'_>> = match style {
        PropertyStyle::Static { class_name } => vec![StyleEntry {
          property: property.as_str(),
          condition_path: &[],
          rank: &BASE_RANK,
          value: EntryValue::Class(class_name),
        }],
        PropertyStyle::Conditional { variants } => variants
          .iter()
          .map(|variant| StyleEntry {
            property: property.as_str(),
            condition_path: &variant.condition_path,
            rank: &variant.rank,
            value: EntryValue::Class(&variant.class_name),
          })
          .collect(),
        PropertyStyle::Dynamic {
          expression, value, ..
        } => vec![StyleEntry {
          property: property.as_str(),
          condition_path: &[],
          rank: &BASE_RANK,
          value: EntryValue::Dynamic {
            expression: expression.as_str(),
            value: value.as_deref(),
          },
        }],
      };
      entries
    })
  }

  /// Dynamic expressions still waiting for a runtime value.
  pub fn unbound_expressions(&self) -> impl Iterator<Item = &str> {
    self.properties.values().filter_map(|style| match style {
      PropertyStyle::Dynamic {
        expression,
        value: None,
        ..
      } => Some(expression.as_str()),
      _ => None,
    })
  }

  /// Attach runtime values to dynamic properties, keyed by expression.
  ///
  /// Numbers use the unit recorded at compile time, or the default table for
  /// entries that carry none.
  pub fn bind<I, K, V>(&self, values: I) -> Result<Self, InvalidCompiledStyle>
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<RuntimeValue>,
  {
    self.bind_with_units(values, &UnitTable::default())
  }

  /// Like [`CompiledStyleObject::bind`], with `units` as the fallback table.
  pub fn bind_with_units<I, K, V>(
    &self,
    values: I,
    units: &UnitTable,
  ) -> Result<Self, InvalidCompiledStyle>
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<RuntimeValue>,
  {
    let values: IndexMap<String, RuntimeValue> = values
      .into_iter()
      .map(|(key, value)| (key.into(), value.into()))
      .collect();

    let mut bound = self.clone();
    for (property, style) in bound.properties.iter_mut() {
      let PropertyStyle::Dynamic {
        expression,
        value,
        unit,
      } = style
      else {
        continue;
      };
      let Some(runtime_value) = values.get(expression.as_str()) else {
        continue;
      };

      let rendered = match runtime_value {
        RuntimeValue::Text(text) => text.trim().to_string(),
        RuntimeValue::Number(number) => {
          let formatted = match unit {
            Some(unit) => unit.format(*number),
            None => units.format(property, *number),
          };
          formatted.ok_or_else(|| {
            InvalidCompiledStyle::new(format!(
              "runtime value for '{}' is not a finite number",
              property
            ))
          })?
        }
      };

      *value = Some(rendered);
    }

    bound.validate()?;
    Ok(bound)
  }

  pub fn validate(&self) -> Result<(), InvalidCompiledStyle> {
    if self.marker != COMPILED_MARKER {
      return Err(InvalidCompiledStyle::new(format!(
        "unsupported marker {}",
        self.marker
      )));
    }

    for (property, style) in &self.properties {
      if !is_normalized_property_name(property) {
        return Err(InvalidCompiledStyle::new(format!(
          "'{}' is not a normalized property name",
          property
        )));
      }

      match style {
        PropertyStyle::Static { class_name } => validate_class_name(property, class_name)?,
        PropertyStyle::Conditional { variants } => validate_variants(property, variants)?,
        PropertyStyle::Dynamic {
          expression, value, ..
        } => {
          if expression.trim().is_empty() {
            return Err(InvalidCompiledStyle::new(format!(
              "dynamic '{}' has no expression",
              property
            )));
          }
          if value.as_deref().is_some_and(|value| value.is_empty()) {
            return Err(InvalidCompiledStyle::new(format!(
              "dynamic '{}' is bound to an empty value",
              property
            )));
          }
        }
      }
    }

    Ok(())
  }
}

fn validate_variants(property: &str, variants: &[ConditionalVariant]) -> Result<(), InvalidCompiledStyle> {
  match variants {
    [] => {
      return Err(InvalidCompiledStyle::new(format!(
        "'{}' has no variants",
        property
      )))
    }
    [only] if only.condition_path.is_empty() => {
      return Err(InvalidCompiledStyle::new(format!(
        "'{}' only has a base variant",
        property
      )))
    }
    _ => {}
  }

  for variant in variants {
    validate_class_name(property, &variant.class_name)?;

    let consistent = variant.rank.is_consistent()
      && variant
        .rank
        .tokens()
        .eq(variant.condition_path.iter().map(String::as_str));
    if !consistent {
      return Err(InvalidCompiledStyle::new(format!(
        "rank of '{}' does not match its condition path {:?}",
        property, variant.condition_path
      )));
    }
  }

  // Distinct paths have distinct ranks, so a sorted list is strictly increasing.
  if variants.windows(2).any(|pair| pair[0].rank >= pair[1].rank) {
    return Err(InvalidCompiledStyle::new(format!(
      "variants of '{}' are not in precedence order",
      property
    )));
  }

  Ok(())
}

fn validate_class_name(property: &str, class_name: &str) -> Result<(), InvalidCompiledStyle> {
  if is_css_identifier(class_name) {
    Ok(())
  } else {
    Err(InvalidCompiledStyle::new(format!(
      "'{}' references invalid class name '{}'",
      property, class_name
    )))
  }
}

/// `^[a-zA-Z\-_]+[a-zA-Z\-_0-9]*$`
pub fn is_css_identifier(value: &str) -> bool {
  let mut chars = value.chars();
  match chars.next() {
    Some(first) if first.is_ascii_alphabetic() || first == '-' || first == '_' => {
      chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    }
    _ => false,
  }
}
