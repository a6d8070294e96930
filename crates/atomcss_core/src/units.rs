use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Properties whose numeric values are emitted without a unit.
const UNITLESS_PROPERTIES: &[&str] = &[
  "animation-iteration-count",
  "aspect-ratio",
  "border-image-outset",
  "border-image-slice",
  "border-image-width",
  "box-flex",
  "box-flex-group",
  "box-ordinal-group",
  "column-count",
  "columns",
  "fill-opacity",
  "flex",
  "flex-grow",
  "flex-negative",
  "flex-order",
  "flex-positive",
  "flex-shrink",
  "flood-opacity",
  "font-size-adjust",
  "font-weight",
  "grid-area",
  "grid-column",
  "grid-column-end",
  "grid-column-span",
  "grid-column-start",
  "grid-row",
  "grid-row-end",
  "grid-row-span",
  "grid-row-start",
  "line-clamp",
  "line-height",
  "opacity",
  "order",
  "orphans",
  "scale",
  "stop-opacity",
  "stroke-dasharray",
  "stroke-dashoffset",
  "stroke-miterlimit",
  "stroke-opacity",
  "stroke-width",
  "tab-size",
  "widows",
  "z-index",
  "zoom",
  "-webkit-line-clamp",
];

/// Properties whose numeric values default to something other than `px`.
const UNIT_OVERRIDES: &[(&str, &str)] = &[
  ("animation-delay", "ms"),
  ("animation-duration", "ms"),
  ("transition-delay", "ms"),
  ("transition-duration", "ms"),
];

///
/// The property → unit table applied to bare numbers.
///
/// Numbers get `px` unless the property is unitless or listed in `units`.
/// Zero stays unitless when it would otherwise get `px`.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnitTable {
  pub unitless: BTreeSet<String>,
  pub units: BTreeMap<String, String>,
}

impl Default for UnitTable {
  fn default() -> Self {
    Self {
      unitless: UNITLESS_PROPERTIES.iter().map(|s| s.to_string()).collect(),
      units: UNIT_OVERRIDES
        .iter()
        .map(|(property, unit)| (property.to_string(), unit.to_string()))
        .collect(),
    }
  }
}

/// How bare numbers are rendered for one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumberUnit {
  Unitless,
  /// `px`, dropped for zero.
  Px,
  Unit(String),
}

impl NumberUnit {
  /// Returns `None` for non-finite numbers, which have no CSS representation.
  pub fn format(&self, value: f64) -> Option<String> {
    if !value.is_finite() {
      return None;
    }

    let number = format_number(value);
    match self {
      NumberUnit::Unitless => Some(number),
      NumberUnit::Px if value == 0.0 => Some(number),
      NumberUnit::Px => Some(format!("{}px", number)),
      NumberUnit::Unit(unit) => Some(format!("{}{}", number, unit)),
    }
  }
}

impl UnitTable {
  /// The unit applied to numbers of `property` (kebab-case).
  pub fn unit_for(&self, property: &str) -> NumberUnit {
    if property.starts_with("--") || self.unitless.contains(property) {
      return NumberUnit::Unitless;
    }

    match self.units.get(property) {
      Some(unit) => NumberUnit::Unit(unit.clone()),
      None => NumberUnit::Px,
    }
  }

  /// Render a number for `property` (kebab-case).
  pub fn format(&self, property: &str, value: f64) -> Option<String> {
    self.unit_for(property).format(value)
  }
}

/// Shortest decimal rendering; integral values drop the fraction and `-0`
/// becomes `0`.
pub fn format_number(value: f64) -> String {
  if value == 0.0 {
    return "0".to_string();
  }
  if value.fract() == 0.0 && value.abs() < 1e15 {
    return format!("{}", value as i64);
  }
  format!("{}", value)
}
