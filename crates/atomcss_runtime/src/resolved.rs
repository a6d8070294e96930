use std::collections::HashSet;

use atomcss_core::SpecificityRank;
use indexmap::IndexMap;
use serde::Serialize;

/// The outcome of a merge: classes to put on the element and inline styles
/// for runtime values.
///
/// A `ResolvedStyle` can be merged again; it carries the per-(property,
/// condition) state it was built from, so merging in steps gives the same
/// result as merging everything at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
  class_names: Vec<String>,
  inline_style: IndexMap<String, String>,
  #[serde(skip)]
  state: ResolutionState,
}

impl ResolvedStyle {
  /// Winning classes, in precedence order.
  pub fn class_names(&self) -> &[String] {
    &self.class_names
  }

  /// The `class` attribute value.
  pub fn class_name(&self) -> String {
    self.class_names.join(" ")
  }

  pub fn inline_style(&self) -> &IndexMap<String, String> {
    &self.inline_style
  }

  /// The `style` attribute value, e.g. `width:120px;color:red`.
  pub fn style_attribute(&self) -> String {
    self
      .inline_style
      .iter()
      .map(|(property, value)| format!("{}:{}", property, value))
      .collect::<Vec<_>>()
      .join(";")
  }

  pub fn is_empty(&self) -> bool {
    self.class_names.is_empty() && self.inline_style.is_empty()
  }

  pub(crate) fn state(&self) -> &ResolutionState {
    &self.state
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SlotKey {
  property: String,
  condition_path: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ClassSlot {
  rank: SpecificityRank,
  class_name: String,
}

/// Last write wins per key; a key keeps the position where it first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResolutionState {
  classes: IndexMap<SlotKey, ClassSlot>,
  inline: IndexMap<String, String>,
}

impl ResolutionState {
  pub(crate) fn set_class(
    &mut self,
    property: &str,
    condition_path: &[String],
    rank: &SpecificityRank,
    class_name: &str,
  ) {
    self.classes.insert(
      SlotKey {
        property: property.to_string(),
        condition_path: condition_path.to_vec(),
      },
      ClassSlot {
        rank: rank.clone(),
        class_name: class_name.to_string(),
      },
    );
  }

  pub(crate) fn set_inline(&mut self, property: &str, value: &str) {
    self.inline.insert(property.to_string(), value.to_string());
  }

  /// Replay another state on top of this one, in its own order.
  pub(crate) fn extend(&mut self, other: &ResolutionState) {
    for (key, slot) in &other.classes {
      self.classes.insert(key.clone(), slot.clone());
    }
    for (property, value) in &other.inline {
      self.inline.insert(property.clone(), value.clone());
    }
  }

  pub(crate) fn into_resolved(self) -> ResolvedStyle {
    let class_names = self.winning_classes();
    let inline_style = self.inline.clone();

    ResolvedStyle {
      class_names,
      inline_style,
      state: self,
    }
  }

  fn winning_classes(&self) -> Vec<String> {
    let mut winners: Vec<&ClassSlot> = self
      .classes
      .iter()
      .filter(|(key, _)| !self.inline.contains_key(&key.property))
      .map(|(_, slot)| slot)
      .collect();
    // Stable, so equal ranks stay in first-introduction order.
    winners.sort_by(|a, b| a.rank.cmp(&b.rank));

    let mut seen = HashSet::new();
    winners
      .into_iter()
      .filter(|slot| seen.insert(slot.class_name.as_str()))
      .map(|slot| slot.class_name.clone())
      .collect()
  }
}
