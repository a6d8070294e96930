//! The single ordering shared by CSS emission and runtime resolution.
//!
//! Atomic classes all have the same selector specificity, so the only thing
//! that lets a `:hover` rule beat a base rule in the browser is that it comes
//! later in the stylesheet. The compiler sorts emitted rules by
//! [`SpecificityRank`] and the runtime orders class lists by the very same
//! value, which keeps both sides in agreement.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::condition::{ConditionPath, ConditionTable, ConditionToken};
use crate::media_query::{parse_media_bounds, MediaBound};

/// Total order over condition paths.
///
/// The derived `Ord` compares fields in declaration order:
/// 1. `category`: the highest condition category in the path
///    (0 base, 1 pseudo-class, 2 pseudo-element, 3 at-rule),
/// 2. `depth`: how many conditions the path combines,
/// 3. `components`: the canonical tokens, outer to inner.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpecificityRank {
  category: u8,
  depth: u16,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  components: Vec<RankComponent>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RankComponent {
  category: u8,
  priority: u16,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  bounds: Vec<MediaBound>,
  token: String,
}

impl SpecificityRank {
  pub const fn base() -> Self {
    Self {
      category: 0,
      depth: 0,
      components: Vec::new(),
    }
  }

  pub fn is_base(&self) -> bool {
    self.category == 0
  }

  pub fn category(&self) -> u8 {
    self.category
  }

  pub fn depth(&self) -> u16 {
    self.depth
  }

  /// The condition tokens this rank was computed from, in canonical order.
  pub fn tokens(&self) -> impl Iterator<Item = &str> {
    self
      .components
      .iter()
      .map(|component| component.token.as_str())
  }

  /// Structural sanity check used when validating foreign compiled objects.
  pub fn is_consistent(&self) -> bool {
    let expected_category = self
      .components
      .iter()
      .map(|component| component.category)
      .max()
      .unwrap_or(0);

    usize::from(self.depth) == self.components.len()
      && self.category == expected_category
      && self
        .components
        .iter()
        .all(|component| (1..=3).contains(&component.category))
  }
}

/// Ranks condition paths using a [`ConditionTable`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecedenceModel {
  table: ConditionTable,
}

impl PrecedenceModel {
  pub fn new(table: ConditionTable) -> Self {
    Self { table }
  }

  pub fn table(&self) -> &ConditionTable {
    &self.table
  }

  pub fn classify(&self, key: &str) -> Option<ConditionToken> {
    self.table.classify(key)
  }

  pub fn rank(&self, path: &ConditionPath) -> SpecificityRank {
    let components: Vec<RankComponent> = path
      .tokens()
      .iter()
      .map(|token| self.component(token))
      .collect();

    SpecificityRank {
      category: components
        .iter()
        .map(|component| component.category)
        .max()
        .unwrap_or(0),
      depth: u16::try_from(components.len()).unwrap_or(u16::MAX),
      components,
    }
  }

  pub fn compare(&self, a: &ConditionPath, b: &ConditionPath) -> Ordering {
    self.rank(a).cmp(&self.rank(b))
  }

  fn component(&self, token: &ConditionToken) -> RankComponent {
    let bounds = match token.at_rule_name() {
      Some("media") if self.table.sort_at_rules => parse_media_bounds(token.at_rule_params()),
      _ => Vec::new(),
    };

    RankComponent {
      category: token.kind().category(),
      priority: token.priority(),
      bounds,
      token: token.text().to_string(),
    }
  }
}
