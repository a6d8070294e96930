use atomcss_core::SpecificityRank;
use serde::Serialize;

use crate::allocator::AtomicClassEntry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CssRule {
  pub class_name: String,
  pub css_text: String,
  pub rank: SpecificityRank,
}

impl From<AtomicClassEntry> for CssRule {
  fn from(entry: AtomicClassEntry) -> Self {
    CssRule {
      class_name: entry.class_name,
      css_text: entry.css_text,
      rank: entry.rank,
    }
  }
}

/// Every atomic rule of a compilation run, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CssArtifact {
  rules: Vec<CssRule>,
}

impl CssArtifact {
  pub fn new(rules: Vec<CssRule>) -> Self {
    Self { rules }
  }

  pub fn rules(&self) -> &[CssRule] {
    &self.rules
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  pub fn get(&self, class_name: &str) -> Option<&CssRule> {
    self.rules.iter().find(|rule| rule.class_name == class_name)
  }

  pub fn contains(&self, class_name: &str) -> bool {
    self.get(class_name).is_some()
  }

  /// Rules in precedence order; rules of equal rank keep registration order.
  pub fn sorted_rules(&self) -> Vec<&CssRule> {
    let mut sorted: Vec<&CssRule> = self.rules.iter().collect();
    sorted.sort_by(|a, b| a.rank.cmp(&b.rank));
    sorted
  }

  /// The stylesheet to ship: one rule per line, in precedence order.
  pub fn to_stylesheet(&self) -> String {
    self
      .sorted_rules()
      .into_iter()
      .map(|rule| rule.css_text.as_str())
      .collect::<Vec<_>>()
      .join("\n")
  }

  pub fn to_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string(self)
  }
}
