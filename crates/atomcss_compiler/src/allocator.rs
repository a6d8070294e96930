use std::fmt::Write;

use atomcss_core::{ConditionKind, ConditionPath, PrecedenceModel, SpecificityRank};
use data_encoding::BASE32HEX_NOPAD;
use serde::Serialize;

use crate::config::ClassNameStrategy;
use crate::errors::{CompileError, CompileResult};
use crate::normalizer::{RuleValue, StyleRule};

/// A rule turned into a single-property class and the CSS that defines it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicClassEntry {
  pub class_name: String,
  pub css_text: String,
  pub rank: SpecificityRank,
  pub property: String,
  pub condition_path: Vec<String>,
  /// `color:red`, or `display:-webkit-box;display:flex` for fallbacks.
  pub declarations: String,
  #[serde(skip)]
  pub(crate) identity: String,
}

impl AtomicClassEntry {
  /// Whether both entries were allocated from the same rule.
  pub fn same_rule(&self, other: &AtomicClassEntry) -> bool {
    self.identity == other.identity
  }

  pub(crate) fn describe(&self) -> String {
    if self.condition_path.is_empty() {
      format!("'{}'", self.declarations)
    } else {
      format!(
        "'{}' under {}",
        self.declarations,
        self.condition_path.join(" ")
      )
    }
  }
}

/// Maps rules to atomic classes. Allocation is pure: the same rule always
/// yields the same entry, independent of anything allocated before.
#[derive(Debug, Clone)]
pub struct ClassAllocator {
  prefix: String,
  strategy: ClassNameStrategy,
  precedence: PrecedenceModel,
}

impl ClassAllocator {
  pub fn new(prefix: impl Into<String>, strategy: ClassNameStrategy, precedence: PrecedenceModel) -> Self {
    Self {
      prefix: prefix.into(),
      strategy,
      precedence,
    }
  }

  pub fn allocate(&self, rule: &StyleRule) -> CompileResult<AtomicClassEntry> {
    let values: Vec<&str> = match &rule.value {
      RuleValue::Literal(value) => vec![value.as_str()],
      RuleValue::Fallbacks(values) => values.iter().map(String::as_str).collect(),
      RuleValue::Dynamic(expression) => {
        return Err(CompileError::UnsupportedDynamicValue {
          property: rule.property.clone(),
          expression: expression.clone(),
        })
      }
    };

    let identity = identity_key(rule);
    let class_name = match self.strategy {
      ClassNameStrategy::Encoded => format!(
        "{}{}",
        self.prefix,
        BASE32HEX_NOPAD
          .encode(identity.as_bytes())
          .to_ascii_lowercase()
      ),
      ClassNameStrategy::Hashed => self.hashed_class_name(rule, &values),
    };

    let declarations = values
      .iter()
      .map(|value| format!("{}:{}", rule.property, value))
      .collect::<Vec<_>>()
      .join(";");

    Ok(AtomicClassEntry {
      css_text: css_text(&class_name, &rule.condition_path, &declarations),
      rank: self.precedence.rank(&rule.condition_path),
      class_name,
      property: rule.property.clone(),
      condition_path: rule.condition_path.texts(),
      declarations,
      identity,
    })
  }

  /// `{prefix}{group}{value}` with four base36 digits each, where the group
  /// covers the at-rules, selector and property.
  fn hashed_class_name(&self, rule: &StyleRule, values: &[&str]) -> String {
    let at_rules = rule
      .condition_path
      .of_kind(ConditionKind::AtRule)
      .map(|token| token.text())
      .collect::<Vec<_>>();
    let at_rule_label = if at_rules.is_empty() {
      "undefined".to_string()
    } else {
      at_rules.join(" ")
    };

    let group_seed = format!(
      "{}&{}{}",
      at_rule_label,
      selector_suffix(&rule.condition_path),
      rule.property
    );

    format!(
      "{}{}{}",
      self.prefix,
      atomcss_hash::short_hash(&group_seed, 4),
      atomcss_hash::short_hash(&values.join(";"), 4)
    )
  }
}

/// Length-prefixed fields, so distinct rules can never produce the same key.
fn identity_key(rule: &StyleRule) -> String {
  let mut key = String::new();
  push_field(&mut key, &rule.property);

  match &rule.value {
    RuleValue::Literal(value) => {
      key.push('l');
      push_field(&mut key, value);
    }
    RuleValue::Fallbacks(values) => {
      key.push('f');
      push_count(&mut key, values.len());
      for value in values {
        push_field(&mut key, value);
      }
    }
    RuleValue::Dynamic(expression) => {
      key.push('d');
      push_field(&mut key, expression);
    }
  }

  let tokens = rule.condition_path.tokens();
  push_count(&mut key, tokens.len());
  for token in tokens {
    push_field(&mut key, token.text());
  }

  key
}

fn push_field(key: &mut String, field: &str) {
  let _ = write!(key, "{}:{}", field.len(), field);
}

fn push_count(key: &mut String, count: usize) {
  let _ = write!(key, "{}#", count);
}

fn selector_suffix(path: &ConditionPath) -> String {
  let pseudo_classes = path.of_kind(ConditionKind::PseudoClass);
  let pseudo_elements = path.of_kind(ConditionKind::PseudoElement);
  pseudo_classes
    .chain(pseudo_elements)
    .map(|token| token.text())
    .collect()
}

/// Minified rule text, wrapped in the path's at-rules from outer to inner.
fn css_text(class_name: &str, path: &ConditionPath, declarations: &str) -> String {
  let rule = format!(
    ".{}{}{{{}}}",
    class_name,
    selector_suffix(path),
    declarations
  );

  path
    .of_kind(ConditionKind::AtRule)
    .collect::<Vec<_>>()
    .into_iter()
    .rev()
    .fold(rule, |inner, at_rule| format!("{}{{{}}}", at_rule.text(), inner))
}

#[cfg(test)]
mod tests {
  use super::*;
  use atomcss_core::is_css_identifier;
  use pretty_assertions::assert_eq;

  fn rule(property: &str, value: RuleValue, keys: &[&str]) -> StyleRule {
    let model = PrecedenceModel::default();
    let condition_path = keys.iter().fold(ConditionPath::base(), |path, key| {
      path.with(model.classify(key).unwrap())
    });
    StyleRule {
      property: property.to_string(),
      value,
      condition_path,
    }
  }

  fn literal(value: &str) -> RuleValue {
    RuleValue::Literal(value.to_string())
  }

  fn allocator(strategy: ClassNameStrategy) -> ClassAllocator {
    ClassAllocator::new("_", strategy, PrecedenceModel::default())
  }

  #[test]
  fn encodes_the_rule_into_the_class_name() {
    let entry = allocator(ClassNameStrategy::Encoded)
      .allocate(&rule("color", literal("red"), &[]))
      .unwrap();

    // "5:colorl3:red0#" in lowercase base32hex.
    assert_eq!(entry.class_name, "_6kt66rrcdtp6ocpqe9im8c13");
    assert_eq!(entry.css_text, "._6kt66rrcdtp6ocpqe9im8c13{color:red}");
    assert!(entry.rank.is_base());
    assert!(is_css_identifier(&entry.class_name));
  }

  #[test]
  fn builds_css_for_selector_conditions() {
    let entry = allocator(ClassNameStrategy::Encoded)
      .allocate(&rule("color", literal("blue"), &["::before", ":hover"]))
      .unwrap();

    assert_eq!(
      entry.css_text,
      format!(".{}:hover::before{{color:blue}}", entry.class_name)
    );
    assert_eq!(entry.condition_path, vec![":hover", "::before"]);
  }

  #[test]
  fn wraps_css_in_at_rules_outer_to_inner() {
    let entry = allocator(ClassNameStrategy::Encoded)
      .allocate(&rule(
        "color",
        literal("red"),
        &["@media (min-width: 600px)", ":hover", "@supports (display: grid)"],
      ))
      .unwrap();

    assert_eq!(
      entry.css_text,
      format!(
        "@supports (display:grid){{@media (min-width:600px){{.{}:hover{{color:red}}}}}}",
        entry.class_name
      )
    );
  }

  #[test]
  fn emits_one_declaration_per_fallback() {
    let entry = allocator(ClassNameStrategy::Encoded)
      .allocate(&rule(
        "display",
        RuleValue::Fallbacks(vec!["-webkit-box".into(), "flex".into()]),
        &[],
      ))
      .unwrap();

    assert_eq!(
      entry.css_text,
      format!(".{}{{display:-webkit-box;display:flex}}", entry.class_name)
    );
  }

  #[test]
  fn distinguishes_rules_that_share_text() {
    let allocator = allocator(ClassNameStrategy::Encoded);
    let names: Vec<String> = [
      rule("color", literal("red"), &[]),
      rule("color", literal("red"), &[":hover"]),
      rule("color", RuleValue::Fallbacks(vec!["red".into(), "blue".into()]), &[]),
      rule("color", literal("red blue"), &[]),
      rule("colo", literal("rred"), &[]),
    ]
    .iter()
    .map(|rule| allocator.allocate(rule).unwrap().class_name)
    .collect();

    let mut unique = names.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), names.len());
  }

  #[test]
  fn hashes_like_the_compiled_toolchain() {
    let entry = allocator(ClassNameStrategy::Hashed)
      .allocate(&rule("color", literal("blue"), &[]))
      .unwrap();

    assert_eq!(entry.class_name, "_syaz13q2");
    assert_eq!(entry.css_text, "._syaz13q2{color:blue}");
  }

  #[test]
  fn uses_the_configured_prefix() {
    let entry = ClassAllocator::new("app-", ClassNameStrategy::Hashed, PrecedenceModel::default())
      .allocate(&rule("color", literal("blue"), &[]))
      .unwrap();

    assert_eq!(entry.class_name, "app-syaz13q2");
  }

  #[test]
  fn refuses_dynamic_rules() {
    let result = allocator(ClassNameStrategy::Encoded).allocate(&rule(
      "width",
      RuleValue::Dynamic("props.width".into()),
      &[],
    ));

    assert!(matches!(
      result,
      Err(CompileError::UnsupportedDynamicValue { .. })
    ));
  }
}
