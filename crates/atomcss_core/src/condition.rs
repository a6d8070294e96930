use serde::{Deserialize, Serialize};

/// The categories a scope key can belong to, in ascending precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionKind {
  PseudoClass,
  PseudoElement,
  AtRule,
}

impl ConditionKind {
  /// Categorical rank. `0` is reserved for the unconditional (base) path.
  pub fn category(self) -> u8 {
    match self {
      ConditionKind::PseudoClass => 1,
      ConditionKind::PseudoElement => 2,
      ConditionKind::AtRule => 3,
    }
  }
}

/// A recognized scope key such as `:hover`, `::before` or `@media (min-width: 600px)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConditionToken {
  kind: ConditionKind,
  priority: u16,
  text: String,
}

impl ConditionToken {
  pub fn kind(&self) -> ConditionKind {
    self.kind
  }

  /// Position of the token's name in the [`ConditionTable`] list for its kind.
  pub fn priority(&self) -> u16 {
    self.priority
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  /// The at-rule name without `@` (`media`, `supports`, ...).
  pub fn at_rule_name(&self) -> Option<&str> {
    if self.kind != ConditionKind::AtRule {
      return None;
    }
    let name = self.text.split([' ', '(']).next()?;
    name.strip_prefix('@')
  }

  /// The at-rule prelude (`(min-width:600px)`), empty for selector conditions.
  pub fn at_rule_params(&self) -> &str {
    match self.kind {
      ConditionKind::AtRule => self
        .text
        .find([' ', '('])
        .map(|index| self.text[index..].trim())
        .unwrap_or(""),
      _ => "",
    }
  }

  fn sort_key(&self) -> (ConditionKind, u16, &str) {
    (self.kind, self.priority, self.text.as_str())
  }
}

/// Canonical, ordered list of conditions under which a declaration applies.
///
/// Tokens are sorted by kind, then table priority, then text, and duplicates
/// are dropped, so `:focus` inside `:hover` and `:hover` inside `:focus`
/// produce the same path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConditionPath {
  tokens: Vec<ConditionToken>,
}

impl ConditionPath {
  pub fn base() -> Self {
    Self::default()
  }

  pub fn canonical(mut tokens: Vec<ConditionToken>) -> Self {
    tokens.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    tokens.dedup_by(|a, b| a.text == b.text);
    Self { tokens }
  }

  pub fn with(&self, token: ConditionToken) -> Self {
    let mut tokens = self.tokens.clone();
    tokens.push(token);
    Self::canonical(tokens)
  }

  pub fn tokens(&self) -> &[ConditionToken] {
    &self.tokens
  }

  pub fn is_base(&self) -> bool {
    self.tokens.is_empty()
  }

  pub fn texts(&self) -> Vec<String> {
    self.tokens.iter().map(|token| token.text.clone()).collect()
  }

  pub fn of_kind(&self, kind: ConditionKind) -> impl Iterator<Item = &ConditionToken> {
    self.tokens.iter().filter(move |token| token.kind == kind)
  }
}

///
/// The explicit table of condition tokens the compiler accepts.
///
/// Each list is in ascending priority: a later entry sorts, and is emitted,
/// after an earlier one of the same kind. Pseudo-classes and pseudo-elements
/// are matched by name, ignoring any argument list (`:nth-child(2n)` matches
/// `:nth-child`). At-rules are matched by name and must carry a prelude.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConditionTable {
  pub pseudo_classes: Vec<String>,
  pub pseudo_elements: Vec<String>,
  pub at_rules: Vec<String>,
  ///
  /// Order `@media` conditions by their width/height bounds (mobile first)
  /// before falling back to comparing the query text.
  ///
  /// Defaults to `true`
  ///
  pub sort_at_rules: bool,
}

/// Structural and form-state pseudo-classes first, then the
/// link/visited/focus/hover/active sequence so that interaction states
/// override each other in the order authors expect.
const DEFAULT_PSEUDO_CLASSES: &[&str] = &[
  ":first-child",
  ":last-child",
  ":only-child",
  ":first-of-type",
  ":last-of-type",
  ":only-of-type",
  ":nth-child",
  ":nth-last-child",
  ":nth-of-type",
  ":nth-last-of-type",
  ":empty",
  ":not",
  ":is",
  ":where",
  ":has",
  ":checked",
  ":indeterminate",
  ":default",
  ":required",
  ":optional",
  ":valid",
  ":invalid",
  ":in-range",
  ":out-of-range",
  ":placeholder-shown",
  ":autofill",
  ":read-only",
  ":read-write",
  ":target",
  ":enabled",
  ":disabled",
  ":link",
  ":visited",
  ":focus-within",
  ":focus",
  ":focus-visible",
  ":hover",
  ":active",
];

const DEFAULT_PSEUDO_ELEMENTS: &[&str] = &[
  "::before",
  "::after",
  "::first-line",
  "::first-letter",
  "::marker",
  "::placeholder",
  "::selection",
  "::backdrop",
  "::file-selector-button",
];

const DEFAULT_AT_RULES: &[&str] = &["@supports", "@media", "@container"];

impl Default for ConditionTable {
  fn default() -> Self {
    Self {
      pseudo_classes: DEFAULT_PSEUDO_CLASSES.iter().map(|s| s.to_string()).collect(),
      pseudo_elements: DEFAULT_PSEUDO_ELEMENTS
        .iter()
        .map(|s| s.to_string())
        .collect(),
      at_rules: DEFAULT_AT_RULES.iter().map(|s| s.to_string()).collect(),
      sort_at_rules: true,
    }
  }
}

impl ConditionTable {
  /// Resolve a scope key into a token, or `None` when the key is not a
  /// condition this table recognizes.
  pub fn classify(&self, key: &str) -> Option<ConditionToken> {
    let key = key.trim();

    if let Some(rest) = key.strip_prefix("::") {
      let text = normalize_selector_condition(key);
      let name = format!("::{}", selector_condition_name(rest));
      return position(&self.pseudo_elements, &name).map(|priority| ConditionToken {
        kind: ConditionKind::PseudoElement,
        priority,
        text,
      });
    }

    if let Some(rest) = key.strip_prefix(':') {
      let text = normalize_selector_condition(key);
      let name = format!(":{}", selector_condition_name(rest));
      return position(&self.pseudo_classes, &name).map(|priority| ConditionToken {
        kind: ConditionKind::PseudoClass,
        priority,
        text,
      });
    }

    if key.starts_with('@') {
      let split = key.find([' ', '(']).unwrap_or(key.len());
      let (name, params) = key.split_at(split);
      let params = normalize_at_rule_params(params);
      if params.is_empty() {
        return None;
      }
      return position(&self.at_rules, name).map(|priority| ConditionToken {
        kind: ConditionKind::AtRule,
        priority,
        text: format!("{} {}", name, params),
      });
    }

    None
  }

  pub fn validate(&self) -> Result<(), String> {
    let lists = [
      ("pseudoClasses", &self.pseudo_classes, ":"),
      ("pseudoElements", &self.pseudo_elements, "::"),
      ("atRules", &self.at_rules, "@"),
    ];

    for (label, list, prefix) in lists {
      if list.len() > usize::from(u16::MAX) {
        return Err(format!("{} has too many entries", label));
      }
      for entry in list {
        let valid_prefix = entry.starts_with(prefix) && (prefix == "::" || !entry.starts_with("::"));
        if !valid_prefix || entry.len() == prefix.len() {
          return Err(format!(
            "{} entry '{}' must start with '{}'",
            label, entry, prefix
          ));
        }
      }
    }

    Ok(())
  }
}

fn position(list: &[String], name: &str) -> Option<u16> {
  list
    .iter()
    .position(|entry| entry == name)
    .and_then(|index| u16::try_from(index).ok())
}

fn selector_condition_name(rest: &str) -> &str {
  rest.split('(').next().unwrap_or(rest).trim()
}

fn normalize_selector_condition(key: &str) -> String {
  collapse_whitespace(key)
}

/// Collapse whitespace and drop the optional spaces around `:` and inside
/// parentheses so that `( min-width : 600px )` and `(min-width:600px)` match.
pub fn normalize_at_rule_params(params: &str) -> String {
  let collapsed = collapse_whitespace(params);
  let mut output = String::with_capacity(collapsed.len());
  let mut chars = collapsed.chars().peekable();

  while let Some(ch) = chars.next() {
    match ch {
      ' ' => {
        let next = chars.peek().copied();
        let previous = output.chars().last();
        if matches!(next, Some(')') | Some(':') | Some(','))
          || matches!(previous, Some('(') | Some(':') | Some(','))
        {
          continue;
        }
        output.push(ch);
      }
      _ => output.push(ch),
    }
  }

  output
}

fn collapse_whitespace(value: &str) -> String {
  value.split_whitespace().collect::<Vec<_>>().join(" ")
}
