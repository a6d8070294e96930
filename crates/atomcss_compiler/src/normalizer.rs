use atomcss_core::{normalize_property_name, ConditionKind, ConditionPath, PrecedenceModel, UnitTable};

use crate::declaration::{Declaration, DeclarationValue};
use crate::errors::{CompileError, CompileResult};

/// The value of a single normalized rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleValue {
  Literal(String),
  /// Ordered alternatives, emitted as one declaration each.
  Fallbacks(Vec<String>),
  /// Source of a runtime expression.
  Dynamic(String),
}

/// One (property, value, condition path) triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleRule {
  pub property: String,
  pub value: RuleValue,
  pub condition_path: ConditionPath,
}

/// Flattens nested declarations into [`StyleRule`]s.
pub struct RuleNormalizer<'a> {
  precedence: &'a PrecedenceModel,
  units: &'a UnitTable,
}

impl<'a> RuleNormalizer<'a> {
  pub fn new(precedence: &'a PrecedenceModel, units: &'a UnitTable) -> Self {
    Self { precedence, units }
  }

  /// Depth-first walk in authoring order. Every rule carries the canonical
  /// path of the scopes it was found in.
  #[tracing::instrument(level = "trace", skip_all)]
  pub fn normalize(&self, declaration: &Declaration) -> CompileResult<Vec<StyleRule>> {
    let mut rules = Vec::new();
    let mut location = Vec::new();
    self.walk(declaration, &ConditionPath::base(), &mut location, &mut rules)?;
    Ok(rules)
  }

  fn walk(
    &self,
    declaration: &Declaration,
    path: &ConditionPath,
    location: &mut Vec<String>,
    rules: &mut Vec<StyleRule>,
  ) -> CompileResult<()> {
    for (key, value) in declaration.entries() {
      location.push(key.to_string());

      if let Some(token) = self.precedence.classify(key) {
        let DeclarationValue::Scope(nested) = value else {
          return Err(CompileError::malformed(
            location,
            format!("condition '{}' must contain a declaration object", key),
          ));
        };

        let nested_path = path.with(token);
        if nested_path.of_kind(ConditionKind::PseudoElement).count() > 1 {
          return Err(CompileError::malformed(
            location,
            "a rule can target at most one pseudo-element",
          ));
        }

        self.walk(nested, &nested_path, location, rules)?;
      } else {
        rules.push(self.leaf(key, value, path, location)?);
      }

      location.pop();
    }

    Ok(())
  }

  fn leaf(
    &self,
    key: &str,
    value: &DeclarationValue,
    path: &ConditionPath,
    location: &[String],
  ) -> CompileResult<StyleRule> {
    if key.starts_with(':') || key.starts_with('@') {
      return Err(CompileError::malformed(
        location,
        format!("'{}' is not a recognized condition", key.trim()),
      ));
    }

    let property = normalize_property_name(key)
      .ok_or_else(|| CompileError::malformed(location, format!("'{}' is not a valid property name", key)))?;

    let value = match value {
      DeclarationValue::Dynamic(dynamic) => {
        if !path.is_base() {
          return Err(CompileError::malformed(
            location,
            "runtime values cannot be used under a condition",
          ));
        }
        let expression = dynamic.expression.trim();
        if expression.is_empty() {
          return Err(CompileError::malformed(location, "empty runtime expression"));
        }
        RuleValue::Dynamic(expression.to_string())
      }
      DeclarationValue::List(items) => {
        let mut alternatives = items
          .iter()
          .map(|item| self.literal(&property, item, location))
          .collect::<CompileResult<Vec<String>>>()?;
        match alternatives.len() {
          0 => return Err(CompileError::malformed(location, "empty fallback list")),
          1 => RuleValue::Literal(alternatives.remove(0)),
          _ => RuleValue::Fallbacks(alternatives),
        }
      }
      DeclarationValue::Scope(_) => {
        return Err(CompileError::malformed(
          location,
          "expected a value but found a nested object",
        ))
      }
      other => RuleValue::Literal(self.literal(&property, other, location)?),
    };

    Ok(StyleRule {
      property,
      value,
      condition_path: path.clone(),
    })
  }

  fn literal(
    &self,
    property: &str,
    value: &DeclarationValue,
    location: &[String],
  ) -> CompileResult<String> {
    match value {
      DeclarationValue::Str(text) => match scan_value(text) {
        Ok(scanned) if scanned.is_empty() => Err(CompileError::malformed(location, "empty value")),
        Ok(scanned) => Ok(scanned),
        Err(reason) => Err(CompileError::malformed(
          location,
          format!("'{}' {}", text.trim(), reason),
        )),
      },
      DeclarationValue::Number(number) => self
        .units
        .format(property, *number)
        .ok_or_else(|| CompileError::malformed(location, "numbers must be finite")),
      DeclarationValue::Invalid(json) => Err(CompileError::malformed(
        location,
        format!("unsupported value {}", json),
      )),
      DeclarationValue::Dynamic(_) | DeclarationValue::List(_) | DeclarationValue::Scope(_) => Err(
        CompileError::malformed(location, "fallback lists may only contain strings and numbers"),
      ),
    }
  }
}

/// Collapses whitespace outside quoted strings and rejects values that could
/// end their declaration or rule early once pasted into CSS text.
fn scan_value(text: &str) -> Result<String, String> {
  let mut scanned = String::with_capacity(text.len());
  let mut quote: Option<char> = None;
  let mut closers: Vec<char> = Vec::new();
  let mut pending_space = false;
  let mut chars = text.chars().peekable();

  while let Some(ch) = chars.next() {
    if let Some(open) = quote {
      scanned.push(ch);
      if ch == '\\' {
        if let Some(escaped) = chars.next() {
          scanned.push(escaped);
        }
      } else if ch == open {
        quote = None;
      }
      continue;
    }

    if ch.is_whitespace() {
      pending_space = !scanned.is_empty();
      continue;
    }
    if pending_space {
      scanned.push(' ');
      pending_space = false;
    }

    match ch {
      '"' | '\'' => quote = Some(ch),
      '(' => closers.push(')'),
      '[' => closers.push(']'),
      ')' | ']' => {
        if closers.pop() != Some(ch) {
          return Err(format!("has an unbalanced '{}'", ch));
        }
      }
      ';' | '{' | '}' => return Err(format!("contains '{}' outside a quoted string", ch)),
      '/' if chars.peek() == Some(&'*') => return Err("contains a comment".to_string()),
      '\\' => {
        let Some(escaped) = chars.next() else {
          return Err("ends with an escape".to_string());
        };
        scanned.push(ch);
        scanned.push(escaped);
        continue;
      }
      _ => {}
    }
    scanned.push(ch);
  }

  if let Some(open) = quote {
    return Err(format!("has an unterminated {} string", open));
  }
  if let Some(closer) = closers.last() {
    return Err(format!("is missing a closing '{}'", closer));
  }

  Ok(scanned)
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn normalize(declaration: &Declaration) -> CompileResult<Vec<StyleRule>> {
    let precedence = PrecedenceModel::default();
    let units = UnitTable::default();
    RuleNormalizer::new(&precedence, &units).normalize(declaration)
  }

  fn summary(rules: &[StyleRule]) -> Vec<(String, RuleValue, Vec<String>)> {
    rules
      .iter()
      .map(|rule| {
        (
          rule.property.clone(),
          rule.value.clone(),
          rule.condition_path.texts(),
        )
      })
      .collect()
  }

  fn literal(value: &str) -> RuleValue {
    RuleValue::Literal(value.to_string())
  }

  #[test]
  fn flattens_nested_scopes_depth_first() {
    let declaration = Declaration::new()
      .property("color", "red")
      .scope(
        ":hover",
        Declaration::new()
          .property("color", "blue")
          .scope("@media (min-width: 600px)", Declaration::new().property("color", "green")),
      )
      .property("fontSize", 12);

    assert_eq!(
      summary(&normalize(&declaration).unwrap()),
      vec![
        ("color".into(), literal("red"), vec![]),
        ("color".into(), literal("blue"), vec![":hover".into()]),
        (
          "color".into(),
          literal("green"),
          vec![":hover".into(), "@media (min-width:600px)".into()]
        ),
        ("font-size".into(), literal("12px"), vec![]),
      ]
    );
  }

  #[test]
  fn canonicalizes_paths_regardless_of_nesting_order() {
    let a = Declaration::new().scope(
      ":hover",
      Declaration::new().scope(":focus", Declaration::new().property("color", "red")),
    );
    let b = Declaration::new().scope(
      ":focus",
      Declaration::new().scope(":hover", Declaration::new().property("color", "red")),
    );

    assert_eq!(normalize(&a).unwrap(), normalize(&b).unwrap());
  }

  #[test]
  fn normalizes_values() {
    let declaration = Declaration::new()
      .property("margin", "  0   auto ")
      .property("opacity", 0.5)
      .property("width", 0)
      .property("display", vec!["-webkit-box", "flex"])
      .property("gap", vec![4]);

    assert_eq!(
      summary(&normalize(&declaration).unwrap()),
      vec![
        ("margin".into(), literal("0 auto"), vec![]),
        ("opacity".into(), literal("0.5"), vec![]),
        ("width".into(), literal("0"), vec![]),
        (
          "display".into(),
          RuleValue::Fallbacks(vec!["-webkit-box".into(), "flex".into()]),
          vec![]
        ),
        ("gap".into(), literal("4px"), vec![]),
      ]
    );
  }

  #[test]
  fn keeps_dynamic_values() {
    let declaration = Declaration::new().dynamic("width", " props.width ");
    assert_eq!(
      summary(&normalize(&declaration).unwrap()),
      vec![(
        "width".into(),
        RuleValue::Dynamic("props.width".into()),
        vec![]
      )]
    );
  }

  fn malformed_path(declaration: Declaration) -> Vec<String> {
    match normalize(&declaration) {
      Err(CompileError::MalformedDeclaration { path, .. }) => path,
      other => panic!("expected a malformed declaration, got {:?}", other),
    }
  }

  #[test]
  fn reports_where_a_declaration_is_malformed() {
    assert_eq!(
      malformed_path(Declaration::new().scope(
        ":hover",
        Declaration::new().property("color", DeclarationValue::Invalid(serde_json::Value::Null))
      )),
      vec![":hover", "color"]
    );
    assert_eq!(
      malformed_path(Declaration::new().property(":hovr", "red")),
      vec![":hovr"]
    );
    assert_eq!(
      malformed_path(Declaration::new().scope(":unknown", Declaration::new())),
      vec![":unknown"]
    );
    assert_eq!(
      malformed_path(Declaration::new().property(":hover", "red")),
      vec![":hover"]
    );
    assert_eq!(
      malformed_path(Declaration::new().property("col or", "red")),
      vec!["col or"]
    );
    assert_eq!(
      malformed_path(Declaration::new().property("color", "   ")),
      vec!["color"]
    );
    assert_eq!(
      malformed_path(Declaration::new().property("color", Vec::<String>::new())),
      vec!["color"]
    );
    assert_eq!(
      malformed_path(Declaration::new().property("color", f64::NAN)),
      vec!["color"]
    );
    assert_eq!(
      malformed_path(Declaration::new().scope("color", Declaration::new())),
      vec!["color"]
    );
  }

  #[test]
  fn rejects_dynamic_values_under_conditions() {
    assert_eq!(
      malformed_path(
        Declaration::new().scope(":hover", Declaration::new().dynamic("width", "props.width"))
      ),
      vec![":hover", "width"]
    );
  }

  #[test]
  fn rejects_nested_lists() {
    let nested = DeclarationValue::List(vec![DeclarationValue::List(vec!["a".into()])]);
    assert_eq!(
      malformed_path(Declaration::new().property("display", nested)),
      vec!["display"]
    );
  }

  #[test]
  fn rejects_multiple_pseudo_elements() {
    assert_eq!(
      malformed_path(Declaration::new().scope(
        "::before",
        Declaration::new().scope("::after", Declaration::new().property("color", "red"))
      )),
      vec!["::before", "::after"]
    );
  }

  #[test]
  fn rejects_media_rules_without_a_prelude() {
    assert_eq!(
      malformed_path(Declaration::new().scope("@media", Declaration::new())),
      vec!["@media"]
    );
  }

  #[test]
  fn keeps_whitespace_inside_quoted_strings() {
    let declaration = Declaration::new()
      .property("content", "'a    b'")
      .property("fontFamily", "  'Open   Sans',    serif ")
      .property("backgroundImage", r#"url("a;b}.png")"#)
      .property("gridTemplateAreas", "  \"a  b\"   \"c  d\" ");

    assert_eq!(
      summary(&normalize(&declaration).unwrap()),
      vec![
        ("content".into(), literal("'a    b'"), vec![]),
        ("font-family".into(), literal("'Open   Sans', serif"), vec![]),
        ("background-image".into(), literal(r#"url("a;b}.png")"#), vec![]),
        ("grid-template-areas".into(), literal("\"a  b\" \"c  d\""), vec![]),
      ]
    );
  }

  #[test]
  fn rejects_values_that_escape_their_declaration() {
    for value in [
      "red;display:none",
      "red}body{display:none",
      "red{",
      "red/*",
      "red\\",
    ] {
      assert_eq!(
        malformed_path(Declaration::new().property("color", value)),
        vec!["color"],
        "{}",
        value
      );
    }
  }

  #[test]
  fn rejects_unbalanced_quotes_and_brackets() {
    for value in [
      "'Open Sans",
      "\"a",
      "url(a.png",
      "calc(1px + 2px))",
      "attr(x]",
      "[full",
    ] {
      assert_eq!(
        malformed_path(Declaration::new().property("fontFamily", value)),
        vec!["fontFamily"],
        "{}",
        value
      );
    }
  }

  #[test]
  fn rejects_escaping_values_inside_fallback_lists() {
    assert_eq!(
      malformed_path(Declaration::new().property("display", vec!["flex", "grid;color:red"])),
      vec!["display"]
    );
  }
}
