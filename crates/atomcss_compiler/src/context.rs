use atomcss_core::{CompiledStyleObject, ConditionalVariant, PrecedenceModel, PropertyStyle};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;

use crate::allocator::{AtomicClassEntry, ClassAllocator};
use crate::artifact::{CssArtifact, CssRule};
use crate::config::CompilerConfig;
use crate::declaration::Declaration;
use crate::errors::{CompileError, CompileResult};
use crate::normalizer::{RuleNormalizer, RuleValue};
use crate::registry::ClassRegistry;

/// What compiling one call site produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOutput {
  /// Replaces the call site.
  pub compiled: CompiledStyleObject,
  /// Non-fatal findings, such as properties deferred to inline styles.
  pub diagnostics: Vec<CompileError>,
  /// The rules this call site references, in precedence order.
  pub rules: Vec<CssRule>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
  pub id: String,
  pub declaration: Declaration,
}

impl CallSite {
  pub fn new(id: impl Into<String>, declaration: Declaration) -> Self {
    Self {
      id: id.into(),
      declaration,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallSiteResult {
  pub id: String,
  pub result: CompileResult<CompileOutput>,
}

#[derive(Default)]
struct PropertyGroup {
  variants: IndexMap<Vec<String>, AtomicClassEntry>,
  dynamic: Option<String>,
}

/// A call site compiled but not yet registered.
struct Prepared {
  properties: IndexMap<String, PropertyStyle>,
  entries: Vec<AtomicClassEntry>,
  diagnostics: Vec<CompileError>,
}

/// One compilation run. Owns the registry that collects every atomic rule
/// and is closed with [`CompilationContext::finalize`].
pub struct CompilationContext {
  config: CompilerConfig,
  precedence: PrecedenceModel,
  allocator: ClassAllocator,
  registry: ClassRegistry,
}

impl CompilationContext {
  pub fn new(config: CompilerConfig) -> CompileResult<Self> {
    config.validate()?;

    let precedence = PrecedenceModel::new(config.conditions.clone());
    let allocator = ClassAllocator::new(
      config.class_name_prefix.clone(),
      config.class_name_strategy,
      precedence.clone(),
    );

    Ok(Self {
      config,
      precedence,
      allocator,
      registry: ClassRegistry::new(),
    })
  }

  pub fn config(&self) -> &CompilerConfig {
    &self.config
  }

  pub fn precedence(&self) -> &PrecedenceModel {
    &self.precedence
  }

  /// Number of distinct atomic classes registered so far.
  pub fn registered(&self) -> usize {
    self.registry.len()
  }

  #[tracing::instrument(level = "trace", skip_all)]
  pub fn compile(&self, declaration: &Declaration) -> CompileResult<CompileOutput> {
    let prepared = self.prepare(declaration)?;
    self.commit(prepared)
  }

  pub fn compile_json(&self, json: &str) -> CompileResult<CompileOutput> {
    self.compile(&Declaration::from_json(json)?)
  }

  /// Compile independent call sites in parallel.
  ///
  /// Each call site fails on its own. Registration happens afterwards in
  /// call-site order, so the artifact is the same as for sequential calls.
  #[tracing::instrument(level = "trace", skip_all, fields(call_sites = call_sites.len()))]
  pub fn compile_all(&self, call_sites: &[CallSite]) -> Vec<CallSiteResult> {
    let prepared: Vec<CompileResult<Prepared>> = call_sites
      .par_iter()
      .map(|call_site| self.prepare(&call_site.declaration))
      .collect();

    call_sites
      .iter()
      .zip(prepared)
      .map(|(call_site, prepared)| CallSiteResult {
        id: call_site.id.clone(),
        result: prepared.and_then(|prepared| self.commit(prepared)),
      })
      .collect()
  }

  pub fn finalize(self) -> CssArtifact {
    let rules: Vec<CssRule> = self
      .registry
      .into_entries()
      .into_iter()
      .map(CssRule::from)
      .collect();
    tracing::debug!(rules = rules.len(), "finalized css artifact");
    CssArtifact::new(rules)
  }

  fn prepare(&self, declaration: &Declaration) -> CompileResult<Prepared> {
    let rules = RuleNormalizer::new(&self.precedence, &self.config.units).normalize(declaration)?;

    let mut groups: IndexMap<String, PropertyGroup> = IndexMap::new();
    for rule in &rules {
      let group = groups.entry(rule.property.clone()).or_default();
      match &rule.value {
        RuleValue::Dynamic(expression) => group.dynamic = Some(expression.clone()),
        RuleValue::Literal(_) | RuleValue::Fallbacks(_) => {
          let entry = self.allocator.allocate(rule)?;
          group.variants.insert(entry.condition_path.clone(), entry);
        }
      }
    }

    let mut properties = IndexMap::new();
    let mut entries = Vec::new();
    let mut diagnostics = Vec::new();

    for (property, group) in groups {
      // An unconditional runtime value overrides every static variant.
      if let Some(expression) = group.dynamic {
        tracing::warn!(%property, %expression, "deferring runtime value to an inline style");
        diagnostics.push(CompileError::UnsupportedDynamicValue {
          property: property.clone(),
          expression: expression.clone(),
        });
        let unit = self.config.units.unit_for(&property);
        properties.insert(
          property,
          PropertyStyle::Dynamic {
            expression,
            value: None,
            unit: Some(unit),
          },
        );
        continue;
      }

      let mut variants: Vec<AtomicClassEntry> = group.variants.into_values().collect();
      variants.sort_by(|a, b| a.rank.cmp(&b.rank));

      let style = match variants.as_slice() {
        [only] if only.rank.is_base() => PropertyStyle::Static {
          class_name: only.class_name.clone(),
        },
        _ => PropertyStyle::Conditional {
          variants: variants
            .iter()
            .map(|entry| ConditionalVariant {
              condition_path: entry.condition_path.clone(),
              rank: entry.rank.clone(),
              class_name: entry.class_name.clone(),
            })
            .collect(),
        },
      };

      properties.insert(property, style);
      entries.extend(variants);
    }

    Ok(Prepared {
      properties,
      entries,
      diagnostics,
    })
  }

  fn commit(&self, prepared: Prepared) -> CompileResult<CompileOutput> {
    let compiled = CompiledStyleObject::new(prepared.properties)
      .map_err(|error| CompileError::malformed(&[], error.reason))?;

    self.registry.register_all(&prepared.entries)?;

    let mut rules: Vec<CssRule> = prepared.entries.into_iter().map(CssRule::from).collect();
    rules.sort_by(|a, b| a.rank.cmp(&b.rank));

    Ok(CompileOutput {
      compiled,
      diagnostics: prepared.diagnostics,
      rules,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ClassNameStrategy;
  use crate::declaration::DeclarationValue;
  use pretty_assertions::assert_eq;

  fn context() -> CompilationContext {
    CompilationContext::new(CompilerConfig::default()).unwrap()
  }

  fn hashed_context() -> CompilationContext {
    CompilationContext::new(CompilerConfig {
      class_name_strategy: ClassNameStrategy::Hashed,
      ..CompilerConfig::default()
    })
    .unwrap()
  }

  fn kinds(compiled: &CompiledStyleObject) -> Vec<(&str, &'static str)> {
    compiled
      .properties()
      .iter()
      .map(|(property, style)| {
        let kind = match style {
          PropertyStyle::Static { .. } => "static",
          PropertyStyle::Conditional { .. } => "conditional",
          PropertyStyle::Dynamic { .. } => "dynamic",
        };
        (property.as_str(), kind)
      })
      .collect()
  }

  #[test]
  fn groups_rules_by_property() {
    let output = hashed_context()
      .compile(
        &Declaration::new()
          .property("color", "red")
          .property("display", "flex")
          .scope(":hover", Declaration::new().property("color", "blue")),
      )
      .unwrap();

    assert_eq!(
      kinds(&output.compiled),
      vec![("color", "conditional"), ("display", "static")]
    );
    assert!(output.diagnostics.is_empty());

    let Some(PropertyStyle::Conditional { variants }) = output.compiled.get("color") else {
      panic!("color should be conditional");
    };
    let paths: Vec<Vec<String>> = variants
      .iter()
      .map(|variant| variant.condition_path.clone())
      .collect();
    assert_eq!(paths, vec![vec![], vec![":hover".to_string()]]);
  }

  #[test]
  fn orders_variants_by_rank_not_source_order() {
    let output = context()
      .compile(
        &Declaration::new()
          .scope("@media (min-width: 600px)", Declaration::new().property("color", "green"))
          .scope(":hover", Declaration::new().property("color", "blue"))
          .property("color", "red"),
      )
      .unwrap();

    let Some(PropertyStyle::Conditional { variants }) = output.compiled.get("color") else {
      panic!("color should be conditional");
    };
    let paths: Vec<Vec<String>> = variants
      .iter()
      .map(|variant| variant.condition_path.clone())
      .collect();
    assert_eq!(
      paths,
      vec![
        vec![],
        vec![":hover".to_string()],
        vec!["@media (min-width:600px)".to_string()]
      ]
    );
  }

  #[test]
  fn conditional_only_properties_stay_conditional() {
    let output = context()
      .compile(&Declaration::new().scope(":hover", Declaration::new().property("color", "blue")))
      .unwrap();

    assert_eq!(kinds(&output.compiled), vec![("color", "conditional")]);
  }

  #[test]
  fn later_duplicates_replace_earlier_ones() {
    let context = context();
    let output = context
      .compile(
        &Declaration::new()
          .scope(
            ":hover",
            Declaration::new().scope(":focus", Declaration::new().property("color", "blue")),
          )
          .scope(
            ":focus",
            Declaration::new().scope(":hover", Declaration::new().property("color", "pink")),
          )
          .property("color", "red"),
      )
      .unwrap();

    let Some(PropertyStyle::Conditional { variants }) = output.compiled.get("color") else {
      panic!("color should be conditional");
    };
    assert_eq!(variants.len(), 2);
    assert_eq!(variants[1].condition_path, vec![":focus", ":hover"]);
    assert_eq!(output.rules.len(), 2);
    assert!(output.rules[1].css_text.ends_with(":focus:hover{color:pink}"));
    assert_eq!(context.registered(), 2);
  }

  #[test]
  #[tracing_test::traced_test]
  fn defers_dynamic_values_and_reports_them() {
    let output = context()
      .compile(
        &Declaration::new()
          .property("width", 10)
          .scope(":hover", Declaration::new().property("width", 20))
          .dynamic("width", "props.width")
          .property("color", "red"),
      )
      .unwrap();

    assert_eq!(
      kinds(&output.compiled),
      vec![("width", "dynamic"), ("color", "static")]
    );
    assert_eq!(
      output.diagnostics,
      vec![CompileError::UnsupportedDynamicValue {
        property: "width".into(),
        expression: "props.width".into(),
      }]
    );
    assert_eq!(output.rules.len(), 1);
    assert!(logs_contain("deferring runtime value"));
  }

  #[test]
  fn reuses_classes_across_call_sites() {
    let context = context();
    let first = context
      .compile(&Declaration::new().property("color", "red"))
      .unwrap();
    let second = context
      .compile(
        &Declaration::new()
          .property("color", "red")
          .property("margin", 0),
      )
      .unwrap();

    assert_eq!(
      first.compiled.class_names().next(),
      second.compiled.class_names().next()
    );
    assert_eq!(context.registered(), 2);

    let artifact = context.finalize();
    assert_eq!(artifact.len(), 2);
    assert!(artifact.rules()[1].css_text.ends_with("{margin:0}"));
  }

  #[test]
  fn malformed_call_sites_register_nothing() {
    let context = context();
    let result = context.compile(
      &Declaration::new()
        .property("color", "red")
        .property("width", DeclarationValue::Invalid(serde_json::Value::Null)),
    );

    assert!(matches!(result, Err(CompileError::MalformedDeclaration { .. })));
    assert_eq!(context.registered(), 0);
  }

  #[test]
  fn compiles_call_sites_in_parallel_in_isolation() {
    let context = context();
    let call_sites: Vec<CallSite> = (0..64)
      .map(|index| {
        let declaration = if index == 7 {
          Declaration::new().property(":nope", "red")
        } else {
          Declaration::new()
            .property("margin", index % 8)
            .property("color", "red")
        };
        CallSite::new(format!("site-{}", index), declaration)
      })
      .collect();

    let results = context.compile_all(&call_sites);

    assert_eq!(results.len(), 64);
    assert_eq!(results[3].id, "site-3");
    assert!(results[7].result.is_err());
    assert_eq!(
      results.iter().filter(|result| result.result.is_ok()).count(),
      63
    );
    // eight margins and one color
    assert_eq!(context.registered(), 9);
  }

  #[test]
  fn parallel_and_sequential_runs_produce_the_same_artifact() {
    let call_sites: Vec<CallSite> = (0..32)
      .map(|index| {
        CallSite::new(
          index.to_string(),
          Declaration::new()
            .property("padding", index)
            .scope(":hover", Declaration::new().property("opacity", index % 3)),
        )
      })
      .collect();

    let parallel = context();
    parallel.compile_all(&call_sites);

    let sequential = context();
    for call_site in &call_sites {
      sequential.compile(&call_site.declaration).unwrap();
    }

    assert_eq!(parallel.finalize(), sequential.finalize());
  }

  #[test]
  fn rejects_invalid_configs() {
    let result = CompilationContext::new(CompilerConfig {
      class_name_prefix: "9".into(),
      ..CompilerConfig::default()
    });
    assert!(matches!(result, Err(CompileError::InvalidConfig { .. })));
  }

  #[test]
  fn contexts_can_be_shared_between_threads() {
    fn assert_sync<T: Sync + Send>() {}
    assert_sync::<CompilationContext>();
  }
}
