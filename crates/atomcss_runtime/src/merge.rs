use atomcss_core::{EntryValue, InvalidCompiledStyle};

use crate::input::{MergeInput, Source};
use crate::resolved::{ResolutionState, ResolvedStyle};

/// Compose compiled styles into the classes and inline styles of one element.
///
/// Inputs are flattened depth-first; later inputs override earlier ones for
/// the same property and condition, while other conditions of that property
/// survive. A bound runtime value for a property removes every class of that
/// property, wherever it appears.
#[tracing::instrument(level = "trace", skip_all)]
pub fn merge<'a>(input: impl Into<MergeInput<'a>>) -> Result<ResolvedStyle, InvalidCompiledStyle> {
  let input = input.into();
  let mut state = ResolutionState::default();

  for source in input.flatten() {
    match source {
      Source::Resolved(resolved) => state.extend(resolved.state()),
      Source::Style(style) => {
        style.validate()?;

        for entry in style.entries() {
          match entry.value {
            EntryValue::Class(class_name) => {
              state.set_class(entry.property, entry.condition_path, entry.rank, class_name)
            }
            EntryValue::Dynamic {
              value: Some(value), ..
            } => state.set_inline(entry.property, value),
            EntryValue::Dynamic {
              expression,
              value: None,
            } => {
              return Err(InvalidCompiledStyle::new(format!(
                "'{}' needs a runtime value for '{}'; bind it before merging",
                entry.property, expression
              )))
            }
          }
        }
      }
    }
  }

  Ok(state.into_resolved())
}
