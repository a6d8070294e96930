use atomcss_core::CompiledStyleObject;

use crate::resolved::ResolvedStyle;

/// Anything that can be passed to [`crate::merge`].
///
/// Order inside a [`MergeInput::Sequence`] matters: later inputs override
/// earlier ones. [`MergeInput::Absent`] stands for a style that was switched
/// off, e.g. `is_active.then_some(&active)`.
#[derive(Debug, Clone)]
pub enum MergeInput<'a> {
  Style(&'a CompiledStyleObject),
  Resolved(&'a ResolvedStyle),
  Sequence(Vec<MergeInput<'a>>),
  Absent,
}

pub(crate) enum Source<'a> {
  Style(&'a CompiledStyleObject),
  Resolved(&'a ResolvedStyle),
}

impl<'a> MergeInput<'a> {
  /// Depth-first, left to right, without absent entries.
  pub(crate) fn flatten(&self) -> Vec<Source<'a>> {
    let mut sources = Vec::new();
    self.flatten_into(&mut sources);
    sources
  }

  fn flatten_into(&self, sources: &mut Vec<Source<'a>>) {
    match self {
      MergeInput::Style(style) => sources.push(Source::Style(*style)),
      MergeInput::Resolved(resolved) => sources.push(Source::Resolved(*resolved)),
      MergeInput::Sequence(inputs) => {
        for input in inputs {
          input.flatten_into(sources);
        }
      }
      MergeInput::Absent => {}
    }
  }
}

impl<'a> From<&'a CompiledStyleObject> for MergeInput<'a> {
  fn from(style: &'a CompiledStyleObject) -> Self {
    MergeInput::Style(style)
  }
}

impl<'a> From<&'a ResolvedStyle> for MergeInput<'a> {
  fn from(resolved: &'a ResolvedStyle) -> Self {
    MergeInput::Resolved(resolved)
  }
}

impl<'a, T: Into<MergeInput<'a>>> From<Option<T>> for MergeInput<'a> {
  fn from(input: Option<T>) -> Self {
    match input {
      Some(input) => input.into(),
      None => MergeInput::Absent,
    }
  }
}

impl<'a, T: Into<MergeInput<'a>>> From<Vec<T>> for MergeInput<'a> {
  fn from(inputs: Vec<T>) -> Self {
    MergeInput::Sequence(inputs.into_iter().map(Into::into).collect())
  }
}
