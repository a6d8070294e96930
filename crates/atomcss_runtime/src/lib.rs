//! Runtime composition of compiled atomic styles.
//!
//! ```
//! use atomcss_compiler::{CompilationContext, CompilerConfig, Declaration};
//! use atomcss_runtime::merge;
//!
//! let context = CompilationContext::new(CompilerConfig::default()).unwrap();
//! let base = context
//!   .compile(&Declaration::new().property("color", "red").property("padding", 8))
//!   .unwrap()
//!   .compiled;
//! let danger = context
//!   .compile(&Declaration::new().property("color", "crimson"))
//!   .unwrap()
//!   .compiled;
//!
//! let is_danger = true;
//! let resolved = merge![&base, is_danger.then_some(&danger)].unwrap();
//! assert_eq!(resolved.class_names().len(), 2);
//! ```

pub mod input;
pub mod merge;
pub mod resolved;

pub use atomcss_core::{CompiledStyleObject, InvalidCompiledStyle, RuntimeValue};
pub use input::MergeInput;
pub use merge::merge;
pub use resolved::ResolvedStyle;

/// Variadic form of [`merge()`]: `merge![a, b, maybe_c]`.
#[macro_export]
macro_rules! merge {
  ($($input:expr),* $(,)?) => {
    $crate::merge($crate::MergeInput::Sequence(vec![$($crate::MergeInput::from($input)),*]))
  };
}
