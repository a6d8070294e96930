//! Compiles style declarations into atomic CSS.
//!
//! A [`CompilationContext`] is created once per run. Each call site's
//! [`Declaration`] is flattened into single-property rules, every rule gets a
//! deterministic class name, and the call site is replaced by a
//! [`CompiledStyleObject`](atomcss_core::CompiledStyleObject). The CSS of all
//! call sites is collected in a shared registry and handed out by
//! [`CompilationContext::finalize`].
//!
//! ```
//! use atomcss_compiler::{CompilationContext, CompilerConfig, Declaration};
//!
//! let context = CompilationContext::new(CompilerConfig::default()).unwrap();
//! let output = context
//!   .compile(&Declaration::new().property("color", "red"))
//!   .unwrap();
//!
//! let artifact = context.finalize();
//! assert!(output.compiled.class_names().all(|name| artifact.contains(name)));
//! ```

pub mod allocator;
pub mod artifact;
pub mod config;
pub mod context;
pub mod declaration;
pub mod errors;
pub mod normalizer;
pub mod registry;

pub use allocator::{AtomicClassEntry, ClassAllocator};
pub use artifact::{CssArtifact, CssRule};
pub use config::{ClassNameStrategy, CompilerConfig};
pub use context::{CallSite, CallSiteResult, CompilationContext, CompileOutput};
pub use declaration::{Declaration, DeclarationValue, DynamicValue};
pub use errors::{CompileError, CompileResult};
pub use normalizer::{RuleNormalizer, RuleValue, StyleRule};
pub use registry::ClassRegistry;
