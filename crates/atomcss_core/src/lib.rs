//! Types shared by the atomic CSS compiler and the runtime merge engine.
//!
//! The most important piece is [`PrecedenceModel`]: the compiler orders the
//! emitted stylesheet with it and the runtime orders class lists with the
//! [`SpecificityRank`] values it produced, so the two can never disagree.

pub mod compiled;
pub mod condition;
pub mod media_query;
pub mod precedence;
pub mod property;
pub mod units;

pub use compiled::{
  is_css_identifier, CompiledStyleObject, ConditionalVariant, EntryValue, InvalidCompiledStyle,
  PropertyStyle, RuntimeValue, StyleEntry, COMPILED_MARKER,
};
pub use condition::{ConditionKind, ConditionPath, ConditionTable, ConditionToken};
pub use precedence::{PrecedenceModel, SpecificityRank};
pub use property::normalize_property_name;
pub use units::{format_number, NumberUnit, UnitTable};
