//! @ai:module:intent Per-unit comparison of ground truth and scanner findings
//! @ai:module:layer application
//! @ai:module:public_api Matcher, MatcherTrait, Classification, Diagnostic, ModuleOutcome

pub mod classifier;
pub mod types;

pub use classifier::{Matcher, MatcherTrait};
pub use types::{
    CategoryOutcome, Classification, Diagnostic, DiagnosticKind, ModuleOutcome, UnitRef,
};
