//! @ai:module:intent Evaluation run orchestration
//! @ai:module:layer application
//! @ai:module:public_api EvaluationExecutor, evaluate, evaluate_package

pub mod executor;

pub use executor::{evaluate, evaluate_package, EvaluationExecutor, PackageOutcome};
