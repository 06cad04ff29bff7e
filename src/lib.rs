//! @ai:module:intent Benchmark evaluation engine for Move bytecode defect scanners
//! @ai:module:layer application
//! @ai:module:public_api config, corpus, error, matcher, metrics, runner, report, census

pub mod census;
pub mod config;
pub mod corpus;
pub mod error;
pub mod matcher;
pub mod metrics;
pub mod report;
pub mod runner;

pub use config::EvalConfig;
pub use corpus::{BenchmarkSet, Category, ChainType, FsReportSource, ReportSource, ToolReport};
pub use error::{EvalError, ErrorKind};
pub use matcher::{Matcher, MatcherTrait};
pub use metrics::{Aggregator, ConfusionBucket, EvaluationResults, Partition};
pub use report::{ReportGenerator, TextReporter};
pub use runner::{evaluate, EvaluationExecutor};
