//! @ai:module:intent Benchmark ground truth and scanner report records
//! @ai:module:layer domain
//! @ai:module:public_api BenchmarkSet, BenchmarkEntry, ChainType, Category, ToolReport, ReportSource

pub mod benchmark;
pub mod category;
pub mod loader;
pub mod report;

pub use benchmark::{
    BenchmarkEntry, BenchmarkSet, ChainType, FunctionAnnotation, ModuleAnnotation, RejectedEntry,
};
pub use category::{Category, Granularity, LocationForm};
pub use loader::{FsReportSource, InMemoryReportSource, ReportSource};
pub use report::{
    Finding, FunctionCount, Location, LocationDecoder, ModuleResult, ModulesStatus, ToolReport,
};
