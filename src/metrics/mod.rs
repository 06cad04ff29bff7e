//! @ai:module:intent Confusion-bucket aggregation across partitions
//! @ai:module:layer application
//! @ai:module:public_api Aggregator, ConfusionBucket, Partition, EvaluationResults

pub mod aggregator;
pub mod types;

pub use aggregator::Aggregator;
pub use types::{
    CategoryResult, ConfusionBucket, EvaluationResults, Partition, PartitionResults, RunError,
};
