//! @ai:module:intent Confusion buckets and evaluation result types
//! @ai:module:layer domain
//! @ai:module:public_api ConfusionBucket, Partition, CategoryResult, PartitionResults, RunError, EvaluationResults
//! @ai:module:stateless true

use crate::corpus::{Category, ChainType};
use crate::error::{ErrorKind, EvalError};
use crate::matcher::{Classification, Diagnostic};
use serde::{Deserialize, Serialize};

/// @ai:intent Per-category accumulator of classified counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionBucket {
    pub defects: u64,
    pub benchmark: u64,
    pub true_positives: u64,
    pub true_negatives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
}

impl ConfusionBucket {
    /// @ai:intent Add a classification field by field
    /// @ai:effects state:write
    pub fn accumulate(&mut self, c: &Classification) {
        self.defects += c.defects;
        self.benchmark += c.benchmark;
        self.true_positives += c.true_positives;
        self.true_negatives += c.true_negatives;
        self.false_positives += c.false_positives;
        self.false_negatives += c.false_negatives;
    }

    /// @ai:intent TP / (TP + FP), None when nothing was flagged
    /// @ai:effects pure
    pub fn precision(&self) -> Option<f64> {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// @ai:intent TP / (TP + FN), None when nothing is annotated
    /// @ai:effects pure
    pub fn recall(&self) -> Option<f64> {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }
}

fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

/// @ai:intent Grouping key buckets are aggregated under
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum Partition {
    All,
    Chain { chain: ChainType },
    Package { package: String },
    Module { package: String, module: String },
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Partition::All => write!(f, "all"),
            Partition::Chain { chain } => write!(f, "chain:{}", chain),
            Partition::Package { package } => write!(f, "package:{}", package),
            Partition::Module { package, module } => write!(f, "module:{}::{}", package, module),
        }
    }
}

/// @ai:intent Bucket of one category with derived metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: Category,
    pub bucket: ConfusionBucket,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
}

impl CategoryResult {
    pub fn new(category: Category, bucket: ConfusionBucket) -> Self {
        Self {
            category,
            bucket,
            precision: bucket.precision(),
            recall: bucket.recall(),
        }
    }
}

/// @ai:intent All category buckets of one partition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionResults {
    pub partition: Partition,
    pub categories: Vec<CategoryResult>,
}

impl PartitionResults {
    pub fn category(&self, category: Category) -> Option<&CategoryResult> {
        self.categories.iter().find(|c| c.category == category)
    }
}

/// @ai:intent Serializable record of a per-unit error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    pub kind: ErrorKind,
    pub package: Option<String>,
    pub module: Option<String>,
    pub message: String,
}

impl From<&EvalError> for RunError {
    fn from(err: &EvalError) -> Self {
        let (package, module) = match err {
            EvalError::MalformedInput { package, .. } => (Some(package.clone()), None),
            EvalError::MissingReport { package, .. } => (Some(package.clone()), None),
            EvalError::InconsistentCount {
                package, module, ..
            } => (Some(package.clone()), Some(module.clone())),
            EvalError::InvalidAnnotation {
                package, module, ..
            } => (Some(package.clone()), Some(module.clone())),
            EvalError::FileRead { .. } => (None, None),
        };

        Self {
            kind: err.kind(),
            package,
            module,
            message: err.to_string(),
        }
    }
}

/// @ai:intent Complete output of one evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResults {
    pub timestamp: String,
    pub categories: Vec<Category>,
    pub partitions: Vec<PartitionResults>,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(default)]
    pub errors: Vec<RunError>,
    pub units_evaluated: u64,
    pub units_skipped: u64,
}

impl EvaluationResults {
    /// @ai:intent Buckets of a partition, if any unit fell into it
    /// @ai:effects pure
    pub fn partition(&self, partition: &Partition) -> Option<&PartitionResults> {
        self.partitions.iter().find(|p| &p.partition == partition)
    }

    /// @ai:intent Buckets across the whole run
    /// @ai:effects pure
    pub fn overall(&self) -> Option<&PartitionResults> {
        self.partition(&Partition::All)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors_of(&self, kind: ErrorKind) -> impl Iterator<Item = &RunError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }

    /// @ai:intent Diagnostics of one category, in report order
    /// @ai:effects pure
    pub fn diagnostics_for(&self, category: Category) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_is_additive() {
        let mut bucket = ConfusionBucket::default();
        let c = Classification {
            defects: 3,
            benchmark: 2,
            true_positives: 2,
            true_negatives: 1,
            false_positives: 1,
            false_negatives: 0,
        };

        bucket.accumulate(&c);
        bucket.accumulate(&c);

        assert_eq!(bucket.defects, 6);
        assert_eq!(bucket.true_positives, 4);
        assert_eq!(bucket.true_negatives, 2);
    }

    #[test]
    fn test_precision_and_recall() {
        let bucket = ConfusionBucket {
            true_positives: 3,
            false_positives: 1,
            false_negatives: 3,
            ..Default::default()
        };
        assert!((bucket.precision().unwrap() - 0.75).abs() < 1e-9);
        assert!((bucket.recall().unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_undefined_on_zero_denominator() {
        let bucket = ConfusionBucket {
            true_negatives: 5,
            ..Default::default()
        };
        assert_eq!(bucket.precision(), None);
        assert_eq!(bucket.recall(), None);
    }

    #[test]
    fn test_partition_display_and_order() {
        let chain = Partition::Chain {
            chain: ChainType::Sui,
        };
        let package = Partition::Package {
            package: "p".to_string(),
        };
        assert_eq!(chain.to_string(), "chain:Sui");
        assert!(Partition::All < chain);
        assert!(chain < package);
    }

    #[test]
    fn test_run_error_from_missing_report() {
        let err = EvalError::MissingReport {
            chain: ChainType::Aptos,
            package: "p".to_string(),
        };
        let record = RunError::from(&err);
        assert_eq!(record.kind, ErrorKind::MissingReport);
        assert_eq!(record.package.as_deref(), Some("p"));
        assert_eq!(record.module, None);
    }
}
