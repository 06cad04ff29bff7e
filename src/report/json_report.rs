//! @ai:module:intent JSON report generation
//! @ai:module:layer infrastructure
//! @ai:module:public_api JsonReporter
//! @ai:module:stateless true

use crate::metrics::EvaluationResults;
use anyhow::{Context, Result};
use std::path::Path;

/// @ai:intent Trait for JSON report generation
pub trait JsonReporterTrait: Send + Sync {
    /// @ai:intent Generate JSON report from results
    fn generate(&self, results: &EvaluationResults, output_path: &Path) -> Result<()>;
}

/// @ai:intent Generates JSON reports from evaluation results
pub struct JsonReporter;

impl JsonReporter {
    /// @ai:intent Create a new JSON reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Read back a results file written by `generate`
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<EvaluationResults> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let results = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(results)
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReporterTrait for JsonReporter {
    /// @ai:intent Generate JSON report to file
    /// @ai:effects fs:write
    fn generate(&self, results: &EvaluationResults, output_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(output_path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::ChainType;
    use crate::metrics::{Partition, PartitionResults};
    use crate::report::text_report::tests::sample_results;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_generate_json_report() {
        let reporter = JsonReporter::new();
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("results.json");

        reporter.generate(&sample_results(), &output).unwrap();
        assert!(output.exists());

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("\"true_positives\": 2"));
        assert!(content.contains("\"precision\": null"));
        assert!(content.contains("\"kind\": \"missing_report\""));
    }

    #[test]
    fn test_load_reads_generated_file() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("results.json");
        JsonReporter::new().generate(&sample_results(), &output).unwrap();

        let loaded = JsonReporter::load(&output).unwrap();
        assert_eq!(loaded.units_evaluated, 1);
        assert_eq!(loaded.diagnostics.len(), 1);
        assert_eq!(loaded.errors.len(), 1);
    }

    #[test]
    fn test_chain_partition_survives_reload() {
        let mut results = sample_results();
        let chain = Partition::Chain {
            chain: ChainType::Sui,
        };
        results.partitions.push(PartitionResults {
            partition: chain.clone(),
            categories: results.partitions[0].categories.clone(),
        });

        let temp = TempDir::new().unwrap();
        let output = temp.path().join("results.json");
        JsonReporter::new().generate(&results, &output).unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("\"scope\": \"chain\""));
        assert!(content.contains("\"chain\": 1"));

        let loaded = JsonReporter::load(&output).unwrap();
        assert_eq!(loaded.partitions.len(), 2);
        assert_eq!(loaded.partitions[1].partition, chain);
        assert!(loaded.partition(&chain).is_some());
    }
}
