//! @ai:module:intent Markdown report generation
//! @ai:module:layer infrastructure
//! @ai:module:public_api MarkdownReporter
//! @ai:module:stateless true

use crate::metrics::{EvaluationResults, Partition, PartitionResults};
use crate::report::text_report::format_metric;
use anyhow::Result;
use std::fmt::Write as FmtWrite;
use std::path::Path;

/// @ai:intent Trait for Markdown report generation
pub trait MarkdownReporterTrait: Send + Sync {
    /// @ai:intent Generate Markdown report from results
    fn generate(&self, results: &EvaluationResults, output_path: &Path) -> Result<()>;
}

/// @ai:intent Generates Markdown reports from evaluation results
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// @ai:intent Create a new Markdown reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Heading text for a partition section
    /// @ai:effects pure
    fn partition_title(partition: &Partition) -> String {
        match partition {
            Partition::All => "Overall Results".to_string(),
            Partition::Chain { chain } => format!("Chain: {}", chain),
            Partition::Package { package } => format!("Package: {}", package),
            Partition::Module { package, module } => format!("Module: {}::{}", package, module),
        }
    }

    /// @ai:intent Generate overall summary section
    /// @ai:effects pure
    fn generate_summary(results: &EvaluationResults) -> String {
        let mut output = String::new();

        writeln!(output, "# Scanner Evaluation Results").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "**Date:** {}", results.timestamp).unwrap();
        writeln!(output, "**Units evaluated:** {}", results.units_evaluated).unwrap();
        writeln!(output, "**Units skipped:** {}", results.units_skipped).unwrap();
        writeln!(output, "**Errors:** {}", results.errors.len()).unwrap();
        writeln!(output).unwrap();

        output
    }

    /// @ai:intent Generate one confusion table
    /// @ai:effects pure
    fn generate_partition_table(partition: &PartitionResults) -> String {
        let mut output = String::new();

        writeln!(output, "## {}", Self::partition_title(&partition.partition)).unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "| Category | Defects | Benchmark | TP | TN | FP | FN | Precision | Recall |"
        )
        .unwrap();
        writeln!(
            output,
            "|----------|---------|-----------|----|----|----|----|-----------|--------|"
        )
        .unwrap();

        for result in &partition.categories {
            let b = &result.bucket;
            writeln!(
                output,
                "| {} | {} | {} | {} | {} | {} | {} | {} | {} |",
                result.category,
                b.defects,
                b.benchmark,
                b.true_positives,
                b.true_negatives,
                b.false_positives,
                b.false_negatives,
                format_metric(result.precision),
                format_metric(result.recall)
            )
            .unwrap();
        }

        writeln!(output).unwrap();
        output
    }

    /// @ai:intent Generate diagnostics grouped by category
    /// @ai:effects pure
    fn generate_diagnostics_section(results: &EvaluationResults) -> String {
        let mut output = String::new();
        if results.diagnostics.is_empty() {
            return output;
        }

        writeln!(output, "## Diagnostics").unwrap();
        writeln!(output).unwrap();

        for category in &results.categories {
            let diagnostics: Vec<_> = results.diagnostics_for(*category).collect();
            if diagnostics.is_empty() {
                continue;
            }
            writeln!(output, "### {} ({})", category, diagnostics.len()).unwrap();
            writeln!(output).unwrap();
            for diagnostic in diagnostics {
                writeln!(output, "- `{}->{}`: {}", diagnostic.package, diagnostic.module, diagnostic.message()).unwrap();
            }
            writeln!(output).unwrap();
        }

        output
    }

    /// @ai:intent Generate errors section
    /// @ai:effects pure
    fn generate_errors_section(results: &EvaluationResults) -> String {
        let mut output = String::new();
        if !results.has_errors() {
            return output;
        }

        writeln!(output, "## Errors").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "| Kind | Package | Module | Message |").unwrap();
        writeln!(output, "|------|---------|--------|---------|").unwrap();
        for error in &results.errors {
            writeln!(
                output,
                "| {} | {} | {} | {} |",
                error.kind,
                error.package.as_deref().unwrap_or("-"),
                error.module.as_deref().unwrap_or("-"),
                error.message.replace('|', "\\|")
            )
            .unwrap();
        }
        writeln!(output).unwrap();

        output
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownReporterTrait for MarkdownReporter {
    /// @ai:intent Generate Markdown report to file
    /// @ai:effects fs:write
    fn generate(&self, results: &EvaluationResults, output_path: &Path) -> Result<()> {
        let mut content = String::new();

        content.push_str(&Self::generate_summary(results));
        for partition in &results.partitions {
            content.push_str(&Self::generate_partition_table(partition));
        }
        content.push_str(&Self::generate_diagnostics_section(results));
        content.push_str(&Self::generate_errors_section(results));

        std::fs::write(output_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::ChainType;
    use crate::report::text_report::tests::sample_results;
    use tempfile::TempDir;

    #[test]
    fn test_partition_title() {
        assert_eq!(
            MarkdownReporter::partition_title(&Partition::Chain {
                chain: ChainType::Aptos
            }),
            "Chain: Aptos"
        );
    }

    #[test]
    fn test_generate_markdown_report() {
        let reporter = MarkdownReporter::new();
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("results.md");

        reporter.generate(&sample_results(), &output).unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("# Scanner Evaluation Results"));
        assert!(content.contains("## Overall Results"));
        assert!(content.contains("| overflow | 3 | 2 | 2 | 0 | 1 | 0 | 0.667 | 1.000 |"));
        assert!(content.contains("### overflow (1)"));
        assert!(content.contains("- `pkg->pool`: over-flagged 1 instance in f"));
        assert!(content.contains("| missing_report | absent | - |"));
    }
}
