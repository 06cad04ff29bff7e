//! @ai:module:intent Plain-text confusion table and diagnostics listing
//! @ai:module:layer infrastructure
//! @ai:module:public_api TextReporter, format_metric
//! @ai:module:stateless true

use crate::metrics::{EvaluationResults, PartitionResults};
use std::io::{self, Write};

/// @ai:intent Render a precision or recall value, `undefined` on a zero denominator
/// @ai:effects pure
/// @ai:example (Some(0.75)) -> "0.750"
/// @ai:example (None) -> "undefined"
pub fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => "undefined".to_string(),
    }
}

/// @ai:intent Writes evaluation results as aligned text to any sink
pub struct TextReporter {
    show_metrics: bool,
}

impl TextReporter {
    /// @ai:intent Create a text reporter
    /// @ai:effects pure
    pub fn new(show_metrics: bool) -> Self {
        Self { show_metrics }
    }

    fn write_partition<W: Write>(&self, out: &mut W, partition: &PartitionResults) -> io::Result<()> {
        writeln!(out, "== {} ==", partition.partition)?;
        write!(
            out,
            "{:<28} {:>8} {:>9} {:>6} {:>6} {:>6} {:>6}",
            "Category", "Defects", "Benchmark", "TP", "TN", "FP", "FN"
        )?;
        if self.show_metrics {
            write!(out, " {:>10} {:>10}", "Precision", "Recall")?;
        }
        writeln!(out)?;

        for result in &partition.categories {
            let b = &result.bucket;
            write!(
                out,
                "{:<28} {:>8} {:>9} {:>6} {:>6} {:>6} {:>6}",
                result.category.as_str(),
                b.defects,
                b.benchmark,
                b.true_positives,
                b.true_negatives,
                b.false_positives,
                b.false_negatives
            )?;
            if self.show_metrics {
                write!(
                    out,
                    " {:>10} {:>10}",
                    format_metric(result.precision),
                    format_metric(result.recall)
                )?;
            }
            writeln!(out)?;
        }
        writeln!(out)
    }

    /// @ai:intent Write the full report: tables, diagnostics by category, errors
    /// @ai:effects io
    pub fn render<W: Write>(&self, results: &EvaluationResults, out: &mut W) -> io::Result<()> {
        writeln!(out, "Scanner evaluation ({})", results.timestamp)?;
        writeln!(
            out,
            "Units evaluated: {}, skipped: {}",
            results.units_evaluated, results.units_skipped
        )?;
        writeln!(out)?;

        for partition in &results.partitions {
            self.write_partition(out, partition)?;
        }

        if !results.diagnostics.is_empty() {
            writeln!(out, "== Diagnostics ==")?;
            for category in &results.categories {
                let mut diagnostics = results.diagnostics_for(*category).peekable();
                if diagnostics.peek().is_none() {
                    continue;
                }
                writeln!(out, "[{}]", category)?;
                for diagnostic in diagnostics {
                    writeln!(out, "  {}", diagnostic)?;
                }
            }
            writeln!(out)?;
        }

        if results.has_errors() {
            writeln!(out, "== Errors ==")?;
            for error in &results.errors {
                writeln!(out, "  [{}] {}", error.kind, error.message)?;
            }
        }

        Ok(())
    }

    /// @ai:intent Render into a String
    /// @ai:effects pure
    pub fn render_to_string(&self, results: &EvaluationResults) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.render(results, &mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Default for TextReporter {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::corpus::{Category, ChainType};
    use crate::error::EvalError;
    use crate::matcher::{Diagnostic, DiagnosticKind, UnitRef};
    use crate::metrics::{CategoryResult, ConfusionBucket, Partition, RunError};

    pub(crate) fn sample_results() -> EvaluationResults {
        let unit = UnitRef::new(ChainType::Aptos, "pkg", "pool");
        let overflow = ConfusionBucket {
            defects: 3,
            benchmark: 2,
            true_positives: 2,
            true_negatives: 0,
            false_positives: 1,
            false_negatives: 0,
        };
        EvaluationResults {
            timestamp: "2026-01-19T00:00:00Z".to_string(),
            categories: vec![Category::Overflow, Category::UnusedConstant],
            partitions: vec![PartitionResults {
                partition: Partition::All,
                categories: vec![
                    CategoryResult::new(Category::Overflow, overflow),
                    CategoryResult::new(Category::UnusedConstant, ConfusionBucket::default()),
                ],
            }],
            diagnostics: vec![Diagnostic::new(
                &unit,
                Some("f"),
                Category::Overflow,
                DiagnosticKind::OverFlagged,
                1,
            )],
            errors: vec![RunError::from(&EvalError::MissingReport {
                chain: ChainType::Sui,
                package: "absent".to_string(),
            })],
            units_evaluated: 1,
            units_skipped: 1,
        }
    }

    #[test]
    fn test_format_metric() {
        assert_eq!(format_metric(Some(2.0 / 3.0)), "0.667");
        assert_eq!(format_metric(None), "undefined");
    }

    #[test]
    fn test_render_table_and_sections() {
        let text = TextReporter::new(true).render_to_string(&sample_results());

        assert!(text.contains("== all =="));
        assert!(text.contains("Precision"));
        assert!(text.contains("0.667"));
        assert!(text.contains("undefined"));
        assert!(text.contains("[overflow]\n  pkg->pool: over-flagged 1 instance in f"));
        assert!(text.contains("[missing_report] no scanner report for Sui/absent"));
        assert!(!text.contains("[unused_constant]"));
    }

    #[test]
    fn test_render_without_metrics() {
        let text = TextReporter::new(false).render_to_string(&sample_results());
        assert!(!text.contains("Precision"));
        assert!(!text.contains("undefined"));
    }
}
