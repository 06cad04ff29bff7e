//! @ai:module:intent CSV exports of buckets and diagnostics
//! @ai:module:layer infrastructure
//! @ai:module:public_api CsvReporter, escape_field
//! @ai:module:stateless true

use crate::metrics::EvaluationResults;
use anyhow::Result;
use std::fmt::Write as FmtWrite;
use std::path::Path;

/// @ai:intent Quote a CSV field when it contains a separator, quote or newline
/// @ai:effects pure
/// @ai:example ("a,b") -> "\"a,b\""
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn metric_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.6}", v)).unwrap_or_default()
}

/// @ai:intent Writes buckets.csv and diagnostics.csv
pub struct CsvReporter;

impl CsvReporter {
    /// @ai:intent Create a new CSV reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent One row per (partition, category) bucket
    /// @ai:effects pure
    pub fn buckets_csv(&self, results: &EvaluationResults) -> String {
        let mut output = String::new();
        writeln!(
            output,
            "partition,category,defects,benchmark,tp,tn,fp,fn,precision,recall"
        )
        .unwrap();

        for partition in &results.partitions {
            let label = escape_field(&partition.partition.to_string());
            for result in &partition.categories {
                let b = &result.bucket;
                writeln!(
                    output,
                    "{},{},{},{},{},{},{},{},{},{}",
                    label,
                    result.category,
                    b.defects,
                    b.benchmark,
                    b.true_positives,
                    b.true_negatives,
                    b.false_positives,
                    b.false_negatives,
                    metric_cell(result.precision),
                    metric_cell(result.recall)
                )
                .unwrap();
            }
        }

        output
    }

    /// @ai:intent One row per diagnostic, in report order
    /// @ai:effects pure
    pub fn diagnostics_csv(&self, results: &EvaluationResults) -> String {
        let mut output = String::new();
        writeln!(output, "category,package,module,function,kind,delta,message").unwrap();

        for d in &results.diagnostics {
            writeln!(
                output,
                "{},{},{},{},{},{},{}",
                d.category,
                escape_field(&d.package),
                escape_field(&d.module),
                escape_field(d.function.as_deref().unwrap_or("")),
                d.kind.as_str(),
                d.delta,
                escape_field(&d.message())
            )
            .unwrap();
        }

        output
    }

    /// @ai:intent Write both CSV files into a directory
    /// @ai:effects fs:write
    pub fn generate(&self, results: &EvaluationResults, output_dir: &Path) -> Result<Vec<String>> {
        std::fs::write(output_dir.join("buckets.csv"), self.buckets_csv(results))?;
        std::fs::write(output_dir.join("diagnostics.csv"), self.diagnostics_csv(results))?;
        Ok(vec!["buckets.csv".to_string(), "diagnostics.csv".to_string()])
    }
}

impl Default for CsvReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::text_report::tests::sample_results;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_buckets_csv_rows() {
        let csv = CsvReporter::new().buckets_csv(&sample_results());
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "all,overflow,3,2,2,0,1,0,0.666667,1.000000");
        assert_eq!(lines[2], "all,unused_constant,0,0,0,0,0,0,,");
    }

    #[test]
    fn test_diagnostics_csv_rows() {
        let csv = CsvReporter::new().diagnostics_csv(&sample_results());
        assert_eq!(
            csv.lines().nth(1),
            Some("overflow,pkg,pool,f,over_flagged,1,over-flagged 1 instance in f")
        );
    }

    #[test]
    fn test_generate_writes_files() {
        let temp = TempDir::new().unwrap();
        let files = CsvReporter::new()
            .generate(&sample_results(), temp.path())
            .unwrap();

        assert_eq!(files.len(), 2);
        assert!(temp.path().join("buckets.csv").exists());
        assert!(temp.path().join("diagnostics.csv").exists());
    }
}
