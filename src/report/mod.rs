//! @ai:module:intent Report generation for evaluation results
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportGenerator, TextReporter, JsonReporter, MarkdownReporter, CsvReporter, ChartGenerator

pub mod charts;
pub mod csv_report;
pub mod json_report;
pub mod markdown_report;
pub mod text_report;

pub use charts::{ChartGenerator, ChartGeneratorTrait};
pub use csv_report::CsvReporter;
pub use json_report::{JsonReporter, JsonReporterTrait};
pub use markdown_report::{MarkdownReporter, MarkdownReporterTrait};
pub use text_report::{format_metric, TextReporter};

use crate::metrics::EvaluationResults;
use anyhow::{Context, Result};
use std::path::Path;

/// @ai:intent Combined report generator
pub struct ReportGenerator {
    json: JsonReporter,
    markdown: MarkdownReporter,
    csv: CsvReporter,
    charts: ChartGenerator,
}

impl ReportGenerator {
    /// @ai:intent Create a new report generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            json: JsonReporter::new(),
            markdown: MarkdownReporter::new(),
            csv: CsvReporter::new(),
            charts: ChartGenerator::new(),
        }
    }

    /// @ai:intent Generate all reports
    /// @ai:effects fs:write
    pub fn generate_all(&self, results: &EvaluationResults, output_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        self.json.generate(results, &output_dir.join("results.json"))?;
        self.markdown
            .generate(results, &output_dir.join("results.md"))?;
        self.csv.generate(results, output_dir)?;
        self.charts.generate_all(results, output_dir)?;

        tracing::info!("Reports generated in {}", output_dir.display());
        Ok(())
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}
