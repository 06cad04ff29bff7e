//! @ai:module:intent Chart generation for evaluation results
//! @ai:module:layer infrastructure
//! @ai:module:public_api ChartGenerator
//! @ai:module:stateless true

use crate::metrics::{EvaluationResults, PartitionResults};
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;

/// @ai:intent Trait for chart generation
pub trait ChartGeneratorTrait: Send + Sync {
    /// @ai:intent Generate all charts from results
    fn generate_all(&self, results: &EvaluationResults, output_dir: &Path) -> Result<Vec<String>>;
}

/// @ai:intent Generates charts from evaluation results
pub struct ChartGenerator;

impl ChartGenerator {
    /// @ai:intent Create a new chart generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Precision and recall per category; undefined values draw no bar
    /// @ai:effects fs:write
    fn generate_precision_recall_chart(
        &self,
        overall: &PartitionResults,
        output_path: &Path,
    ) -> Result<()> {
        let root = BitMapBackend::new(output_path, (1000, 600)).into_drawing_area();
        root.fill(&WHITE)?;

        let data: Vec<_> = overall
            .categories
            .iter()
            .map(|c| (c.category.as_str(), c.precision, c.recall))
            .collect();

        let mut chart = ChartBuilder::on(&root)
            .caption("Precision and Recall by Category", ("sans-serif", 25))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(50)
            .build_cartesian_2d(0f64..data.len() as f64, 0f64..1f64)?;

        chart
            .configure_mesh()
            .x_labels(data.len())
            .y_desc("Ratio")
            .x_label_formatter(&|x| {
                data.get(*x as usize)
                    .map(|(name, _, _)| name.to_string())
                    .unwrap_or_default()
            })
            .draw()?;

        chart
            .draw_series(data.iter().enumerate().filter_map(|(i, (_, precision, _))| {
                precision.map(|p| {
                    let x = i as f64;
                    Rectangle::new([(x + 0.1, 0.0), (x + 0.45, p)], BLUE.mix(0.7).filled())
                })
            }))?
            .label("Precision")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], BLUE.mix(0.7).filled()));

        chart
            .draw_series(data.iter().enumerate().filter_map(|(i, (_, _, recall))| {
                recall.map(|r| {
                    let x = i as f64;
                    Rectangle::new([(x + 0.5, 0.0), (x + 0.85, r)], GREEN.mix(0.7).filled())
                })
            }))?
            .label("Recall")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], GREEN.mix(0.7).filled()));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    /// @ai:intent TP, FP and FN counts per category
    /// @ai:effects fs:write
    fn generate_confusion_chart(&self, overall: &PartitionResults, output_path: &Path) -> Result<()> {
        let root = BitMapBackend::new(output_path, (1000, 600)).into_drawing_area();
        root.fill(&WHITE)?;

        let data: Vec<_> = overall
            .categories
            .iter()
            .map(|c| {
                (
                    c.category.as_str(),
                    c.bucket.true_positives as f64,
                    c.bucket.false_positives as f64,
                    c.bucket.false_negatives as f64,
                )
            })
            .collect();
        let max = data
            .iter()
            .map(|(_, tp, fp, fn_)| tp.max(*fp).max(*fn_))
            .fold(1.0f64, f64::max);

        let mut chart = ChartBuilder::on(&root)
            .caption("Confusion Counts by Category", ("sans-serif", 25))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..data.len() as f64, 0f64..max * 1.1)?;

        chart
            .configure_mesh()
            .x_labels(data.len())
            .y_desc("Instances")
            .x_label_formatter(&|x| {
                data.get(*x as usize)
                    .map(|(name, _, _, _)| name.to_string())
                    .unwrap_or_default()
            })
            .draw()?;

        let series: [(&str, RGBColor, f64, fn(&(&str, f64, f64, f64)) -> f64); 3] = [
            ("TP", GREEN, 0.1, |d| d.1),
            ("FP", RED, 0.35, |d| d.2),
            ("FN", BLUE, 0.6, |d| d.3),
        ];

        for (label, color, offset, value) in series {
            chart
                .draw_series(data.iter().enumerate().map(|(i, d)| {
                    let x = i as f64 + offset;
                    Rectangle::new([(x, 0.0), (x + 0.25, value(d))], color.mix(0.7).filled())
                }))?
                .label(label)
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.mix(0.7).filled())
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }
}

impl Default for ChartGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartGeneratorTrait for ChartGenerator {
    /// @ai:intent Generate all charts for the run-wide partition
    /// @ai:effects fs:write
    fn generate_all(&self, results: &EvaluationResults, output_dir: &Path) -> Result<Vec<String>> {
        let mut files = Vec::new();

        let Some(overall) = results.overall().filter(|p| !p.categories.is_empty()) else {
            tracing::warn!("No run-wide partition; skipping charts");
            return Ok(files);
        };

        let pr_path = output_dir.join("precision_recall.png");
        self.generate_precision_recall_chart(overall, &pr_path)?;
        files.push("precision_recall.png".to_string());

        let confusion_path = output_dir.join("confusion.png");
        self.generate_confusion_chart(overall, &confusion_path)?;
        files.push("confusion.png".to_string());

        tracing::info!("Generated {} charts", files.len());
        Ok(files)
    }
}
