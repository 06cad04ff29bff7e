//! @ai:module:intent Aggregate statistics over a tree of scanner reports
//! @ai:module:layer application
//! @ai:module:public_api ScannerStats
//! @ai:module:stateless true

use crate::census::report_files;
use crate::corpus::{FunctionCount, ToolReport};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;
use std::path::Path;

/// @ai:intent Totals over every report file under a root
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScannerStats {
    pub report_files: u64,
    /// `modules_status.pass + wrong`, falling back to the module map size
    pub modules: u64,
    pub modules_failed: u64,
    pub constants: u64,
    pub functions: FunctionCount,
    pub total_time: f64,
    /// Raw findings per detector name, benchmarked or not
    pub detector_yield: BTreeMap<String, u64>,
    pub unreadable: Vec<String>,
}

impl ScannerStats {
    /// @ai:intent Fold one report into the totals
    /// @ai:effects state:write
    pub fn add_report(&mut self, report: &ToolReport) {
        self.report_files += 1;

        match report.modules_status {
            Some(status) => {
                self.modules += status.pass + status.wrong;
                self.modules_failed += status.wrong;
            }
            None => self.modules += report.modules.len() as u64,
        }
        self.total_time += report.total_time.unwrap_or(0.0);

        for module in report.modules.values() {
            self.constants += module.constant_total_count;
            if let Some(count) = module.function_count {
                self.functions.all += count.all;
                self.functions.native += count.native;
            }
            for (detector, findings) in &module.findings {
                *self.detector_yield.entry(detector.clone()).or_default() += findings.len() as u64;
            }
        }
    }

    /// @ai:intent Walk a report tree and total every readable report
    /// @ai:post unreadable files are listed, not fatal
    /// @ai:effects fs:read
    pub fn collect(root: &Path) -> Self {
        let mut stats = Self::default();

        for path in report_files(root) {
            let name = path.display().to_string();
            match ToolReport::load(&name, &path) {
                Ok(report) => stats.add_report(&report),
                Err(e) => {
                    tracing::warn!("Skipping unreadable report: {}", e);
                    stats.unreadable.push(name);
                }
            }
        }

        tracing::info!(
            "Collected {} reports from {}",
            stats.report_files,
            root.display()
        );
        stats
    }

    /// @ai:intent Render the statistics as text
    /// @ai:effects pure
    pub fn render(&self) -> String {
        let mut output = String::new();

        writeln!(output, "Report files:     {}", self.report_files).unwrap();
        writeln!(output, "Modules:          {} ({} failed)", self.modules, self.modules_failed).unwrap();
        writeln!(output, "Constants:        {}", self.constants).unwrap();
        writeln!(
            output,
            "Functions:        {} ({} native)",
            self.functions.all, self.functions.native
        )
        .unwrap();
        writeln!(output, "Total time (s):   {:.3}", self.total_time).unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Findings by detector:").unwrap();
        for (detector, count) in &self.detector_yield {
            writeln!(output, "  {:<28} {:>8}", detector, count).unwrap();
        }
        if !self.unreadable.is_empty() {
            writeln!(output).unwrap();
            writeln!(output, "Unreadable reports:").unwrap();
            for name in &self.unreadable {
                writeln!(output, "  {}", name).unwrap();
            }
        }

        output
    }
}
