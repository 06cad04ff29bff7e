//! @ai:module:intent Scanner analysis time per benchmarked package
//! @ai:module:layer application
//! @ai:module:public_api PackageTiming, collect_timings, timings_csv

use crate::corpus::{BenchmarkSet, ChainType, ReportSource};
use crate::report::csv_report::escape_field;
use serde::Serialize;
use std::fmt::Write as FmtWrite;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageTiming {
    pub package: String,
    pub chain: ChainType,
    pub seconds: Option<f64>,
}

/// @ai:intent Look up `total_time` in each package's report
/// @ai:post packages without a report are logged and left out
/// @ai:effects fs:read
pub fn collect_timings<S: ReportSource + ?Sized>(
    benchmark: &BenchmarkSet,
    source: &S,
) -> Vec<PackageTiming> {
    benchmark
        .iter()
        .filter_map(|entry| match source.find_report(entry.chain_type, &entry.package_id) {
            Ok(report) => Some(PackageTiming {
                package: entry.package_id.clone(),
                chain: entry.chain_type,
                seconds: report.total_time,
            }),
            Err(e) => {
                tracing::warn!("No timing for {}: {}", entry.package_id, e);
                None
            }
        })
        .collect()
}

/// @ai:intent CSV with header `package_name,time`; unknown times are empty cells
/// @ai:effects pure
pub fn timings_csv(timings: &[PackageTiming]) -> String {
    let mut output = String::new();
    writeln!(output, "package_name,time").unwrap();
    for t in timings {
        let time = t.seconds.map(|s| s.to_string()).unwrap_or_default();
        writeln!(output, "{},{}", escape_field(&t.package), time).unwrap();
    }
    output
}
