//! @ai:module:intent Descriptive statistics over benchmark and report trees
//! @ai:module:layer application
//! @ai:module:public_api BenchmarkCensus, ScannerStats, collect_timings, locate

pub mod benchmark_census;
pub mod locator;
pub mod scanner_stats;
pub mod timing;

pub use benchmark_census::{BenchmarkCensus, CensusRow};
pub use locator::{locate, LocatedFinding};
pub use scanner_stats::ScannerStats;
pub use timing::{collect_timings, timings_csv, PackageTiming};

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// @ai:intent Every `*.json` file under a root, sorted
/// @ai:effects fs:read
pub fn report_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext == "json")
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();
    files
}
