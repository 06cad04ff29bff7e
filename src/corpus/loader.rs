//! @ai:module:intent Locate and load scanner reports for benchmarked packages
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportSource, FsReportSource, InMemoryReportSource
//! @ai:module:stateless true

use crate::corpus::benchmark::ChainType;
use crate::corpus::report::ToolReport;
use crate::error::{EvalError, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use walkdir::WalkDir;

/// @ai:intent Lookup of the scanner report of a package, independent of storage
pub trait ReportSource: Send + Sync {
    /// @ai:intent Find the report of a package
    /// @ai:post Err(MissingReport) when the package was never scanned
    fn find_report(&self, chain: ChainType, package_id: &str) -> Result<ToolReport>;
}

impl<F> ReportSource for F
where
    F: Fn(ChainType, &str) -> Result<ToolReport> + Send + Sync,
{
    fn find_report(&self, chain: ChainType, package_id: &str) -> Result<ToolReport> {
        self(chain, package_id)
    }
}

/// @ai:intent Reads reports from `<root>/<Chain>/<package>/*.json`
/// @ai:effects fs:read
pub struct FsReportSource {
    root: PathBuf,
}

impl FsReportSource {
    /// @ai:intent Create a source rooted at the scanner output directory
    /// @ai:effects pure
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// @ai:intent Report files of a package, sorted for a stable merge order
    /// @ai:effects fs:read
    fn report_files(&self, chain: ChainType, package_id: &str) -> Vec<PathBuf> {
        let package_dir = self.root.join(chain.as_str()).join(package_id);

        if package_dir.is_dir() {
            let mut files: Vec<PathBuf> = WalkDir::new(&package_dir)
                .max_depth(1)
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
            return files;
        }

        let single_file = self
            .root
            .join(chain.as_str())
            .join(format!("{}.json", package_id));

        if single_file.is_file() {
            vec![single_file]
        } else {
            vec![]
        }
    }
}

impl ReportSource for FsReportSource {
    /// @ai:intent Load and merge every report file of a package
    /// @ai:effects fs:read
    fn find_report(&self, chain: ChainType, package_id: &str) -> Result<ToolReport> {
        let files = self.report_files(chain, package_id);

        if files.is_empty() {
            return Err(EvalError::MissingReport {
                chain,
                package: package_id.to_string(),
            });
        }

        let mut report = ToolReport::default();

        for path in &files {
            tracing::debug!("Loading report {}", path.display());
            let part = ToolReport::load(package_id, path)?;
            report.merge(package_id, part)?;
        }

        Ok(report)
    }
}

/// @ai:intent Report source backed by a map, for tests and embedding
#[derive(Default)]
pub struct InMemoryReportSource {
    reports: HashMap<(ChainType, String), ToolReport>,
}

impl InMemoryReportSource {
    /// @ai:intent Create an empty source
    /// @ai:effects pure
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Register the report of a package
    /// @ai:effects state:write
    pub fn insert(&mut self, chain: ChainType, package_id: &str, report: ToolReport) {
        self.reports.insert((chain, package_id.to_string()), report);
    }
}

impl ReportSource for InMemoryReportSource {
    fn find_report(&self, chain: ChainType, package_id: &str) -> Result<ToolReport> {
        self.reports
            .get(&(chain, package_id.to_string()))
            .cloned()
            .ok_or_else(|| EvalError::MissingReport {
                chain,
                package: package_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let mut file = std::fs::File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_from_package_directory() {
        let temp = TempDir::new().unwrap();
        write_file(
            &temp.path().join("Aptos/coin/a.json"),
            r#"{"modules": {"m1": {"constant_count": 1}}}"#,
        );
        write_file(
            &temp.path().join("Aptos/coin/b.json"),
            r#"{"modules": {"m2": {"constant_count": 2}}}"#,
        );
        write_file(&temp.path().join("Aptos/coin/notes.txt"), "ignored");

        let source = FsReportSource::new(temp.path());
        let report = source.find_report(ChainType::Aptos, "coin").unwrap();
        assert_eq!(report.modules.len(), 2);
    }

    #[test]
    fn test_load_from_single_file() {
        let temp = TempDir::new().unwrap();
        write_file(
            &temp.path().join("Sui/market.json"),
            r#"{"modules": {"m": {"constant_count": 0}}}"#,
        );

        let source = FsReportSource::new(temp.path());
        assert!(source.find_report(ChainType::Sui, "market").is_ok());
    }

    #[test]
    fn test_missing_report() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("Sui/empty")).unwrap();

        let source = FsReportSource::new(temp.path());
        let err = source.find_report(ChainType::Sui, "empty").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingReport);

        let err = source.find_report(ChainType::Aptos, "absent").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingReport);
    }

    #[test]
    fn test_corrupt_report_is_malformed() {
        let temp = TempDir::new().unwrap();
        write_file(&temp.path().join("Aptos/bad/r.json"), "{not json");

        let source = FsReportSource::new(temp.path());
        let err = source.find_report(ChainType::Aptos, "bad").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_closure_source() {
        let source = |chain: ChainType, package: &str| -> Result<ToolReport> {
            if chain == ChainType::Aptos && package == "p" {
                Ok(ToolReport::default())
            } else {
                Err(EvalError::MissingReport {
                    chain,
                    package: package.to_string(),
                })
            }
        };

        assert!(source.find_report(ChainType::Aptos, "p").is_ok());
        assert!(source.find_report(ChainType::Sui, "p").is_err());
    }
}
