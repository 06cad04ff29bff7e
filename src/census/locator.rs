//! @ai:module:intent Find every finding of one detector across a report tree
//! @ai:module:layer application
//! @ai:module:public_api LocatedFinding, locate

use crate::census::report_files;
use crate::corpus::ToolReport;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatedFinding {
    pub file: PathBuf,
    pub module: String,
    pub location: String,
}

impl std::fmt::Display for LocatedFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: Module: {}, Function: {}",
            self.file.display(),
            self.module,
            self.location
        )
    }
}

/// @ai:intent List findings of a detector in file, module, report order
/// @ai:post unreadable reports are skipped with a warning
/// @ai:effects fs:read
pub fn locate(root: &Path, detector: &str) -> Vec<LocatedFinding> {
    let mut found = Vec::new();

    for path in report_files(root) {
        let report = match ToolReport::load(&path.display().to_string(), &path) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("Skipping unreadable report: {}", e);
                continue;
            }
        };

        for (module, result) in &report.modules {
            for finding in result.findings.get(detector).into_iter().flatten() {
                found.push(LocatedFinding {
                    file: path.clone(),
                    module: module.clone(),
                    location: finding.to_string(),
                });
            }
        }
    }

    tracing::info!("Found {} occurrences of {}", found.len(), detector);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_locate_across_files() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Aptos");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("a.json"),
            r#"{"modules": {"m": {"constant_count": 0, "detectors": {"overflow": ["f(1)", "g(2)"], "unchecked_return": ["h"]}}}}"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("b.json"),
            r#"{"modules": {"n": {"constant_count": 0, "detectors": {"overflow": [{"function": "k", "span": "7"}]}}}}"#,
        )
        .unwrap();

        let found = locate(temp.path(), "overflow");

        assert_eq!(found.len(), 3);
        assert_eq!(found[0].module, "m");
        assert_eq!(found[0].location, "f(1)");
        assert_eq!(found[2].location, "k(7)");
        assert!(found[2].to_string().ends_with("Module: n, Function: k(7)"));
    }

    #[test]
    fn test_locate_unknown_detector() {
        let temp = TempDir::new().unwrap();
        assert!(locate(temp.path(), "overflow").is_empty());
    }
}
