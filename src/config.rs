//! @ai:module:intent Configuration structs for the evaluation engine
//! @ai:module:layer infrastructure
//! @ai:module:public_api EvalConfig, PathConfig, RunConfig, FilterConfig, PartitionScope
//! @ai:module:stateless true

use crate::corpus::{Category, ChainType};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// @ai:intent Main configuration for an evaluation run
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvalConfig {
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub run: RunConfig,
}

/// @ai:intent Input and output locations
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub benchmark_file: PathBuf,
    pub reports_dir: PathBuf,
    pub results_dir: PathBuf,
}

/// @ai:intent Run behaviour for evaluation
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Packages classified concurrently
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Include precision and recall in rendered tables
    #[serde(default = "default_true")]
    pub metrics: bool,
    /// Treat any per-unit error as a failed evaluation
    #[serde(default)]
    pub fail_on_errors: bool,
    #[serde(default = "default_partitions")]
    pub partitions: Vec<PartitionScope>,
    #[serde(default)]
    pub filter: FilterConfig,
}

/// @ai:intent Partition levels buckets are kept for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionScope {
    All,
    Chain,
    Package,
    Module,
}

/// @ai:intent Filter configuration for selecting packages and categories
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    pub chains: Option<Vec<String>>,
    pub packages: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            benchmark_file: PathBuf::from("result/benchmark.json"),
            reports_dir: PathBuf::from("result/json"),
            results_dir: PathBuf::from("results"),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            metrics: true,
            fail_on_errors: false,
            partitions: default_partitions(),
            filter: FilterConfig::default(),
        }
    }
}

fn default_jobs() -> usize {
    8
}

fn default_true() -> bool {
    true
}

fn default_partitions() -> Vec<PartitionScope> {
    vec![
        PartitionScope::All,
        PartitionScope::Chain,
        PartitionScope::Package,
    ]
}

impl EvalConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl FilterConfig {
    /// @ai:intent Check if filter matches a package
    /// @ai:effects pure
    pub fn matches(&self, chain: ChainType, package_id: &str) -> bool {
        let chain_match = self
            .chains
            .as_ref()
            .map(|c| {
                c.iter()
                    .any(|name| name.parse::<ChainType>().map(|p| p == chain).unwrap_or(false))
            })
            .unwrap_or(true);

        chain_match && self.matches_package(package_id)
    }

    /// @ai:intent Check the package filter alone, for records whose chain is unknown
    /// @ai:effects pure
    pub fn matches_package(&self, package_id: &str) -> bool {
        self.packages
            .as_ref()
            .map(|p| p.iter().any(|id| id == package_id))
            .unwrap_or(true)
    }

    /// @ai:intent Categories selected for evaluation, all when unset
    /// @ai:effects pure
    pub fn selected_categories(&self) -> Vec<Category> {
        match &self.categories {
            None => Category::ALL.to_vec(),
            Some(names) => {
                let mut selected: Vec<Category> = names
                    .iter()
                    .filter_map(|name| match name.parse::<Category>() {
                        Ok(c) => Some(c),
                        Err(e) => {
                            tracing::warn!("Ignoring category filter: {}", e);
                            None
                        }
                    })
                    .collect();
                selected.sort();
                selected.dedup();
                selected
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_filter_matches_all_when_empty() {
        let filter = FilterConfig::default();
        assert!(filter.matches(ChainType::Aptos, "any"));
        assert_eq!(filter.selected_categories().len(), 8);
    }

    #[test]
    fn test_filter_matches_specific_chain() {
        let filter = FilterConfig {
            chains: Some(vec!["sui".to_string()]),
            ..Default::default()
        };
        assert!(filter.matches(ChainType::Sui, "p"));
        assert!(!filter.matches(ChainType::Aptos, "p"));
    }

    #[test]
    fn test_filter_matches_multiple_criteria() {
        let filter = FilterConfig {
            chains: Some(vec!["aptos".to_string()]),
            packages: Some(vec!["a".to_string(), "b".to_string()]),
            ..Default::default()
        };
        assert!(filter.matches(ChainType::Aptos, "b"));
        assert!(!filter.matches(ChainType::Aptos, "c"));
        assert!(!filter.matches(ChainType::Sui, "a"));
    }

    #[test]
    fn test_selected_categories_skips_unknown() {
        let filter = FilterConfig {
            categories: Some(vec![
                "overflow".to_string(),
                "bogus".to_string(),
                "constant".to_string(),
            ]),
            ..Default::default()
        };
        assert_eq!(
            filter.selected_categories(),
            vec![Category::Overflow, Category::UnusedConstant]
        );
    }

    #[test]
    fn test_config_round_trip_through_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("scanner-bench.toml");

        let mut config = EvalConfig::default();
        config.run.jobs = 2;
        config.run.partitions.push(PartitionScope::Module);
        config.save(&path).unwrap();

        let loaded = EvalConfig::load(&path).unwrap();
        assert_eq!(loaded.run.jobs, 2);
        assert!(loaded.run.partitions.contains(&PartitionScope::Module));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EvalConfig = toml::from_str("[run]\nfail_on_errors = true\n").unwrap();
        assert!(config.run.fail_on_errors);
        assert!(config.run.metrics);
        assert_eq!(config.run.jobs, 8);
        assert!(config.run.partitions.contains(&PartitionScope::Chain));
    }
}
