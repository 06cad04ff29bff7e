//! @ai:module:intent Descriptive statistics over the benchmark ground truth
//! @ai:module:layer application
//! @ai:module:public_api BenchmarkCensus, CensusRow
//! @ai:module:stateless true

use crate::corpus::{BenchmarkEntry, BenchmarkSet, Category, ChainType};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;

/// @ai:intent Counts for one chain, or for the whole benchmark
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CensusRow {
    pub packages: u64,
    pub modules: u64,
    /// Modules with a non-zero constant count or any non-zero function annotation
    pub defective_modules: u64,
    pub functions: u64,
    pub defective_functions: u64,
    pub instances: BTreeMap<Category, u64>,
}

impl CensusRow {
    fn add_entry(&mut self, entry: &BenchmarkEntry) {
        self.packages += 1;

        for module in entry.modules.values() {
            self.modules += 1;
            if module.is_defective() {
                self.defective_modules += 1;
            }
            if module.constant_defect_count > 0 {
                *self.instances.entry(Category::UnusedConstant).or_default() +=
                    module.constant_defect_count as u64;
            }

            for function in module.functions.values() {
                self.functions += 1;
                if function.is_defective() {
                    self.defective_functions += 1;
                }
                for (category, count) in function.counts() {
                    if count > 0 {
                        *self.instances.entry(category).or_default() += count as u64;
                    }
                }
            }
        }
    }

    /// @ai:intent Annotated instances across all categories
    /// @ai:effects pure
    pub fn total_instances(&self) -> u64 {
        self.instances.values().sum()
    }
}

/// @ai:intent Census of the benchmark, per chain and overall
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BenchmarkCensus {
    pub by_chain: BTreeMap<ChainType, CensusRow>,
    pub total: CensusRow,
}

impl BenchmarkCensus {
    /// @ai:intent Count packages, modules, functions and instances
    /// @ai:effects pure
    pub fn collect(benchmark: &BenchmarkSet) -> Self {
        let mut census = Self::default();

        for entry in benchmark.iter() {
            census
                .by_chain
                .entry(entry.chain_type)
                .or_default()
                .add_entry(entry);
            census.total.add_entry(entry);
        }

        census
    }

    /// @ai:intent Render the census as a text table
    /// @ai:effects pure
    pub fn render(&self) -> String {
        let mut output = String::new();
        let rows = self
            .by_chain
            .iter()
            .map(|(chain, row)| (chain.as_str(), row))
            .chain(std::iter::once(("Total", &self.total)));

        writeln!(
            output,
            "{:<8} {:>9} {:>8} {:>10} {:>10} {:>10} {:>10}",
            "Chain", "Packages", "Modules", "Defective", "Functions", "Defective", "Instances"
        )
        .unwrap();
        for (label, row) in rows {
            writeln!(
                output,
                "{:<8} {:>9} {:>8} {:>10} {:>10} {:>10} {:>10}",
                label,
                row.packages,
                row.modules,
                row.defective_modules,
                row.functions,
                row.defective_functions,
                row.total_instances()
            )
            .unwrap();
        }

        writeln!(output).unwrap();
        writeln!(output, "Instances by category:").unwrap();
        for category in Category::ALL {
            let count = self.total.instances.get(&category).copied().unwrap_or(0);
            writeln!(output, "  {:<28} {:>8}", category, count).unwrap();
        }

        output
    }
}
