//! @ai:module:intent Fold module outcomes into per-partition confusion buckets
//! @ai:module:layer application
//! @ai:module:public_api Aggregator
//! @ai:module:stateless false

use crate::config::PartitionScope;
use crate::corpus::Category;
use crate::error::EvalError;
use crate::matcher::{Diagnostic, DiagnosticKind, ModuleOutcome, UnitRef};
use crate::metrics::types::{
    CategoryResult, ConfusionBucket, EvaluationResults, Partition, PartitionResults, RunError,
};
use std::collections::BTreeMap;

/// @ai:intent Single-writer accumulator of a whole evaluation run
pub struct Aggregator {
    categories: Vec<Category>,
    scopes: Vec<PartitionScope>,
    buckets: BTreeMap<Partition, BTreeMap<Category, ConfusionBucket>>,
    diagnostics: Vec<Diagnostic>,
    errors: Vec<RunError>,
    units_evaluated: u64,
    units_skipped: u64,
}

impl Aggregator {
    /// @ai:intent Create an aggregator for the selected categories and partition levels
    /// @ai:post the run-wide partition exists with zeroed buckets when enabled
    /// @ai:effects pure
    pub fn new(categories: Vec<Category>, scopes: Vec<PartitionScope>) -> Self {
        let mut aggregator = Self {
            categories,
            scopes,
            buckets: BTreeMap::new(),
            diagnostics: Vec::new(),
            errors: Vec::new(),
            units_evaluated: 0,
            units_skipped: 0,
        };
        if aggregator.scopes.contains(&PartitionScope::All) {
            aggregator.ensure(Partition::All);
        }
        aggregator
    }

    /// @ai:intent Partitions a unit contributes to, in scope order
    /// @ai:effects pure
    pub fn partitions_for(&self, unit: &UnitRef) -> Vec<Partition> {
        self.scopes
            .iter()
            .map(|scope| match scope {
                PartitionScope::All => Partition::All,
                PartitionScope::Chain => Partition::Chain { chain: unit.chain },
                PartitionScope::Package => Partition::Package {
                    package: unit.package.clone(),
                },
                PartitionScope::Module => Partition::Module {
                    package: unit.package.clone(),
                    module: unit.module.clone(),
                },
            })
            .collect()
    }

    fn ensure(&mut self, partition: Partition) -> &mut BTreeMap<Category, ConfusionBucket> {
        let categories = &self.categories;
        self.buckets.entry(partition).or_insert_with(|| {
            categories
                .iter()
                .map(|c| (*c, ConfusionBucket::default()))
                .collect()
        })
    }

    /// @ai:intent Add every category of a module outcome to each of its partitions
    /// @ai:post the unit counts as evaluated and its diagnostics are kept
    /// @ai:effects state:write
    pub fn fold(&mut self, outcome: ModuleOutcome) {
        let partitions = self.partitions_for(&outcome.unit);

        for partition in partitions {
            let buckets = self.ensure(partition);
            for category_outcome in &outcome.categories {
                buckets
                    .entry(category_outcome.category)
                    .or_default()
                    .accumulate(&category_outcome.classification);
            }
        }

        for category_outcome in outcome.categories {
            self.diagnostics.extend(category_outcome.diagnostics);
        }
        self.units_evaluated += 1;
    }

    /// @ai:intent Record a per-unit error; excluded units add nothing to any bucket
    /// @ai:effects state:write
    pub fn record_error(&mut self, err: &EvalError, excluded_units: u64) {
        tracing::warn!("{}", err);

        if let EvalError::InconsistentCount {
            package,
            module,
            benchmark,
            detected,
            total,
            ..
        } = err
        {
            let delta = if detected > benchmark {
                detected - benchmark
            } else {
                benchmark.saturating_sub(*total)
            };
            self.diagnostics.push(Diagnostic {
                package: package.clone(),
                module: module.clone(),
                function: None,
                category: Category::UnusedConstant,
                kind: DiagnosticKind::InconsistentCount,
                delta,
            });
        }

        self.errors.push(RunError::from(err));
        self.units_skipped += excluded_units;
    }

    /// @ai:intent Produce the sorted, timestamped results
    /// @ai:effects time:read
    pub fn finish(self) -> EvaluationResults {
        let Self {
            categories,
            buckets,
            mut diagnostics,
            mut errors,
            units_evaluated,
            units_skipped,
            ..
        } = self;

        diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        errors.sort_by(|a, b| {
            (a.kind, &a.package, &a.module, &a.message).cmp(&(b.kind, &b.package, &b.module, &b.message))
        });

        let partitions = buckets
            .into_iter()
            .map(|(partition, by_category)| PartitionResults {
                partition,
                categories: categories
                    .iter()
                    .map(|c| {
                        CategoryResult::new(*c, by_category.get(c).copied().unwrap_or_default())
                    })
                    .collect(),
            })
            .collect();

        EvaluationResults {
            timestamp: chrono::Utc::now().to_rfc3339(),
            categories,
            partitions,
            diagnostics,
            errors,
            units_evaluated,
            units_skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::ChainType;
    use crate::error::ErrorKind;
    use crate::matcher::{CategoryOutcome, Classification};
    use pretty_assertions::assert_eq;

    fn outcome(chain: ChainType, package: &str, module: &str, c: Classification) -> ModuleOutcome {
        let unit = UnitRef::new(chain, package, module);
        ModuleOutcome {
            categories: vec![CategoryOutcome {
                category: Category::Overflow,
                classification: c,
                diagnostics: vec![Diagnostic::new(
                    &unit,
                    Some("f"),
                    Category::Overflow,
                    DiagnosticKind::OverFlagged,
                    1,
                )],
            }],
            unit,
        }
    }

    fn classification(tp: u64, fp: u64, fn_: u64) -> Classification {
        Classification {
            defects: tp + fp,
            benchmark: tp + fn_,
            true_positives: tp,
            true_negatives: 0,
            false_positives: fp,
            false_negatives: fn_,
        }
    }

    fn scopes() -> Vec<PartitionScope> {
        vec![
            PartitionScope::All,
            PartitionScope::Chain,
            PartitionScope::Package,
        ]
    }

    fn bucket(results: &EvaluationResults, partition: &Partition) -> ConfusionBucket {
        results
            .partition(partition)
            .and_then(|p| p.category(Category::Overflow))
            .map(|c| c.bucket)
            .unwrap()
    }

    #[test]
    fn test_chain_partitions_sum_to_all() {
        let mut agg = Aggregator::new(vec![Category::Overflow], scopes());
        agg.fold(outcome(ChainType::Aptos, "a", "m", classification(2, 1, 0)));
        agg.fold(outcome(ChainType::Aptos, "b", "m", classification(1, 0, 2)));
        agg.fold(outcome(ChainType::Sui, "c", "m", classification(3, 2, 1)));
        let results = agg.finish();

        let all = bucket(&results, &Partition::All);
        let aptos = bucket(&results, &Partition::Chain { chain: ChainType::Aptos });
        let sui = bucket(&results, &Partition::Chain { chain: ChainType::Sui });

        assert_eq!(all.true_positives, aptos.true_positives + sui.true_positives);
        assert_eq!(all.false_positives, aptos.false_positives + sui.false_positives);
        assert_eq!(all.false_negatives, aptos.false_negatives + sui.false_negatives);
        assert_eq!(all.true_positives + all.false_negatives, all.benchmark);
        assert_eq!(results.units_evaluated, 3);
        assert_eq!(results.diagnostics.len(), 3);
    }

    #[test]
    fn test_excluded_unit_contributes_nothing() {
        let mut agg = Aggregator::new(vec![Category::Overflow], scopes());
        agg.fold(outcome(ChainType::Aptos, "a", "m", classification(1, 0, 0)));
        agg.record_error(
            &EvalError::MissingReport {
                chain: ChainType::Aptos,
                package: "b".to_string(),
            },
            3,
        );
        let results = agg.finish();

        assert_eq!(bucket(&results, &Partition::All), ConfusionBucket {
            defects: 1,
            benchmark: 1,
            true_positives: 1,
            ..Default::default()
        });
        assert!(results
            .partition(&Partition::Package { package: "b".to_string() })
            .is_none());
        assert_eq!(results.units_skipped, 3);
        assert_eq!(results.errors_of(ErrorKind::MissingReport).count(), 1);
    }

    #[test]
    fn test_inconsistent_count_adds_diagnostic() {
        let mut agg = Aggregator::new(vec![Category::UnusedConstant], scopes());
        agg.record_error(
            &EvalError::InconsistentCount {
                package: "p".to_string(),
                module: "m".to_string(),
                benchmark: 1,
                detected: 4,
                total: 5,
                message: "detected exceeds benchmark".to_string(),
            },
            1,
        );
        let results = agg.finish();

        assert_eq!(results.diagnostics.len(), 1);
        let d = &results.diagnostics[0];
        assert_eq!(d.kind, DiagnosticKind::InconsistentCount);
        assert_eq!(d.delta, 3);
        let all = results.overall().unwrap();
        assert_eq!(all.categories[0].bucket, ConfusionBucket::default());
        assert_eq!(all.categories[0].precision, None);
    }

    #[test]
    fn test_module_scope_creates_module_partition() {
        let mut agg = Aggregator::new(
            vec![Category::Overflow],
            vec![PartitionScope::Module],
        );
        agg.fold(outcome(ChainType::Sui, "p", "m", classification(1, 0, 0)));
        let results = agg.finish();

        assert_eq!(results.partitions.len(), 1);
        assert_eq!(results.partitions[0].partition.to_string(), "module:p::m");
        assert!(results.overall().is_none());
    }

    #[test]
    fn test_finish_sorts_diagnostics() {
        let mut agg = Aggregator::new(vec![Category::Overflow], scopes());
        agg.fold(outcome(ChainType::Sui, "z", "m", classification(1, 1, 0)));
        agg.fold(outcome(ChainType::Aptos, "a", "m", classification(1, 1, 0)));
        let results = agg.finish();

        let packages: Vec<_> = results.diagnostics.iter().map(|d| d.package.as_str()).collect();
        assert_eq!(packages, vec!["a", "z"]);
    }
}
