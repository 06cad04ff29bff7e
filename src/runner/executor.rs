//! @ai:module:intent Drive the matcher over every benchmarked package
//! @ai:module:layer application
//! @ai:module:public_api EvaluationExecutor, PackageOutcome, evaluate_package, evaluate
//! @ai:module:stateless false

use crate::config::RunConfig;
use crate::corpus::{BenchmarkEntry, BenchmarkSet, Category, ReportSource};
use crate::error::EvalError;
use crate::matcher::{Matcher, MatcherTrait, ModuleOutcome, UnitRef};
use crate::metrics::{Aggregator, EvaluationResults};
use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// @ai:intent Everything learned about one package
#[derive(Debug, Default)]
pub struct PackageOutcome {
    pub package_id: String,
    pub modules: Vec<ModuleOutcome>,
    /// Errors paired with the number of benchmarked units they exclude
    pub errors: Vec<(EvalError, u64)>,
}

impl PackageOutcome {
    fn failed(package_id: &str, err: EvalError, excluded: u64) -> Self {
        Self {
            package_id: package_id.to_string(),
            modules: Vec::new(),
            errors: vec![(err, excluded)],
        }
    }

    /// @ai:intent Hand the outcome to the single-writer aggregator
    /// @ai:pre no error is fatal
    /// @ai:effects state:write
    pub fn fold_into(self, aggregator: &mut Aggregator) -> Result<()> {
        for module in self.modules {
            aggregator.fold(module);
        }
        for (err, excluded) in self.errors {
            if err.is_fatal() {
                bail!("evaluation aborted: {}", err);
            }
            aggregator.record_error(&err, excluded);
        }
        Ok(())
    }
}

/// @ai:intent Report each benchmark record dropped at load as one skipped unit
/// @ai:effects state:write
fn record_rejected(benchmark: &BenchmarkSet, aggregator: &mut Aggregator) {
    for rejected in benchmark.rejected() {
        aggregator.record_error(&rejected.to_error(), 1);
    }
}

/// @ai:intent Classify every module of one package against its scanner report
/// @ai:post a missing report excludes all modules; drift in module sets is recorded per module
/// @ai:effects fs:read
pub fn evaluate_package<M, S>(
    matcher: &M,
    source: &S,
    entry: &BenchmarkEntry,
    categories: &[Category],
) -> PackageOutcome
where
    M: MatcherTrait + ?Sized,
    S: ReportSource + ?Sized,
{
    let package = entry.package_id.as_str();

    let report = match source.find_report(entry.chain_type, package) {
        Ok(report) => report,
        Err(err) => return PackageOutcome::failed(package, err, entry.modules.len() as u64),
    };

    let mut outcome = PackageOutcome {
        package_id: package.to_string(),
        ..Default::default()
    };

    for name in report.modules.keys() {
        if !entry.modules.contains_key(name) {
            outcome.errors.push((
                EvalError::malformed(
                    package,
                    format!("module {} is in the scanner report but not in the benchmark", name),
                ),
                0,
            ));
        }
    }

    for (name, annotation) in &entry.modules {
        let Some(result) = report.modules.get(name) else {
            outcome.errors.push((
                EvalError::malformed(
                    package,
                    format!("benchmarked module {} is missing from the scanner report", name),
                ),
                1,
            ));
            continue;
        };

        let unit = UnitRef::new(entry.chain_type, package, name);
        match matcher.classify_module(&unit, annotation, result, categories) {
            Ok(module) => outcome.modules.push(module),
            Err(err) => outcome.errors.push((err, 1)),
        }
    }

    tracing::debug!(
        "Evaluated {}: {} modules, {} errors",
        package,
        outcome.modules.len(),
        outcome.errors.len()
    );
    outcome
}

/// @ai:intent Evaluate a benchmark sequentially on the calling thread
/// @ai:effects fs:read
pub fn evaluate<S: ReportSource + ?Sized>(
    benchmark: &BenchmarkSet,
    source: &S,
    run_config: &RunConfig,
) -> Result<EvaluationResults> {
    let matcher = Matcher::new();
    let benchmark = benchmark.filtered(&run_config.filter);
    let categories = run_config.filter.selected_categories();
    let mut aggregator = Aggregator::new(categories.clone(), run_config.partitions.clone());
    record_rejected(&benchmark, &mut aggregator);

    for entry in benchmark.iter() {
        evaluate_package(&matcher, source, entry, &categories).fold_into(&mut aggregator)?;
    }

    Ok(aggregator.finish())
}

/// @ai:intent Evaluates packages concurrently, folding results in one place
pub struct EvaluationExecutor<S: ReportSource + 'static> {
    source: Arc<S>,
    matcher: Arc<Matcher>,
    run_config: RunConfig,
}

impl<S: ReportSource + 'static> EvaluationExecutor<S> {
    /// @ai:intent Create a new evaluation executor
    /// @ai:effects pure
    pub fn new(source: Arc<S>, run_config: RunConfig) -> Self {
        Self {
            source,
            matcher: Arc::new(Matcher::new()),
            run_config,
        }
    }

    /// @ai:intent Evaluate all packages with at most `jobs` in flight
    /// @ai:post results equal those of the sequential `evaluate`
    /// @ai:effects fs:read
    pub async fn execute(&self, benchmark: &BenchmarkSet) -> Result<EvaluationResults> {
        let benchmark = benchmark.filtered(&self.run_config.filter);
        let categories = Arc::new(self.run_config.filter.selected_categories());
        let semaphore = Arc::new(Semaphore::new(self.run_config.jobs.max(1)));

        tracing::info!(
            "Evaluating {} packages across {} categories",
            benchmark.len(),
            categories.len()
        );

        let mut aggregator =
            Aggregator::new(categories.to_vec(), self.run_config.partitions.clone());
        record_rejected(&benchmark, &mut aggregator);

        let mut tasks = JoinSet::new();
        for entry in benchmark.iter().cloned() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .context("Evaluation semaphore closed")?;
            let source = Arc::clone(&self.source);
            let matcher = Arc::clone(&self.matcher);
            let categories = Arc::clone(&categories);

            tasks.spawn_blocking(move || {
                let _permit = permit;
                evaluate_package(matcher.as_ref(), source.as_ref(), &entry, &categories)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.context("Package evaluation task failed")?;
            outcome.fold_into(&mut aggregator)?;
        }

        let results = aggregator.finish();
        tracing::info!(
            "Evaluated {} units, skipped {}, {} errors",
            results.units_evaluated,
            results.units_skipped,
            results.errors.len()
        );
        Ok(results)
    }
}
