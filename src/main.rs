//! @ai:module:intent CLI for the scanner benchmark evaluation engine
//! @ai:module:layer presentation

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use scanner_bench::{
    census::{collect_timings, locate, timings_csv, BenchmarkCensus, ScannerStats},
    config::{EvalConfig, PartitionScope},
    corpus::{BenchmarkSet, FsReportSource},
    report::{json_report::JsonReporter, ReportGenerator, TextReporter},
    runner::EvaluationExecutor,
    EvaluationResults,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "scanner-bench")]
#[command(about = "Evaluate a Move bytecode defect scanner against an annotated benchmark")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare scanner reports against the benchmark
    Eval {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Benchmark ground-truth file
        #[arg(short, long)]
        benchmark: Option<PathBuf>,

        /// Root of the scanner report tree (<root>/<Aptos|Sui>/<package>)
        #[arg(short, long)]
        reports: Option<PathBuf>,

        /// Output directory for results
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Filter by categories (comma-separated)
        #[arg(long)]
        categories: Option<String>,

        /// Filter by chains (comma-separated)
        #[arg(long)]
        chains: Option<String>,

        /// Filter by package ids (comma-separated)
        #[arg(long)]
        packages: Option<String>,

        /// Partition levels to report (comma-separated: all,chain,package,module)
        #[arg(long)]
        partitions: Option<String>,

        /// Packages evaluated concurrently
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Omit precision and recall from the printed table
        #[arg(long)]
        no_metrics: bool,

        /// Exit non-zero when any unit could not be evaluated
        #[arg(long)]
        strict: bool,
    },

    /// Generate reports from an existing results.json
    Report {
        /// Path to results JSON file
        #[arg(short, long)]
        results: PathBuf,

        /// Output directory for reports
        #[arg(short, long, default_value = "reports")]
        output: PathBuf,
    },

    /// Describe the benchmark ground truth
    Census {
        #[arg(short, long)]
        benchmark: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Aggregate statistics over a scanner report tree
    ScanStats {
        #[arg(short, long)]
        reports: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Export scanner time per benchmarked package as CSV
    Timing {
        #[arg(short, long)]
        benchmark: Option<PathBuf>,

        #[arg(short, long)]
        reports: Option<PathBuf>,

        /// CSV destination; printed to stdout when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List every finding of one detector
    Locate {
        /// Detector name as it appears in reports
        detector: String,

        #[arg(short, long)]
        reports: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "scanner-bench.toml")]
        output: PathBuf,
    },
}

/// Overrides for `eval`
struct EvalArgs {
    config: Option<PathBuf>,
    benchmark: Option<PathBuf>,
    reports: Option<PathBuf>,
    output: Option<PathBuf>,
    categories: Option<String>,
    chains: Option<String>,
    packages: Option<String>,
    partitions: Option<String>,
    jobs: Option<usize>,
    no_metrics: bool,
    strict: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scanner_bench=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Eval {
            config,
            benchmark,
            reports,
            output,
            categories,
            chains,
            packages,
            partitions,
            jobs,
            no_metrics,
            strict,
        } => {
            run_evaluation(EvalArgs {
                config,
                benchmark,
                reports,
                output,
                categories,
                chains,
                packages,
                partitions,
                jobs,
                no_metrics,
                strict,
            })
            .await
        }
        Commands::Report { results, output } => generate_reports(results, output),
        Commands::Census { benchmark, json } => census(benchmark, json),
        Commands::ScanStats { reports, json } => scan_stats(reports, json),
        Commands::Timing {
            benchmark,
            reports,
            output,
        } => timing(benchmark, reports, output),
        Commands::Locate { detector, reports } => locate_detector(detector, reports),
        Commands::Init { output } => init_config(output),
    }
}

/// @ai:intent Evaluate, write every export, print the table, apply the error policy
/// @ai:effects fs:read, fs:write, io
async fn run_evaluation(args: EvalArgs) -> Result<()> {
    let mut config = load_or_default_config(args.config)?;

    if let Some(path) = args.benchmark {
        config.paths.benchmark_file = path;
    }
    if let Some(path) = args.reports {
        config.paths.reports_dir = path;
    }
    if let Some(path) = args.output {
        config.paths.results_dir = path;
    }
    if let Some(jobs) = args.jobs {
        config.run.jobs = jobs;
    }
    if let Some(scopes) = args.partitions {
        config.run.partitions = parse_partitions(&scopes)?;
    }
    if args.categories.is_some() {
        config.run.filter.categories = split_list(args.categories);
    }
    if args.chains.is_some() {
        config.run.filter.chains = split_list(args.chains);
    }
    if args.packages.is_some() {
        config.run.filter.packages = split_list(args.packages);
    }
    config.run.metrics &= !args.no_metrics;
    config.run.fail_on_errors |= args.strict;

    tracing::info!("Loading benchmark from {}", config.paths.benchmark_file.display());
    let benchmark = BenchmarkSet::load(&config.paths.benchmark_file)
        .context("Benchmark could not be loaded")?;

    if benchmark.is_empty() {
        tracing::warn!("Benchmark contains no packages");
    }

    let source = Arc::new(FsReportSource::new(config.paths.reports_dir.clone()));
    let executor = EvaluationExecutor::new(source, config.run.clone());
    let results = executor.execute(&benchmark).await?;

    let timestamp = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S");
    let output_dir = config.paths.results_dir.join(timestamp.to_string());
    ReportGenerator::new().generate_all(&results, &output_dir)?;

    print_results(&results, config.run.metrics)?;

    if config.run.fail_on_errors && results.has_errors() {
        bail!(
            "{} units could not be evaluated ({} errors)",
            results.units_skipped,
            results.errors.len()
        );
    }

    Ok(())
}

/// @ai:intent Write the text report to stdout
/// @ai:effects io
fn print_results(results: &EvaluationResults, show_metrics: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    TextReporter::new(show_metrics).render(results, &mut handle)?;
    Ok(())
}

/// @ai:intent Regenerate reports from a saved results file
/// @ai:effects fs:read, fs:write
fn generate_reports(results_path: PathBuf, output_dir: PathBuf) -> Result<()> {
    let results = JsonReporter::load(&results_path)?;

    let reporter = ReportGenerator::new();
    reporter.generate_all(&results, &output_dir)?;

    println!("Reports generated in {}", output_dir.display());
    Ok(())
}

/// @ai:intent Print the benchmark census
/// @ai:effects fs:read, io
fn census(benchmark: Option<PathBuf>, json: bool) -> Result<()> {
    let path = match benchmark {
        Some(path) => path,
        None => load_or_default_config(None)?.paths.benchmark_file,
    };
    let benchmark = BenchmarkSet::load(&path)?;
    let census = BenchmarkCensus::collect(&benchmark);

    if json {
        println!("{}", serde_json::to_string_pretty(&census)?);
    } else {
        print!("{}", census.render());
    }
    Ok(())
}

/// @ai:intent Print report tree statistics
/// @ai:effects fs:read, io
fn scan_stats(reports: Option<PathBuf>, json: bool) -> Result<()> {
    let root = match reports {
        Some(root) => root,
        None => load_or_default_config(None)?.paths.reports_dir,
    };
    let stats = ScannerStats::collect(&root);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", stats.render());
    }
    Ok(())
}

/// @ai:intent Export per-package scanner time
/// @ai:effects fs:read, fs:write, io
fn timing(
    benchmark: Option<PathBuf>,
    reports: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = load_or_default_config(None)?;
    let benchmark = BenchmarkSet::load(&benchmark.unwrap_or(config.paths.benchmark_file))?;
    let source = FsReportSource::new(reports.unwrap_or(config.paths.reports_dir));

    let csv = timings_csv(&collect_timings(&benchmark, &source));
    match output {
        Some(path) => {
            std::fs::write(&path, csv)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Timings saved to {}", path.display());
        }
        None => print!("{}", csv),
    }
    Ok(())
}

/// @ai:intent Print every finding of a detector
/// @ai:effects fs:read, io
fn locate_detector(detector: String, reports: Option<PathBuf>) -> Result<()> {
    let root = match reports {
        Some(root) => root,
        None => load_or_default_config(None)?.paths.reports_dir,
    };
    let found = locate(&root, &detector);

    for finding in &found {
        println!("{}", finding);
    }
    println!();
    println!("Total occurrences of {}: {}", detector, found.len());
    Ok(())
}

/// @ai:intent Initialize default configuration file
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> Result<()> {
    let config = EvalConfig::default();
    config.save(&output)?;
    println!("Configuration saved to {}", output.display());
    Ok(())
}

/// @ai:intent Load configuration or use defaults
/// @ai:effects fs:read
fn load_or_default_config(path: Option<PathBuf>) -> Result<EvalConfig> {
    match path {
        Some(p) => EvalConfig::load(&p),
        None => {
            let default_path = PathBuf::from("scanner-bench.toml");

            if default_path.exists() {
                EvalConfig::load(&default_path)
            } else {
                Ok(EvalConfig::default())
            }
        }
    }
}

/// @ai:effects pure
fn split_list(value: Option<String>) -> Option<Vec<String>> {
    value.map(|s| {
        s.split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    })
}

/// @ai:intent Parse a comma-separated list of partition levels
/// @ai:effects pure
fn parse_partitions(value: &str) -> Result<Vec<PartitionScope>> {
    let mut scopes = Vec::new();
    for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let scope = match item.to_ascii_lowercase().as_str() {
            "all" => PartitionScope::All,
            "chain" => PartitionScope::Chain,
            "package" => PartitionScope::Package,
            "module" => PartitionScope::Module,
            other => bail!("unknown partition level: {}", other),
        };
        if !scopes.contains(&scope) {
            scopes.push(scope);
        }
    }
    Ok(scopes)
}
