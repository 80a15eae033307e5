//! DocCraft benchmark CLI.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use doccraft::aggregate;
use doccraft::backends::PlainTextParser;
use doccraft::benchmark::{BenchmarkRunner, CancelFlag};
use doccraft::core::{BenchmarkConfig, Pipeline};
use doccraft::dataset::{load_documents, GroundTruthSet};
use doccraft::metrics;
use doccraft::output::ResultsFile;
use doccraft::plugins::get_parser_registry;
use doccraft::types::BenchmarkSummary;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "doccraft")]
#[command(about = "Benchmark document understanding backends against QA ground truth", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run registered parsers over a document set and score the results
    Benchmark {
        /// Ground truth JSON file (document id -> question list)
        #[arg(short, long)]
        ground_truth: PathBuf,

        /// Directory of documents to benchmark
        #[arg(short, long)]
        documents: PathBuf,

        /// Parser keys to run (comma-separated), or "all"
        #[arg(short, long, value_delimiter = ',', default_value = "all")]
        parser: Vec<String>,

        /// Maximum questions per document
        #[arg(long)]
        max_questions: Option<usize>,

        /// Maximum documents to benchmark
        #[arg(long)]
        max_documents: Option<usize>,

        /// Per-unit timeout in seconds
        #[arg(short, long)]
        timeout: Option<f64>,

        /// Maximum concurrent units
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Fail fast on malformed ground truth or any unit failure
        #[arg(long)]
        strict: bool,

        /// Output results file
        #[arg(short, long, default_value = "results.json")]
        output: PathBuf,
    },

    /// Re-aggregate stored results and print a comparison table
    Evaluate {
        /// Results files produced by `doccraft benchmark`
        #[arg(required = true)]
        results: Vec<PathBuf>,

        /// Metric used to rank parsers
        #[arg(short, long, default_value = "anls")]
        primary_metric: String,

        /// Print bar charts alongside the table
        #[arg(long)]
        visualize: bool,
    },

    /// List registered parser keys
    Parsers,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn register_builtin_parsers() -> anyhow::Result<()> {
    let registry = get_parser_registry();
    let mut registry = registry
        .write()
        .map_err(|e| anyhow::anyhow!("parser registry lock poisoned: {e}"))?;
    if !registry.contains("plain-text") {
        registry.register(Arc::new(PlainTextParser))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    register_builtin_parsers()?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Benchmark {
            ground_truth,
            documents,
            parser,
            max_questions,
            max_documents,
            timeout,
            concurrency,
            strict,
            output,
        } => {
            run_benchmark(
                ground_truth,
                documents,
                parser,
                max_questions,
                max_documents,
                timeout,
                concurrency,
                strict,
                output,
            )
            .await
        }

        Commands::Evaluate {
            results,
            primary_metric,
            visualize,
        } => evaluate(results, &primary_metric, visualize),

        Commands::Parsers => {
            let registry = get_parser_registry();
            let registry = registry
                .read()
                .map_err(|e| anyhow::anyhow!("parser registry lock poisoned: {e}"))?;
            for key in registry.list() {
                let parser = registry.get(&key)?;
                let description = parser.description();
                if description.is_empty() {
                    println!("{key}");
                } else {
                    println!("{key} - {description}");
                }
            }
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_benchmark(
    ground_truth: PathBuf,
    documents: PathBuf,
    parser_keys: Vec<String>,
    max_questions: Option<usize>,
    max_documents: Option<usize>,
    timeout: Option<f64>,
    concurrency: Option<usize>,
    strict: bool,
    output: PathBuf,
) -> anyhow::Result<()> {
    let mut config = BenchmarkConfig::default();
    config.benchmark.max_questions = max_questions;
    config.benchmark.max_documents = max_documents;
    config.benchmark.strict = strict;
    if let Some(timeout) = timeout {
        config.benchmark.item_timeout_secs = timeout;
    }
    if let Some(concurrency) = concurrency {
        config.benchmark.max_concurrent = concurrency;
    }

    let ground_truth = GroundTruthSet::load(&ground_truth, strict)
        .with_context(|| "failed to load ground truth")?;
    if ground_truth.is_empty() {
        bail!("ground truth contains no usable questions");
    }
    let documents = load_documents(&documents).with_context(|| "failed to load documents")?;

    let registry = get_parser_registry();
    let registry = registry
        .read()
        .map_err(|e| anyhow::anyhow!("parser registry lock poisoned: {e}"))?;
    let selected: Vec<String> = if parser_keys.iter().any(|k| k == "all") {
        registry.list()
    } else {
        parser_keys
    };

    let metric_config = config.metrics.clone();
    let mut runner = BenchmarkRunner::new(config)?;
    for key in &selected {
        let parser = registry.get(key)?;
        runner.add_pipeline(Pipeline::new(parser))?;
    }
    drop(registry);

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("interrupted, finishing in-flight work...");
                cancel.cancel();
            }
        });
    }

    let run = runner.run(documents, &ground_truth, &cancel).await?;
    let scores = metrics::score_run(&ground_truth, &run.records, &metric_config);
    let summaries = aggregate::aggregate(&run, &scores);

    println!("Benchmarked {} parser(s):", summaries.len());
    print_table(&aggregate::compare(&summaries, &metric_config.primary_metric));
    if ground_truth.malformed > 0 {
        println!(
            "Note: {} malformed ground-truth entr(ies) were skipped",
            ground_truth.malformed
        );
    }

    let file = ResultsFile::build(run.records, scores, summaries, run.skipped_documents);
    file.save(&output)?;
    println!("Results written to: {}", output.display());
    Ok(())
}

fn evaluate(paths: Vec<PathBuf>, primary_metric: &str, visualize: bool) -> anyhow::Result<()> {
    let mut merged: BTreeMap<String, BenchmarkSummary> = BTreeMap::new();

    for path in &paths {
        let file = ResultsFile::load(path)
            .with_context(|| format!("failed to load results file '{}'", path.display()))?;
        let label = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("results")
            .to_string();

        for (key, summary) in file.reaggregate() {
            // Qualify colliding keys with the file stem so two runs of the
            // same parser stay distinguishable.
            let merged_key = if merged.contains_key(&key) {
                format!("{label}:{key}")
            } else {
                key
            };
            let mut summary = summary;
            summary.parser_key = merged_key.clone();
            merged.insert(merged_key, summary);
        }
    }

    if merged.is_empty() {
        bail!("no parser results found in the given files");
    }

    let ranked = aggregate::compare(&merged, primary_metric);
    print_table(&ranked);
    if visualize {
        println!();
        print_bars(&ranked, primary_metric);
    }
    Ok(())
}

fn print_table(summaries: &[BenchmarkSummary]) {
    println!(
        "{:<24} {:>8} {:>8} {:>8} {:>8} {:>10} {:>9} {:>10}",
        "parser", "exact", "norm", "anls", "map", "success", "failed", "mean ms"
    );
    for summary in summaries {
        let metric = |name: &str| -> String {
            summary
                .metrics
                .get(name)
                .filter(|s| s.scored > 0)
                .map(|s| format!("{:.3}", s.mean))
                .unwrap_or_else(|| "-".to_string())
        };
        println!(
            "{:<24} {:>8} {:>8} {:>8} {:>8} {:>9.1}% {:>9} {:>10.1}",
            summary.parser_key,
            metric(metrics::METRIC_EXACT),
            metric(metrics::METRIC_NORMALIZED),
            metric(metrics::METRIC_ANLS),
            metric(metrics::METRIC_MAP),
            summary.success_rate * 100.0,
            summary.failed,
            summary.mean_elapsed_ms,
        );
    }
}

fn print_bars(summaries: &[BenchmarkSummary], primary_metric: &str) {
    const WIDTH: usize = 40;
    println!("{primary_metric} (mean)");
    for summary in summaries {
        let value = summary
            .metrics
            .get(primary_metric)
            .filter(|s| s.scored > 0)
            .map(|s| s.mean)
            .unwrap_or(0.0);
        let filled = (value * WIDTH as f64).round() as usize;
        println!(
            "  {:<24} {:.3} |{}{}|",
            summary.parser_key,
            value,
            "#".repeat(filled.min(WIDTH)),
            " ".repeat(WIDTH - filled.min(WIDTH)),
        );
    }
}
