//! docsift CLI - rank PDF sections against a persona and task

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use docsift::{
    discover_collections, CollectionRunner, Embedder, Error, ErrorMode, HashingEmbedder,
    JsonFormat, PipelineOptions, RankOptions,
};

/// Exit status for argument errors.
const EXIT_USAGE: i32 = 1;
/// Exit status when at least one collection failed.
const EXIT_FAILED: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "docsift")]
#[command(author = "iyulab")]
#[command(version)]
#[command(
    about = "Extract PDF outlines and rank sections for a persona and task",
    long_about = None
)]
struct Cli {
    /// Root folder containing one subfolder per collection
    #[arg(value_name = "ROOT")]
    root: PathBuf,

    /// Number of ranked sections per collection
    #[arg(long, env = "DOCSIFT_TOP_N", default_value_t = 5)]
    top_n: usize,

    /// Per-document structure extraction timeout in seconds
    #[arg(long, env = "DOCSIFT_TIMEOUT", default_value_t = 60)]
    timeout: u64,

    /// Process documents one at a time
    #[arg(long)]
    sequential: bool,

    /// Worker threads for parallel structure extraction (0 = one per CPU)
    #[arg(long, env = "DOCSIFT_THREADS", default_value_t = 0)]
    threads: usize,

    /// Only write outline artifacts, skip ranking
    #[arg(long)]
    structure_only: bool,

    /// Fail a document on its first unreadable page
    #[arg(long)]
    strict: bool,

    /// Write compact JSON
    #[arg(long)]
    compact: bool,

    /// Directory with model.onnx and tokenizer.json (requires the onnx feature)
    #[arg(long, env = "DOCSIFT_MODEL_DIR", value_name = "DIR")]
    model_dir: Option<PathBuf>,
}

impl Cli {
    fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions::new()
            .with_rank(RankOptions::new().with_top_n(self.top_n))
            .with_parallel(!self.sequential)
            .with_threads(self.threads)
            .with_document_timeout(Duration::from_secs(self.timeout))
            .with_error_mode(if self.strict {
                ErrorMode::Strict
            } else {
                ErrorMode::Lenient
            })
            .structure_only(self.structure_only)
            .with_json_format(if self.compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            })
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not errors
            let code = if e.use_stderr() { EXIT_USAGE } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    if !cli.root.is_dir() {
        println!(
            "{}: {} is not a directory",
            "Error".red().bold(),
            cli.root.display()
        );
        return EXIT_USAGE;
    }

    let options = cli.pipeline_options();
    let collections = match discover_collections(&cli.root, &options) {
        Ok(collections) => collections,
        Err(e) => {
            println!("{}: {}", "Error".red().bold(), e);
            return EXIT_FAILED;
        }
    };

    let runner = CollectionRunner::new(options, build_embedder(cli));

    let pb = ProgressBar::with_draw_target(
        Some(collections.len() as u64),
        ProgressDrawTarget::stdout(),
    );
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut processed = 0;
    let mut skipped = 0;
    let mut failed = 0;

    for found in collections {
        let collection = match found {
            Ok(collection) => collection,
            Err(Error::InvalidCollection { name, reason }) => {
                pb.println(format!("{} {}: {}", "Skipping".yellow(), name, reason));
                skipped += 1;
                pb.inc(1);
                continue;
            }
            Err(e) => {
                pb.println(format!("{}: {}", "Error".red().bold(), e));
                failed += 1;
                pb.inc(1);
                continue;
            }
        };

        pb.set_message(collection.name.clone());
        match runner.run_contained(&collection) {
            Ok(report) => {
                processed += 1;
                let detail = match &report.output_path {
                    Some(path) => format!("{} sections -> {}", report.sections, path.display()),
                    None => "outlines only".to_string(),
                };
                pb.println(format!(
                    "{} {} ({} documents, {} failed) {}",
                    "✓".green(),
                    report.name.bold(),
                    report.documents,
                    report.failed_documents,
                    detail.dimmed()
                ));
            }
            Err(e) => {
                failed += 1;
                pb.println(format!(
                    "{} {}: {}",
                    "Error".red().bold(),
                    collection.name,
                    e
                ));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    println!(
        "\n{} {} processed, {} skipped, {} failed",
        "Collections:".green().bold(),
        processed,
        skipped,
        failed
    );

    if failed > 0 {
        EXIT_FAILED
    } else {
        0
    }
}

#[cfg(feature = "onnx")]
fn build_embedder(cli: &Cli) -> Box<dyn Embedder> {
    if let Some(dir) = &cli.model_dir {
        match docsift::OnnxEmbedder::load(dir) {
            Ok(embedder) => return Box::new(embedder),
            Err(e) => log::warn!("{}; falling back to hashing embedder", e),
        }
    }
    Box::new(HashingEmbedder::default())
}

#[cfg(not(feature = "onnx"))]
fn build_embedder(cli: &Cli) -> Box<dyn Embedder> {
    if cli.model_dir.is_some() {
        log::warn!("Built without the onnx feature; --model-dir is ignored");
    }
    Box::new(HashingEmbedder::default())
}
