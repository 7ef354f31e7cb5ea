//! `kappa` - inter-rater agreement over local submission files.
//!
//! ## Commands
//!
//! - `score`: score every task directory and write the result files
//! - `inspect`: print the agreement tables of one task

mod source;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kappa_core::{
    init_tracing, render_summary_md, write_batch_json, write_scores_csv, write_scores_csv_file,
    AgreementConfig, BatchArtifact, BatchRunner, DoiPolicy, Engine, KappaMethod, SubmissionSource,
    TaskInput, METRICS,
};
use tracing::{info, Level};

use crate::source::DirectorySource;

#[derive(Parser)]
#[command(name = "kappa")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inter-rater agreement (Fleiss' kappa) for artifact-reuse annotations", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// TOML config file
    #[arg(long, global = true, env = "KAPPA_CONFIG")]
    config: Option<PathBuf>,

    /// Override the maximum number of papers per submission
    #[arg(long, global = true)]
    max_papers: Option<usize>,

    /// Override the DOI normalization policy
    #[arg(long, global = true, value_enum)]
    doi_policy: Option<DoiPolicyArg>,

    /// Override how chance agreement is estimated
    #[arg(long, global = true, value_enum)]
    kappa_method: Option<KappaMethodArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every task under a directory (one subdirectory per task)
    Score {
        /// Root directory of task subdirectories
        dir: PathBuf,

        /// Only score these tasks (default: every subdirectory)
        #[arg(short, long)]
        task: Vec<String>,

        /// CSV output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON artifact with statistics and histogram
        #[arg(long)]
        json_output: Option<PathBuf>,

        /// Markdown summary file
        #[arg(long)]
        summary_md: Option<PathBuf>,

        /// Tasks processed concurrently
        #[arg(long, default_value = "8")]
        concurrency: usize,
    },

    /// Print the finalized agreement tables of one task
    Inspect {
        /// Root directory of task subdirectories
        dir: PathBuf,

        /// Task to inspect
        #[arg(short, long)]
        task: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DoiPolicyArg {
    Extract,
    Wrap,
}

impl From<DoiPolicyArg> for DoiPolicy {
    fn from(arg: DoiPolicyArg) -> Self {
        match arg {
            DoiPolicyArg::Extract => DoiPolicy::Extract,
            DoiPolicyArg::Wrap => DoiPolicy::Wrap,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KappaMethodArg {
    Fleiss,
    Uniform,
}

impl From<KappaMethodArg> for KappaMethod {
    fn from(arg: KappaMethodArg) -> Self {
        match arg {
            KappaMethodArg::Fleiss => KappaMethod::Fleiss,
            KappaMethodArg::Uniform => KappaMethod::Uniform,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let config = load_config(&cli)?;
    let engine = Arc::new(Engine::new(config).context("invalid agreement configuration")?);

    match cli.command {
        Commands::Score {
            dir,
            task,
            output,
            json_output,
            summary_md,
            concurrency,
        } => {
            score(
                engine,
                dir,
                task,
                output,
                json_output,
                summary_md,
                concurrency,
            )
            .await
        }
        Commands::Inspect { dir, task } => inspect(&engine, dir, &task).await,
    }
}

fn load_config(cli: &Cli) -> Result<AgreementConfig> {
    let mut config = match &cli.config {
        Some(path) => AgreementConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => AgreementConfig::default(),
    };
    if let Some(max) = cli.max_papers {
        config = config.with_max_papers(max);
    }
    if let Some(policy) = cli.doi_policy {
        config = config.with_doi_policy(policy.into());
    }
    if let Some(method) = cli.kappa_method {
        config = config.with_kappa_method(method.into());
    }
    Ok(config)
}

async fn score(
    engine: Arc<Engine>,
    dir: PathBuf,
    tasks: Vec<String>,
    output: Option<PathBuf>,
    json_output: Option<PathBuf>,
    summary_md: Option<PathBuf>,
    concurrency: usize,
) -> Result<()> {
    let source = DirectorySource::new(&dir);
    let task_ids = if tasks.is_empty() {
        source
            .task_ids()
            .with_context(|| format!("list tasks in {}", dir.display()))?
    } else {
        tasks
    };
    if task_ids.is_empty() {
        bail!("no task directories found in {}", dir.display());
    }
    info!(tasks = task_ids.len(), dir = %dir.display(), "scoring tasks");

    let config = engine.config().clone();
    let summary = BatchRunner::new(engine, Arc::new(source))
        .with_max_concurrency(concurrency)
        .run(&task_ids)
        .await
        .context("score batch")?;
    METRICS.flush();

    match &output {
        Some(path) => write_scores_csv_file(path, summary.rows())
            .with_context(|| format!("write {}", path.display()))?,
        None => write_scores_csv(std::io::stdout().lock(), summary.rows())
            .context("write scores to stdout")?,
    }

    if json_output.is_some() || summary_md.is_some() {
        let artifact = BatchArtifact::new(&config, &summary, chrono::Utc::now());
        if let Some(path) = &json_output {
            write_batch_json(path, &artifact)
                .with_context(|| format!("write {}", path.display()))?;
        }
        if let Some(path) = &summary_md {
            std::fs::write(path, render_summary_md(&artifact))
                .with_context(|| format!("write {}", path.display()))?;
        }
    }

    if let Some(stats) = summary.stats() {
        info!(
            papers = stats.count,
            tasks = stats.tasks,
            mean = stats.mean,
            "batch scored"
        );
    }
    Ok(())
}

async fn inspect(engine: &Engine, dir: PathBuf, task: &str) -> Result<()> {
    let submissions = DirectorySource::new(&dir)
        .fetch_submissions(task)
        .await
        .with_context(|| format!("read task {task}"))?;
    let outcome = engine.process_task(&TaskInput::new(task, submissions));

    println!(
        "task {}: {} submission(s), {} available",
        outcome.task_id, outcome.submissions, outcome.available_submissions
    );
    for table in outcome.tables.values() {
        println!();
        print!("{}", table.render());
        match outcome.scores.iter().find(|s| &s.paper == table.paper()) {
            Some(score) => println!("kappa: {:.2}", score.kappa),
            None => println!("kappa: -"),
        }
    }
    if !outcome.exclusions.is_empty() {
        println!("\nexcluded:");
        for exclusion in &outcome.exclusions {
            println!("- {exclusion}");
        }
    }
    Ok(())
}
