//! Specialized LLM agents for security review, performance review and
//! project questions.
//!
//! Context documents live under `.agents/context/`; each run writes its
//! family's files under `output/<family>/`.

use std::path::{Path, PathBuf};

use agents::core::family::TaskFamily;
use agents::core::types::AgentTask;
use agents::error::PipelineError;
use agents::exit_codes;
use agents::io::backend::{BackendMode, build_generator};
use agents::io::init::{AgentsPaths, InitOptions, init_agents};
use agents::logging;
use agents::pipeline::run_task;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "agents",
    version,
    about = "Classify a task, query a generation backend, write structured artifacts"
)]
struct Cli {
    /// Project root holding `.agents/` and the output directory.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create `.agents/config.toml` and placeholder context documents.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
    /// Print the classification and per-variant keyword scores for a spec.
    Classify {
        /// Agent family: security, performance or question.
        family: TaskFamily,
        /// Free-text task description.
        spec: String,
    },
    /// Run one task end to end and write the family's output files.
    Run {
        /// Agent family: security, performance or question.
        family: TaskFamily,
        /// Free-text task description.
        spec: String,
        /// Source file to include in the prompt, relative to `--root`.
        #[arg(long)]
        source: Option<PathBuf>,
        /// Use the deterministic simulated backend.
        #[arg(
            long,
            env = "AGENTS_SIMULATE",
            value_parser = clap::builder::FalseyValueParser::new()
        )]
        simulate: bool,
    },
}

#[tokio::main]
async fn main() {
    logging::init();
    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{err:#}");
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Init { force } => cmd_init(&cli.root, force),
        Command::Classify { family, spec } => {
            cmd_classify(family, &spec);
            Ok(())
        }
        Command::Run {
            family,
            spec,
            source,
            simulate,
        } => cmd_run(&cli.root, family, spec, source, simulate).await,
    }
}

fn cmd_init(root: &Path, force: bool) -> Result<()> {
    let paths = init_agents(root, &InitOptions { force })?;
    println!("{}", paths.config_path.display());
    Ok(())
}

fn cmd_classify(family: TaskFamily, spec: &str) {
    println!("{}", family.classify(spec));
    for (classification, hits) in family.scores(spec) {
        println!("  {}: {hits}", classification.label());
    }
}

async fn cmd_run(
    root: &Path,
    family: TaskFamily,
    spec: String,
    source: Option<PathBuf>,
    simulate: bool,
) -> Result<()> {
    let paths = AgentsPaths::new(root);
    let cfg = paths
        .load_config()
        .with_context(|| format!("load {}", paths.config_path.display()))?;

    let mode = BackendMode::from_flag(simulate || cfg.simulate);
    let generator = build_generator(mode, &cfg.live).map_err(PipelineError::from)?;

    let mut task = AgentTask::new(spec);
    if let Some(source) = source {
        task = task.with_source(source);
    }

    let outcome = run_task(root, family, &task, generator.as_ref(), &cfg).await?;
    println!("{} ({})", outcome.classification, outcome.backend);
    for path in &outcome.written {
        println!("{}", path.display());
    }
    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<PipelineError>() {
        Some(PipelineError::Generation(_)) => exit_codes::GENERATION_FAILED,
        Some(PipelineError::Write { .. }) => exit_codes::WRITE_FAILED,
        _ => exit_codes::INVALID,
    }
}
