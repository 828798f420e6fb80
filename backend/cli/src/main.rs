mod definition;
mod engine;
mod jobs_cmd;
mod logs_cmd;
mod template_cmd;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use cronpilot_config::{check, config_dir, config_file_path, load_and_prepare, EngineConfig};
use cronpilot_scheduler::Scheduler;

use engine::Engine;

#[derive(Parser)]
#[command(name = "cronpilot")]
#[command(about = "Cronpilot: cron scheduling with execution logs and notifications")]
#[command(version)]
struct Cli {
    /// Path to the config file (default: ~/.cronpilot/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler until interrupted
    Serve,
    /// Execute a job once, right now, and print its record
    Run { id: i64 },
    /// Manage jobs
    Jobs {
        #[command(subcommand)]
        command: jobs_cmd::JobsCommands,
    },
    /// Show recent executions of a job
    Logs {
        job_id: i64,
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Create a job from a template file
    Template(template_cmd::TemplateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config_path, dir) = match &cli.config {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            (path.clone(), dir)
        }
        None => {
            let dir = config_dir();
            (config_file_path(&dir), dir)
        }
    };
    let config = load_and_prepare(&config_path, &dir).await?;

    cronpilot_logging::init_logger(
        config.log_dir().as_deref(),
        config.log_level(),
        config.log_json(),
    );
    check(&config)?;

    let engine = Engine::open(&config)?;

    match cli.command {
        Commands::Serve => run_server(&config, engine).await?,
        Commands::Run { id } => {
            // A missing job is an error exit; a failed run still prints its record.
            let record = engine.executor.run_now(id).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Jobs { command } => jobs_cmd::run(command, &engine).await?,
        Commands::Logs { job_id, limit, json } => logs_cmd::run(&engine, job_id, limit, json).await?,
        Commands::Template(args) => template_cmd::run(args, &engine).await?,
    }

    Ok(())
}

async fn run_server(config: &EngineConfig, engine: Engine) -> Result<()> {
    info!(
        tick_ms = config.tick().as_millis() as u64,
        reconcile = ?config.reconcile_interval(),
        "Starting Cronpilot scheduler"
    );

    let scheduler = Scheduler::with_tick(engine.jobs.clone(), engine.executor.clone(), config.tick());
    let scheduled = scheduler.start().await?;
    info!(jobs = scheduled, "Scheduler running; press Ctrl-C to stop");

    // Jobs edited through the CLI while serving are picked up here.
    let mut reconcile = config.reconcile_interval().map(tokio::time::interval);
    if let Some(interval) = reconcile.as_mut() {
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        interval.tick().await;
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = async {
                match reconcile.as_mut() {
                    Some(interval) => { interval.tick().await; }
                    None => std::future::pending::<()>().await,
                }
            } => {
                if let Err(e) = scheduler.reconcile() {
                    warn!(error = %e, "Reconcile failed; keeping current schedule");
                }
            }
        }
    }

    info!("Shutdown signal received");
    scheduler.stop().await;
    info!("Cronpilot stopped");
    Ok(())
}
