//! `cronpilot jobs`: manage job definitions.

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use cronpilot_core::{Job, JobStore, NewJob};
use cronpilot_scheduler::validate_cron;

use crate::definition;
use crate::engine::Engine;
use crate::terminal_output::{enabled_cell, note_success, note_warn, one_line, render_table, Column};

#[derive(Subcommand)]
pub enum JobsCommands {
    /// List every job, enabled or not
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Create a job from a YAML or JSON definition file
    Add {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Show one job
    Show { id: i64 },
    /// Enable a job
    Enable { id: i64 },
    /// Disable a job
    Disable { id: i64 },
    /// Delete a job (its execution logs are kept)
    Delete { id: i64 },
}

pub async fn run(cmd: JobsCommands, engine: &Engine) -> Result<()> {
    match cmd {
        JobsCommands::List { json } => {
            let jobs = engine.jobs.list_all()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&jobs)?);
            } else if jobs.is_empty() {
                println!("No jobs defined.");
            } else {
                print!("{}", jobs_table(&jobs));
                for job in &jobs {
                    if let Err(e) = validate_cron(&job.schedule) {
                        note_warn(&format!("job {} will not be scheduled: {e}", job.id));
                    }
                }
            }
        }
        JobsCommands::Add { file } => {
            let new_job: NewJob = definition::load(&file)?;
            let job = create_job(engine, &new_job)?;
            note_success(&format!("Created job {} ({})", job.id, job.name));
        }
        JobsCommands::Show { id } => {
            let job = engine.jobs.find_by_id(id)?;
            println!("{}", serde_json::to_string_pretty(&job)?);
        }
        JobsCommands::Enable { id } => {
            let job = engine.jobs.set_enabled(id, true)?;
            note_success(&format!("Enabled job {} ({})", job.id, job.name));
        }
        JobsCommands::Disable { id } => {
            let job = engine.jobs.set_enabled(id, false)?;
            note_success(&format!("Disabled job {} ({})", job.id, job.name));
        }
        JobsCommands::Delete { id } => {
            engine.jobs.delete(id)?;
            note_success(&format!("Deleted job {id}"));
        }
    }
    Ok(())
}

/// Persist `job` after checking its schedule parses.
pub fn create_job(engine: &Engine, job: &NewJob) -> Result<Job> {
    validate_cron(&job.schedule)?;
    Ok(engine.jobs.create(job)?)
}

fn jobs_table(jobs: &[Job]) -> String {
    let rows: Vec<Vec<String>> = jobs
        .iter()
        .map(|j| {
            vec![
                j.id.to_string(),
                enabled_cell(j.enabled),
                j.name.clone(),
                j.schedule.clone(),
                one_line(&j.command, 48),
            ]
        })
        .collect();
    render_table(
        &[
            Column::right("ID"),
            Column::left("ON"),
            Column::left("NAME"),
            Column::left("SCHEDULE"),
            Column::left("COMMAND"),
        ],
        &rows,
    )
}
