//! `cronpilot logs`: recent execution history for a job.

use anyhow::Result;

use cronpilot_core::ExecutionRecord;
use cronpilot_notify::render::{format_duration, format_time};

use crate::engine::Engine;
use crate::terminal_output::{one_line, outcome_cell, render_table, Column};

pub async fn run(engine: &Engine, job_id: i64, limit: usize, json: bool) -> Result<()> {
    let records = engine.logs.recent(job_id, limit)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        println!("No executions recorded for job {job_id}.");
    } else {
        print!("{}", records_table(&records));
    }
    Ok(())
}

fn records_table(records: &[ExecutionRecord]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            let detail = match &r.error {
                Some(err) => err.as_str(),
                None => r.output.as_str(),
            };
            vec![
                r.id.map(|id| id.to_string()).unwrap_or_default(),
                format_time(r.started_at),
                format_duration(r.duration()),
                outcome_cell(r.success),
                one_line(detail, 60),
            ]
        })
        .collect();
    render_table(
        &[
            Column::right("RUN"),
            Column::left("STARTED"),
            Column::right("TOOK"),
            Column::left("RESULT"),
            Column::left("DETAIL"),
        ],
        &rows,
    )
}
