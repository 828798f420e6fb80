//! `cronpilot template`: create a job from a reusable template.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use cronpilot_core::{JobPatch, JobTemplate};

use crate::definition;
use crate::engine::Engine;
use crate::jobs_cmd::create_job;
use crate::terminal_output::note_success;

#[derive(Args)]
pub struct TemplateArgs {
    /// Template definition file (YAML or JSON)
    pub file: PathBuf,
    /// Name for the new job; defaults to the template's name
    #[arg(long)]
    pub name: Option<String>,
    /// Create the job enabled (templates instantiate disabled by default)
    #[arg(long)]
    pub enabled: bool,
    #[arg(long)]
    pub schedule: Option<String>,
    #[arg(long)]
    pub command: Option<String>,
    #[arg(long)]
    pub method: Option<String>,
    /// Header map as a JSON object
    #[arg(long)]
    pub headers: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub notify_on_success: Option<bool>,
    #[arg(long)]
    pub notify_on_failure: Option<bool>,
}

impl TemplateArgs {
    fn patch(&self) -> JobPatch {
        JobPatch {
            schedule: self.schedule.clone(),
            command: self.command.clone(),
            method: self.method.clone(),
            headers: self.headers.clone(),
            description: self.description.clone(),
            notify_on_success: self.notify_on_success,
            notify_on_failure: self.notify_on_failure,
        }
    }
}

pub async fn run(args: TemplateArgs, engine: &Engine) -> Result<()> {
    let template: JobTemplate = definition::load(&args.file)?;
    let name = args
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| template.name.clone());
    anyhow::ensure!(!name.trim().is_empty(), "the template has no name; pass --name");

    let new_job = template.instantiate(name, args.enabled, &args.patch());
    let job = create_job(engine, &new_job)?;
    note_success(&format!("Created job {} ({}) from template", job.id, job.name));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: TemplateArgs,
    }

    #[test]
    fn flags_become_patch_overrides() {
        let harness = Harness::parse_from([
            "cronpilot",
            "tpl.yaml",
            "--schedule",
            "0 0 * * * *",
            "--notify-on-success",
            "true",
        ]);
        let patch = harness.args.patch();
        assert_eq!(patch.schedule.as_deref(), Some("0 0 * * * *"));
        assert_eq!(patch.notify_on_success, Some(true));
        assert!(patch.command.is_none());
        assert!(patch.notify_on_failure.is_none());
        assert!(!harness.args.enabled);
    }

    #[test]
    fn no_flags_is_an_empty_patch() {
        let harness = Harness::parse_from(["cronpilot", "tpl.yaml", "--enabled"]);
        assert!(harness.args.patch().is_empty());
        assert_eq!(harness.args.file, PathBuf::from("tpl.yaml"));
        assert!(harness.args.enabled);
    }
}
