// src/bin/deploy_check.rs
// DOCUMENTATION: Validate the deployment descriptors
// PURPOSE: Print service startup order and pipeline job order, fail on any violation

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use yamdb::deploy::{ComposeFile, Workflow};

#[derive(Parser, Debug)]
#[command(author, version, about = "Check docker-compose topology and CI workflow")]
struct Args {
    /// docker-compose file
    #[arg(long, default_value = "infra/docker-compose.yml")]
    compose: PathBuf,

    /// GitHub Actions workflow file
    #[arg(long, default_value = ".github/workflows/yamdb_workflow.yml")]
    workflow: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let compose = ComposeFile::from_path(&args.compose)
        .with_context(|| format!("loading {}", args.compose.display()))?;
    let startup = compose
        .validate()
        .with_context(|| format!("validating {}", args.compose.display()))?;
    println!("Service startup order: {}", startup.join(" -> "));

    let workflow = Workflow::from_path(&args.workflow)
        .with_context(|| format!("loading {}", args.workflow.display()))?;
    let jobs = workflow
        .validate()
        .with_context(|| format!("validating {}", args.workflow.display()))?;
    println!("Pipeline job order: {}", jobs.join(" -> "));

    if !workflow.is_linear_chain() {
        bail!("pipeline jobs are not a gated linear chain");
    }

    let secrets: Vec<String> = workflow.secrets().into_iter().collect();
    println!("Secrets referenced: {}", secrets.join(", "));

    Ok(())
}
