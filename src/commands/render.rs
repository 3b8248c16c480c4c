//! Render command
//!
//! Runs the full release plan and prints templates plus rendering data
//! for the template renderer.

use anyhow::{Context, Result};

use crate::cli::ReleaseArgs;
use crate::services::ReleasePlan;

/// Output format for the render command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn from_arg(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// Serialize a plan in the requested format
pub fn format_plan(plan: &ReleasePlan, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(plan).context("Failed to serialize plan as JSON")
        }
        OutputFormat::Yaml => serde_yaml::to_string(plan).context("Failed to serialize plan as YAML"),
    }
}

/// Execute the render command
pub async fn execute(
    release: ReleaseArgs,
    current_replicas: u32,
    release_id: String,
    output: String,
) -> Result<()> {
    let (params, service) = super::load_release(&release, true).await?;

    let plan = service.plan(params, current_replicas, &release_id)?;

    println!("{}", format_plan(&plan, OutputFormat::from_arg(&output))?);

    Ok(())
}
