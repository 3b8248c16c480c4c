//! CLI definitions for gke-release
//!
//! This module contains all CLI argument parsing structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "gke-release",
    version,
    about = "Resolve release parameters and compose Kubernetes manifests for GKE",
    long_about = "Fills defaults into a release parameter file, validates it and selects\nthe manifest templates and rendering data for a single application release."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve and validate parameters, then print templates and rendering data
    Render {
        #[command(flatten)]
        release: ReleaseArgs,

        /// Replica count currently running (0 if unknown)
        #[arg(long, default_value = "0")]
        current_replicas: u32,

        /// Release identifier added as a label
        #[arg(long, env = "RELEASE_ID", default_value = "")]
        release_id: String,

        /// Output format (json or yaml)
        #[arg(long, default_value = "json")]
        output: String,
    },

    /// Resolve parameters and report every validation error
    Validate {
        #[command(flatten)]
        release: ReleaseArgs,
    },

    /// Resolve defaults and print the templates that would be rendered
    Templates {
        #[command(flatten)]
        release: ReleaseArgs,
    },
}

/// Inputs shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct ReleaseArgs {
    /// Path to the release parameter file (YAML)
    #[arg(long, default_value = "params.yaml")]
    pub params: PathBuf,

    /// Path to the cluster credentials file (JSON array)
    #[arg(long, env = "CREDENTIALS_FILE")]
    pub credentials: Option<PathBuf>,

    /// Application label of the build
    #[arg(long, env = "APP_LABEL", default_value = "")]
    pub app_label: String,

    /// Version of the build, used as default image tag
    #[arg(long, env = "BUILD_VERSION", default_value = "")]
    pub build_version: String,

    /// Release target name, e.g. production
    #[arg(long, env = "RELEASE_NAME", default_value = "")]
    pub release_name: String,

    /// Build labels (key=value, can be specified multiple times)
    #[arg(long = "label")]
    pub labels: Vec<String>,
}
