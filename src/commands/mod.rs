//! Subcommand handlers
//!
//! Each handler loads its inputs, runs the release service and prints
//! the result.

pub mod render;
pub mod templates;
pub mod validate;

use crate::cli::ReleaseArgs;
use crate::config::{load_credentials, load_params, parse_labels};
use crate::domain::params::Params;
use crate::domain::resolve::ReleaseHints;
use crate::error::{ConfigError, ReleaseError};
use crate::services::ReleaseService;

/// Load the parameter tree and build a release service for it
pub(crate) async fn load_release(
    args: &ReleaseArgs,
    require_credentials: bool,
) -> Result<(Params, ReleaseService), ReleaseError> {
    let params = load_params(&args.params).await?;

    let credentials = match &args.credentials {
        Some(path) => load_credentials(path).await?,
        None if require_credentials => return Err(ConfigError::CredentialsNotProvided.into()),
        None => Vec::new(),
    };

    let hints = ReleaseHints {
        app_label: args.app_label.clone(),
        build_version: args.build_version.clone(),
        release_name: args.release_name.clone(),
        labels: parse_labels(&args.labels)?,
    };

    Ok((params, ReleaseService::new(hints, credentials)))
}
