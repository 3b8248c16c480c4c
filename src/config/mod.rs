//! # Release Input Loading
//!
//! Reads the files a release step is handed:
//!
//! 1. **Parameters** (`--params`, YAML)
//!    - The partially populated parameter tree
//!    - `configs.files` are read relative to the parameter file's directory
//!
//! 2. **Credentials** (`--credentials`, JSON array)
//!    - Cluster credential records supplied by the credential provider
//!
//! Defaulting and validation happen in the domain layer; nothing here
//! interprets the values it loads.

pub mod defaults;

use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::domain::credentials::CredentialRecord;
use crate::domain::params::Params;
use crate::error::ConfigError;

async fn read_file(path: &Path) -> Result<String, ConfigError> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(ConfigError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Load the parameter tree and render its config files
pub async fn load_params(path: &Path) -> Result<Params, ConfigError> {
    let content = read_file(path).await?;
    let mut params: Params =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    params.configs.rendered_file_content =
        render_config_files(base_dir, &params.configs.files, &params.configs.inline_files)
            .await?;

    debug!(
        "Loaded parameters from {} ({} config file(s))",
        path.display(),
        params.configs.rendered_file_content.len()
    );

    Ok(params)
}

/// Read config files keyed by base filename, then overlay inline files
pub async fn render_config_files(
    base_dir: &Path,
    files: &[String],
    inline_files: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut rendered = BTreeMap::new();

    for file in files {
        let file_path = base_dir.join(file);
        let content = read_file(&file_path).await?;
        let key = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(file.as_str())
            .to_string();
        rendered.insert(key, content);
    }

    for (name, content) in inline_files {
        rendered.insert(name.clone(), content.clone());
    }

    Ok(rendered)
}

/// Load the credential records supplied for this release
pub async fn load_credentials(path: &Path) -> Result<Vec<CredentialRecord>, ConfigError> {
    let content = read_file(path).await?;
    let records: Vec<CredentialRecord> =
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    debug!("Loaded {} credential(s) from {}", records.len(), path.display());

    Ok(records)
}

/// Parse `key=value` label arguments
pub fn parse_labels(values: &[String]) -> Result<BTreeMap<String, String>, ConfigError> {
    values
        .iter()
        .map(|value| match value.split_once('=') {
            Some((key, label)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), label.trim().to_string()))
            }
            _ => Err(ConfigError::InvalidLabel {
                value: value.clone(),
            }),
        })
        .collect()
}
