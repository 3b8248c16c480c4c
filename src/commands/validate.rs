//! Validate command
//!
//! Resolves every default and lists all validation errors at once.

use anyhow::{bail, Result};

use crate::cli::ReleaseArgs;
use crate::domain::validation::validate;
use crate::error::ReleaseError;
use crate::ui;

/// Execute the validate command
pub async fn execute(release: ReleaseArgs) -> Result<()> {
    let (params, service) = super::load_release(&release, true).await?;

    let params = service.resolve(params)?;
    ui::print_header(&format!("Validate: {}", params.app));

    let (valid, errors) = validate(&params);
    if valid {
        ui::print_success(&format!(
            "{} is valid for {} in {}",
            params.app,
            params.visibility.as_ref().map(|v| v.as_str()).unwrap_or(""),
            params.namespace
        ));
        return Ok(());
    }

    for error in &errors {
        ui::print_error(error);
    }
    bail!(ReleaseError::ValidationFailed { errors })
}
