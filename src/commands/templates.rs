//! Templates command
//!
//! Prints the templates a release would render, one per line.

use anyhow::Result;

use crate::cli::ReleaseArgs;
use crate::domain::templates::select_templates;
use crate::ui;

/// Execute the templates command
pub async fn execute(release: ReleaseArgs) -> Result<()> {
    let (params, service) = super::load_release(&release, false).await?;

    let params = service.resolve_defaults(params);
    let templates = select_templates(&params);

    if templates.is_empty() {
        let action = params
            .action
            .map(|a| a.to_string())
            .unwrap_or_else(|| "this release".to_string());
        ui::print_warning(&format!("No templates to render for {}", action));
        return Ok(());
    }

    for template in templates {
        println!("{}", template);
    }

    Ok(())
}
