//! Release service - orchestrates release planning
//!
//! Coordinates the domain steps of a release:
//! defaulting, credential lookup, validation, template selection and
//! rendering data.

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::credentials::{find_credential, CredentialRecord};
use crate::domain::params::Params;
use crate::domain::render_data::RenderingData;
use crate::domain::resolve::{apply_credentials, resolve, ReleaseHints};
use crate::domain::templates::select_templates;
use crate::error::ReleaseError;

/// Everything the renderer needs for one release
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleasePlan {
    pub templates: Vec<String>,
    pub data: RenderingData,
}

/// Service for planning releases
#[derive(Debug)]
pub struct ReleaseService {
    hints: ReleaseHints,
    credentials: Vec<CredentialRecord>,
}

impl ReleaseService {
    /// Create a new release service
    pub fn new(hints: ReleaseHints, credentials: Vec<CredentialRecord>) -> Self {
        Self { hints, credentials }
    }

    /// Fill static and hint-based defaults only
    pub fn resolve_defaults(&self, params: Params) -> Params {
        resolve(params, &self.hints)
    }

    /// Fill all defaults, including those taken from the cluster credential
    pub fn resolve(&self, params: Params) -> Result<Params, ReleaseError> {
        let params = self.resolve_defaults(params);
        let credential = find_credential(&self.credentials, &params.credentials)?;
        debug!(
            "Using credential {} (project: {})",
            credential.name, credential.additional_properties.project
        );
        Ok(apply_credentials(params, credential))
    }

    /// Resolve and validate, returning every violation on failure
    pub fn resolve_and_validate(&self, params: Params) -> Result<Params, ReleaseError> {
        let params = self.resolve(params)?;
        params
            .validate()
            .map_err(|errors| ReleaseError::ValidationFailed { errors })?;
        Ok(params)
    }

    /// Produce the template list and rendering data for a release
    pub fn plan(
        &self,
        params: Params,
        current_replicas: u32,
        release_id: &str,
    ) -> Result<ReleasePlan, ReleaseError> {
        let params = self.resolve_and_validate(params)?;

        let templates = select_templates(&params);
        let data = RenderingData::build(&params, current_replicas, release_id);

        info!(
            "Planned {} of {} into {} with {} template(s)",
            params
                .action
                .map(|a| a.to_string())
                .unwrap_or_else(|| "release".to_string()),
            params.app,
            params.namespace,
            templates.len()
        );

        Ok(ReleasePlan { templates, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credentials::CredentialProperties;
    use crate::domain::params::{Action, Visibility};
    use crate::domain::validation::tests::valid_params;

    fn credential(name: &str) -> CredentialRecord {
        CredentialRecord {
            name: name.to_string(),
            credential_type: "kubernetes-engine".to_string(),
            additional_properties: CredentialProperties {
                default_namespace: "fallback".to_string(),
                project: "myproject".to_string(),
            },
        }
    }

    fn service() -> ReleaseService {
        let hints = ReleaseHints {
            app_label: "myapp".to_string(),
            build_version: "1.0.0".to_string(),
            release_name: "production".to_string(),
            ..Default::default()
        };
        ReleaseService::new(hints, vec![credential("gke-production")])
    }

    #[test]
    fn test_plan_valid_release() {
        let plan = service().plan(valid_params(), 5, "42").unwrap();
        assert!(plan.templates.contains(&"/templates/deployment.yaml".to_string()));
        assert_eq!(plan.data.name, "myapp");
        assert_eq!(plan.data.replicas, 5);
        assert_eq!(plan.data.release_id_label, "42");
    }

    #[test]
    fn test_plan_reports_every_violation() {
        let mut params = valid_params();
        params.hosts.clear();
        params.visibility = Some(Visibility::Other("everyone".to_string()));
        let err = service().plan(params, 0, "").unwrap_err();
        match err {
            ReleaseError::ValidationFailed { errors } => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_credential_name_defaults_from_release_name() {
        let mut params = valid_params();
        params.credentials.clear();
        params.namespace.clear();
        let resolved = service().resolve(params).unwrap();
        assert_eq!(resolved.credentials, "gke-production");
        assert_eq!(resolved.namespace, "fallback");
    }

    #[test]
    fn test_unknown_credential_fails() {
        let mut params = valid_params();
        params.credentials = "gke-staging".to_string();
        let err = service().resolve(params).unwrap_err();
        assert!(matches!(err, ReleaseError::Credential(_)));
    }

    #[test]
    fn test_rollback_plan_has_no_templates() {
        let mut params = valid_params();
        params.action = Some(Action::RollbackCanary);
        let plan = service().plan(params, 0, "").unwrap();
        assert!(plan.templates.is_empty());
    }

    #[test]
    fn test_resolve_defaults_skips_credentials() {
        let service = ReleaseService::new(ReleaseHints::default(), Vec::new());
        let resolved = service.resolve_defaults(Params::default());
        assert_eq!(resolved.container.port, 5000);
    }
}
