//! Template selection
//!
//! Maps a resolved parameter tree to the ordered list of manifest templates
//! the renderer has to process.

use std::fmt;
use std::path::Path;

use super::params::{Action, Params, Visibility};

/// Directory the built-in templates are served from
pub const BUILT_IN_TEMPLATE_DIR: &str = "/templates";

pub const SERVICE_ACCOUNT: &str = "serviceaccount";
pub const SERVICE: &str = "service";
pub const CERTIFICATE_SECRET: &str = "certificate-secret";
pub const INGRESS: &str = "ingress";
pub const INTERNAL_INGRESS: &str = "internal-ingress";
pub const CONFIGMAP: &str = "configmap";
pub const APPLICATION_SECRETS: &str = "application-secrets";
pub const DEPLOYMENT: &str = "deployment";
pub const CRONJOB: &str = "cronjob";
pub const HORIZONTAL_POD_AUTOSCALER: &str = "horizontalpodautoscaler";
pub const POD_DISRUPTION_BUDGET: &str = "poddisruptionbudget";

/// A template to render: shipped with the tool or supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    BuiltIn(&'static str),
    Override(String),
}

impl TemplateSource {
    /// File name without directory or extension
    pub fn stem(&self) -> Option<&str> {
        match self {
            Self::BuiltIn(name) => Some(*name),
            Self::Override(path) => file_stem(path),
        }
    }

    pub fn is_built_in(&self) -> bool {
        matches!(self, Self::BuiltIn(_))
    }
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuiltIn(name) => write!(f, "{}/{}.yaml", BUILT_IN_TEMPLATE_DIR, name),
            Self::Override(path) => f.write_str(path),
        }
    }
}

fn file_stem(path: &str) -> Option<&str> {
    Path::new(path).file_stem().and_then(|s| s.to_str())
}

impl Params {
    /// Whether an autoscaler has a range to scale within
    pub fn autoscaling_enabled(&self) -> bool {
        self.autoscale.min_replicas > 0 && self.autoscale.max_replicas > self.autoscale.min_replicas
    }

    fn includes_ingress(&self) -> bool {
        matches!(self.visibility, Some(Visibility::Private) | Some(Visibility::Iap))
            && !self.is_worker()
    }

    /// Ordered templates for this release
    pub fn templates(&self) -> Vec<TemplateSource> {
        match self.action {
            Some(Action::RollbackCanary) => return Vec::new(),
            Some(Action::DeployCanary) => {
                // canary pods join the stable service; only scaling objects are rendered
                if self.autoscaling_enabled() {
                    return vec![
                        TemplateSource::BuiltIn(HORIZONTAL_POD_AUTOSCALER),
                        TemplateSource::BuiltIn(POD_DISRUPTION_BUDGET),
                    ];
                }
                return Vec::new();
            }
            _ => {}
        }

        let mut templates = vec![
            TemplateSource::BuiltIn(SERVICE_ACCOUNT),
            TemplateSource::BuiltIn(SERVICE),
            TemplateSource::BuiltIn(CERTIFICATE_SECRET),
        ];
        if self.includes_ingress() {
            templates.push(TemplateSource::BuiltIn(INGRESS));
        }
        if !self.internal_hosts.is_empty() && !self.is_worker() {
            templates.push(TemplateSource::BuiltIn(INTERNAL_INGRESS));
        }
        templates.push(TemplateSource::BuiltIn(CONFIGMAP));
        if !self.secrets.keys.is_empty() {
            templates.push(TemplateSource::BuiltIn(APPLICATION_SECRETS));
        }
        if self.is_scheduled() {
            templates.push(TemplateSource::BuiltIn(CRONJOB));
        } else {
            templates.push(TemplateSource::BuiltIn(DEPLOYMENT));
            templates.push(TemplateSource::BuiltIn(HORIZONTAL_POD_AUTOSCALER));
            templates.push(TemplateSource::BuiltIn(POD_DISRUPTION_BUDGET));
        }

        for file in &self.manifests.files {
            let stem = file_stem(file);
            let built_in = templates
                .iter()
                .position(|t| t.is_built_in() && stem.is_some() && t.stem() == stem);
            match built_in {
                Some(index) => templates[index] = TemplateSource::Override(file.clone()),
                None => templates.push(TemplateSource::Override(file.clone())),
            }
        }

        templates
    }
}

/// Template identifiers in render order
pub fn select_templates(params: &Params) -> Vec<String> {
    params.templates().iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::params::WorkloadType;
    use std::collections::BTreeMap;

    fn contains(templates: &[String], search: &str) -> bool {
        templates.iter().any(|t| t == search)
    }

    #[test]
    fn test_includes_ingress_for_private_api() {
        let params = Params {
            visibility: Some(Visibility::Private),
            workload_type: Some(WorkloadType::Api),
            ..Default::default()
        };
        assert!(contains(&select_templates(&params), "/templates/ingress.yaml"));
    }

    #[test]
    fn test_includes_ingress_for_iap_api() {
        let params = Params {
            visibility: Some(Visibility::Iap),
            workload_type: Some(WorkloadType::Api),
            ..Default::default()
        };
        assert!(contains(&select_templates(&params), "/templates/ingress.yaml"));
    }

    #[test]
    fn test_excludes_ingress_for_public() {
        let params = Params {
            visibility: Some(Visibility::Public),
            ..Default::default()
        };
        assert!(!contains(&select_templates(&params), "/templates/ingress.yaml"));
    }

    #[test]
    fn test_excludes_ingress_for_worker() {
        let params = Params {
            visibility: Some(Visibility::Private),
            workload_type: Some(WorkloadType::Worker),
            internal_hosts: vec!["myapp.internal".to_string()],
            ..Default::default()
        };
        let templates = select_templates(&params);
        assert!(!contains(&templates, "/templates/ingress.yaml"));
        assert!(!contains(&templates, "/templates/internal-ingress.yaml"));
    }

    #[test]
    fn test_includes_application_secrets_when_keys_present() {
        let mut keys = BTreeMap::new();
        keys.insert(
            "secret-file-1.json".to_string(),
            "c29tZSBzZWNyZXQgdmFsdWU=".to_string(),
        );
        let mut params = Params::default();
        params.secrets.keys = keys;
        assert!(contains(
            &select_templates(&params),
            "/templates/application-secrets.yaml"
        ));
    }

    #[test]
    fn test_excludes_application_secrets_without_keys() {
        assert!(!contains(
            &select_templates(&Params::default()),
            "/templates/application-secrets.yaml"
        ));
    }

    #[test]
    fn test_appends_local_manifest() {
        let mut params = Params::default();
        params.manifests.files = vec!["./gke/another-ingress.yaml".to_string()];
        let templates = select_templates(&params);
        assert_eq!(templates.last().map(String::as_str), Some("./gke/another-ingress.yaml"));
    }

    #[test]
    fn test_local_manifest_replaces_built_in_in_place() {
        let baseline = select_templates(&Params::default());
        let position = baseline
            .iter()
            .position(|t| t == "/templates/service.yaml")
            .unwrap();

        let mut params = Params::default();
        params.manifests.files = vec!["./gke/service.yaml".to_string()];
        let templates = select_templates(&params);

        assert_eq!(templates.len(), baseline.len());
        assert!(!contains(&templates, "/templates/service.yaml"));
        assert_eq!(templates[position], "./gke/service.yaml");
    }

    #[test]
    fn test_override_matches_regardless_of_extension() {
        let mut params = Params::default();
        params.manifests.files = vec!["deploy/deployment.yml".to_string()];
        let templates = select_templates(&params);
        assert!(contains(&templates, "deploy/deployment.yml"));
        assert!(!contains(&templates, "/templates/deployment.yaml"));
    }

    #[test]
    fn test_rollback_canary_renders_nothing() {
        let params = Params {
            action: Some(Action::RollbackCanary),
            ..Default::default()
        };
        assert!(select_templates(&params).is_empty());
    }

    #[test]
    fn test_canary_without_autoscaling_excludes_scaling_templates() {
        let params = Params {
            action: Some(Action::DeployCanary),
            ..Default::default()
        };
        let templates = select_templates(&params);
        assert!(!contains(&templates, "/templates/horizontalpodautoscaler.yaml"));
        assert!(!contains(&templates, "/templates/poddisruptionbudget.yaml"));
    }

    #[test]
    fn test_canary_with_autoscaling_renders_only_scaling_templates() {
        let mut params = Params {
            action: Some(Action::DeployCanary),
            ..Default::default()
        };
        params.autoscale.min_replicas = 3;
        params.autoscale.max_replicas = 10;
        assert_eq!(
            select_templates(&params),
            vec![
                "/templates/horizontalpodautoscaler.yaml".to_string(),
                "/templates/poddisruptionbudget.yaml".to_string(),
            ]
        );
    }

    #[test]
    fn test_scheduled_workload_uses_cronjob() {
        let params = Params {
            schedule: "*/5 * * * *".to_string(),
            ..Default::default()
        };
        let templates = select_templates(&params);
        assert!(contains(&templates, "/templates/cronjob.yaml"));
        assert!(!contains(&templates, "/templates/deployment.yaml"));
        assert!(!contains(&templates, "/templates/horizontalpodautoscaler.yaml"));
    }
}
