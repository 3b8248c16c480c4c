//! Required-property validation
//!
//! Runs after defaulting. Every rule is evaluated and every violation is
//! collected so the operator sees the complete list in one pass.

use super::params::{Params, Visibility};

impl Params {
    /// Validate the resolved parameter tree
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let required = [
            ("app", &self.app),
            ("namespace", &self.namespace),
            ("container.repository", &self.container.image_repository),
            ("container.name", &self.container.image_name),
            ("container.tag", &self.container.image_tag),
            ("credentials", &self.credentials),
        ];
        for (field, value) in required {
            if value.is_empty() {
                errors.push(format!("{} is required; set it via the {} property", field, field));
            }
        }

        match &self.visibility {
            None => errors.push("visibility is required; set it to public or private".to_string()),
            Some(Visibility::Public) | Some(Visibility::Private) => {}
            Some(other) => errors.push(format!(
                "visibility '{}' is not supported; set it to public or private",
                other
            )),
        }

        let quantities = [
            ("container.cpu.request", &self.container.cpu.request),
            ("container.cpu.limit", &self.container.cpu.limit),
            ("container.memory.request", &self.container.memory.request),
            ("container.memory.limit", &self.container.memory.limit),
        ];
        for (field, value) in quantities {
            if value.is_empty() {
                errors.push(format!("{} is required", field));
            }
        }

        if self.container.port == 0 {
            errors.push("container.port must be larger than zero".to_string());
        }

        if self.hosts.is_empty() {
            errors.push("hosts must contain at least one host".to_string());
        }

        let positive = [
            ("autoscale.min", self.autoscale.min_replicas),
            ("autoscale.max", self.autoscale.max_replicas),
            ("autoscale.cpu", self.autoscale.cpu_percentage),
            (
                "container.liveness.delay",
                self.container.liveness_probe.initial_delay_seconds,
            ),
            (
                "container.liveness.timeout",
                self.container.liveness_probe.timeout_seconds,
            ),
            (
                "container.readiness.timeout",
                self.container.readiness_probe.timeout_seconds,
            ),
        ];
        for (field, value) in positive {
            if value == 0 {
                errors.push(format!("{} must be larger than zero", field));
            }
        }

        if self.container.liveness_probe.path.is_empty() {
            errors.push("container.liveness.path is required".to_string());
        }
        if self.container.readiness_probe.path.is_empty() {
            errors.push("container.readiness.path is required".to_string());
        }

        self.validate_metrics(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_metrics(&self, errors: &mut Vec<String>) {
        let metrics = &self.container.metrics;

        let scrape = match metrics.scrape.as_deref() {
            None | Some("") => {
                errors.push("container.metrics.scrape is required".to_string());
                None
            }
            Some(raw) => match raw.parse::<bool>() {
                Ok(scrape) => Some(scrape),
                Err(_) => {
                    errors.push(format!(
                        "container.metrics.scrape must be true or false, got '{}'",
                        raw
                    ));
                    None
                }
            },
        };

        // path and port only matter when scraping is not explicitly disabled
        if scrape != Some(false) {
            if metrics.path.is_empty() {
                errors.push("container.metrics.path is required when scraping".to_string());
            }
            if metrics.port == 0 {
                errors.push("container.metrics.port must be larger than zero when scraping".to_string());
            }
        }
    }
}

/// Validate a resolved parameter tree, returning the flag and every violation
pub fn validate(params: &Params) -> (bool, Vec<String>) {
    match params.validate() {
        Ok(()) => (true, Vec::new()),
        Err(errors) => (false, errors),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::params::{
        AutoscaleParams, ContainerParams, MetricsParams, ProbeParams, ResourceParams,
    };

    pub(crate) fn valid_params() -> Params {
        Params {
            credentials: "gke-production".to_string(),
            app: "myapp".to_string(),
            namespace: "mynamespace".to_string(),
            autoscale: AutoscaleParams {
                min_replicas: 3,
                max_replicas: 100,
                cpu_percentage: 80,
            },
            container: ContainerParams {
                image_repository: "estafette".to_string(),
                image_name: "my-app".to_string(),
                image_tag: "1.0.0".to_string(),
                port: 5000,
                cpu: ResourceParams {
                    request: "100m".to_string(),
                    limit: "150m".to_string(),
                },
                memory: ResourceParams {
                    request: "768Mi".to_string(),
                    limit: "1024Mi".to_string(),
                },
                liveness_probe: ProbeParams {
                    path: "/liveness".to_string(),
                    port: 5000,
                    initial_delay_seconds: 30,
                    timeout_seconds: 1,
                },
                readiness_probe: ProbeParams {
                    path: "/readiness".to_string(),
                    port: 5000,
                    initial_delay_seconds: 0,
                    timeout_seconds: 1,
                },
                metrics: MetricsParams {
                    scrape: Some("true".to_string()),
                    path: "/metrics".to_string(),
                    port: 5000,
                },
                ..Default::default()
            },
            visibility: Some(Visibility::Private),
            hosts: vec!["gke.estafette.io".to_string()],
            ..Default::default()
        }
    }

    fn assert_invalid(params: Params) {
        let (valid, errors) = validate(&params);
        assert!(!valid);
        assert!(!errors.is_empty());
    }

    fn assert_valid(params: Params) {
        let (valid, errors) = validate(&params);
        assert!(valid, "unexpected errors: {:?}", errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_valid_baseline() {
        assert_valid(valid_params());
    }

    #[test]
    fn test_each_blank_required_field_is_reported() {
        let blankers: Vec<fn(&mut Params)> = vec![
            |p| p.app.clear(),
            |p| p.namespace.clear(),
            |p| p.container.image_repository.clear(),
            |p| p.container.image_name.clear(),
            |p| p.container.image_tag.clear(),
            |p| p.credentials.clear(),
            |p| p.visibility = None,
            |p| p.container.cpu.request.clear(),
            |p| p.container.cpu.limit.clear(),
            |p| p.container.memory.request.clear(),
            |p| p.container.memory.limit.clear(),
            |p| p.container.port = 0,
            |p| p.hosts.clear(),
            |p| p.autoscale.min_replicas = 0,
            |p| p.autoscale.max_replicas = 0,
            |p| p.autoscale.cpu_percentage = 0,
            |p| p.container.liveness_probe.path.clear(),
            |p| p.container.liveness_probe.initial_delay_seconds = 0,
            |p| p.container.liveness_probe.timeout_seconds = 0,
            |p| p.container.readiness_probe.path.clear(),
            |p| p.container.readiness_probe.timeout_seconds = 0,
            |p| p.container.metrics.path.clear(),
            |p| p.container.metrics.port = 0,
            |p| p.container.metrics.scrape = None,
        ];
        for blank in blankers {
            let mut params = valid_params();
            blank(&mut params);
            assert_invalid(params);
        }
    }

    #[test]
    fn test_readiness_initial_delay_may_be_zero() {
        let mut params = valid_params();
        params.container.readiness_probe.initial_delay_seconds = 0;
        assert_valid(params);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut params = valid_params();
        params.app.clear();
        params.namespace.clear();
        params.hosts.clear();
        let errors = params.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("app"));
        assert!(errors[1].contains("namespace"));
        assert!(errors[2].contains("hosts"));
    }

    #[test]
    fn test_visibility_public_and_private_are_valid() {
        let mut params = valid_params();
        params.visibility = Some(Visibility::Public);
        assert_valid(params);
    }

    #[test]
    fn test_unsupported_visibility_is_invalid() {
        let mut params = valid_params();
        params.visibility = Some(Visibility::Other("everyone".to_string()));
        assert_invalid(params);
    }

    #[test]
    fn test_iap_visibility_is_rejected_by_validator() {
        let mut params = valid_params();
        params.visibility = Some(Visibility::Iap);
        assert_invalid(params);

        let mut params = valid_params();
        params.visibility = Some(Visibility::PublicWhitelist);
        assert_invalid(params);
    }

    #[test]
    fn test_metrics_path_and_port_optional_when_scrape_false() {
        let mut params = valid_params();
        params.container.metrics.scrape = Some("false".to_string());
        params.container.metrics.path.clear();
        params.container.metrics.port = 0;
        assert_valid(params);
    }

    #[test]
    fn test_metrics_scrape_empty_string_is_invalid() {
        let mut params = valid_params();
        params.container.metrics.scrape = Some(String::new());
        assert_invalid(params);
    }

    #[test]
    fn test_metrics_scrape_false_is_valid() {
        let mut params = valid_params();
        params.container.metrics.scrape = Some("false".to_string());
        assert_valid(params);
    }

    #[test]
    fn test_metrics_scrape_non_boolean_is_invalid() {
        let mut params = valid_params();
        params.container.metrics.scrape = Some("yessir".to_string());
        let errors = params.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("yessir")));
    }
}
