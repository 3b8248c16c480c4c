//! Defaulting resolver
//!
//! Fills every empty field of a [`Params`] tree from the static defaults
//! table, the pipeline-supplied hints, and finally the cluster credential.
//! A field that already holds a value is never touched, which makes both
//! passes idempotent.

use std::collections::BTreeMap;

use crate::config::defaults::{ProbeDefaults, ResourceDefaults, APP_LABEL_KEY, DEFAULTS};

use super::credentials::CredentialRecord;
use super::params::{
    Params, ProbeParams, ResourceParams, SidecarParams, Visibility, CLOUDSQLPROXY_SIDECAR,
    OPENRESTY_SIDECAR,
};

/// Values the pipeline knows about the build being released
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseHints {
    /// Application label of the build
    pub app_label: String,
    /// Version of the build, used as image tag
    pub build_version: String,
    /// Name of the release target, e.g. `production`
    pub release_name: String,
    /// Labels attached to the build
    pub labels: BTreeMap<String, String>,
}

/// Resolve static and hint-based defaults
pub fn resolve(mut params: Params, hints: &ReleaseHints) -> Params {
    params.set_defaults(hints);
    params
}

/// Resolve defaults sourced from the cluster credential
pub fn apply_credentials(mut params: Params, credential: &CredentialRecord) -> Params {
    params.set_defaults_from_credentials(credential);
    params
}

fn fill_str(field: &mut String, value: &str) {
    if field.is_empty() {
        *field = value.to_string();
    }
}

fn fill_u32(field: &mut u32, value: u32) {
    if *field == 0 {
        *field = value;
    }
}

/// Cross-fill a request/limit pair.
///
/// An empty request takes the limit, an empty limit takes the request; when
/// both start out empty each side gets its own static default.
fn fill_resources(resources: &mut ResourceParams, defaults: ResourceDefaults) {
    let request_set = !resources.request.is_empty();
    let limit_set = !resources.limit.is_empty();

    if !request_set {
        resources.request = if limit_set {
            resources.limit.clone()
        } else {
            defaults.request.to_string()
        };
    }
    if !limit_set {
        resources.limit = if request_set {
            resources.request.clone()
        } else {
            defaults.limit.to_string()
        };
    }
}

fn fill_probe(probe: &mut ProbeParams, defaults: ProbeDefaults, container_port: u32) {
    fill_str(&mut probe.path, defaults.path);
    fill_u32(&mut probe.port, container_port);
    fill_u32(&mut probe.initial_delay_seconds, defaults.initial_delay_seconds);
    fill_u32(&mut probe.timeout_seconds, defaults.timeout_seconds);
}

fn fill_sidecar(sidecar: &mut SidecarParams) {
    fill_resources(&mut sidecar.cpu, DEFAULTS.sidecar_cpu);
    fill_resources(&mut sidecar.memory, DEFAULTS.sidecar_memory);

    match sidecar.sidecar_type.as_str() {
        OPENRESTY_SIDECAR => fill_str(&mut sidecar.image, DEFAULTS.openresty_image),
        CLOUDSQLPROXY_SIDECAR => {
            fill_str(&mut sidecar.image, DEFAULTS.cloudsqlproxy_image);
            fill_u32(&mut sidecar.sql_proxy_port, DEFAULTS.cloudsqlproxy_port);
        }
        _ => {}
    }
}

impl Params {
    /// Fill empty fields with static defaults and pipeline hints
    pub fn set_defaults(&mut self, hints: &ReleaseHints) {
        fill_str(&mut self.app, &hints.app_label);
        fill_str(&mut self.container.image_name, &hints.app_label);
        fill_str(&mut self.container.image_tag, &hints.build_version);
        fill_str(&mut self.build_version, &hints.build_version);
        if self.credentials.is_empty() {
            self.credentials = format!("{}{}", DEFAULTS.credentials_prefix, hints.release_name);
        }
        self.set_label_defaults(hints);

        if self.visibility.is_none() {
            self.visibility = Some(Visibility::from(DEFAULTS.visibility.to_string()));
        }
        fill_str(&mut self.basepath, DEFAULTS.basepath);

        fill_u32(&mut self.autoscale.min_replicas, DEFAULTS.min_replicas);
        fill_u32(&mut self.autoscale.max_replicas, DEFAULTS.max_replicas);
        fill_u32(&mut self.autoscale.cpu_percentage, DEFAULTS.cpu_percentage);

        self.set_container_defaults();
        self.set_sidecar_defaults();

        fill_str(&mut self.request.timeout, DEFAULTS.request_timeout);
        fill_str(&mut self.request.max_body_size, DEFAULTS.request_max_body_size);
        fill_str(
            &mut self.request.client_body_buffer_size,
            DEFAULTS.request_client_body_buffer_size,
        );
        fill_str(&mut self.request.proxy_buffer_size, DEFAULTS.request_proxy_buffer_size);
        fill_u32(
            &mut self.request.proxy_buffers_number,
            DEFAULTS.request_proxy_buffers_number,
        );

        fill_str(&mut self.rolling_update.max_surge, DEFAULTS.rolling_update_max_surge);
        fill_str(
            &mut self.rolling_update.max_unavailable,
            DEFAULTS.rolling_update_max_unavailable,
        );

        fill_str(&mut self.secrets.mount_path, DEFAULTS.secrets_mount_path);
        fill_str(&mut self.configs.mount_path, DEFAULTS.configs_mount_path);
    }

    /// Inherited labels take the app name; explicit labels only gain a missing app label
    fn set_label_defaults(&mut self, hints: &ReleaseHints) {
        if self.labels.is_empty() {
            self.labels = hints.labels.clone();
            if !self.app.is_empty() {
                self.labels.insert(APP_LABEL_KEY.to_string(), self.app.clone());
            }
        } else if !self.app.is_empty() {
            let app = &self.app;
            self.labels
                .entry(APP_LABEL_KEY.to_string())
                .or_insert_with(|| app.clone());
        }
    }

    fn set_container_defaults(&mut self) {
        let visibility = self.visibility.clone();
        let container = &mut self.container;

        fill_resources(&mut container.cpu, DEFAULTS.container_cpu);
        fill_resources(&mut container.memory, DEFAULTS.container_memory);
        fill_u32(&mut container.port, DEFAULTS.container_port);

        let port = container.port;
        fill_probe(&mut container.liveness_probe, DEFAULTS.liveness, port);
        fill_probe(&mut container.readiness_probe, DEFAULTS.readiness, port);

        fill_str(&mut container.metrics.path, DEFAULTS.metrics_path);
        fill_u32(&mut container.metrics.port, port);
        if container.metrics.scrape.as_deref().map_or(true, str::is_empty) {
            container.metrics.scrape = Some(DEFAULTS.metrics_scrape.to_string());
        }

        container
            .lifecycle
            .prestop_sleep
            .get_or_insert(DEFAULTS.prestop_sleep);
        container
            .lifecycle
            .prestop_sleep_seconds
            .get_or_insert(DEFAULTS.prestop_sleep_seconds);

        for additional_port in &mut container.additional_ports {
            fill_str(&mut additional_port.protocol, DEFAULTS.additional_port_protocol);
            if additional_port.visibility.is_none() {
                additional_port.visibility = visibility.clone();
            }
        }
    }

    fn set_sidecar_defaults(&mut self) {
        fill_str(&mut self.sidecar.sidecar_type, DEFAULTS.sidecar_type);
        fill_str(
            &mut self.sidecar.health_check_path,
            &self.container.readiness_probe.path,
        );
        fill_sidecar(&mut self.sidecar);

        for sidecar in &mut self.sidecars {
            fill_sidecar(sidecar);
        }
    }

    /// Fill namespace and image repository from the cluster credential
    pub fn set_defaults_from_credentials(&mut self, credential: &CredentialRecord) {
        let properties = &credential.additional_properties;
        fill_str(&mut self.namespace, &properties.default_namespace);
        fill_str(&mut self.container.image_repository, &properties.project);
    }
}
