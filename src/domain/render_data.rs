//! Rendering data
//!
//! Flattens a resolved parameter tree into the structure the template
//! renderer consumes. Every conditional and derived value is materialised
//! here, so templates never have to distinguish "unset" from "empty".

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::config::defaults::{GOOGLE_CREDENTIALS_ENV, GOOGLE_CREDENTIALS_PATH};

use super::params::{
    Action, EnvironmentVariables, Params, RequestParams, SidecarParams, Visibility,
};

/// Kubernetes service type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServiceType {
    #[serde(rename = "ClusterIP")]
    ClusterIp,
    NodePort,
    LoadBalancer,
}

/// Exposure settings derived from the visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VisibilityBundle {
    service_type: ServiceType,
    use_nginx_ingress: bool,
    use_gce_ingress: bool,
    use_dns_annotations_on_ingress: bool,
    use_dns_annotations_on_service: bool,
    limit_trusted_ip_ranges: bool,
    uses_whitelist: bool,
}

impl VisibilityBundle {
    fn for_visibility(visibility: Option<&Visibility>) -> Self {
        match visibility {
            Some(Visibility::Iap) => Self {
                service_type: ServiceType::NodePort,
                use_nginx_ingress: false,
                use_gce_ingress: true,
                use_dns_annotations_on_ingress: true,
                use_dns_annotations_on_service: false,
                limit_trusted_ip_ranges: false,
                uses_whitelist: false,
            },
            Some(Visibility::PublicWhitelist) => Self {
                service_type: ServiceType::ClusterIp,
                use_nginx_ingress: true,
                use_gce_ingress: false,
                use_dns_annotations_on_ingress: true,
                use_dns_annotations_on_service: false,
                limit_trusted_ip_ranges: false,
                uses_whitelist: true,
            },
            Some(Visibility::Public) => Self {
                service_type: ServiceType::LoadBalancer,
                use_nginx_ingress: false,
                use_gce_ingress: false,
                use_dns_annotations_on_ingress: false,
                use_dns_annotations_on_service: true,
                limit_trusted_ip_ranges: true,
                uses_whitelist: false,
            },
            // private, and anything the validator would have rejected
            Some(Visibility::Private) | Some(Visibility::Other(_)) | None => Self {
                service_type: ServiceType::ClusterIp,
                use_nginx_ingress: true,
                use_gce_ingress: false,
                use_dns_annotations_on_ingress: true,
                use_dns_annotations_on_service: false,
                limit_trusted_ip_ranges: false,
                uses_whitelist: false,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeData {
    pub path: String,
    pub port: u32,
    pub initial_delay_seconds: u32,
    pub timeout_seconds: u32,
    pub include_on_container: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsData {
    pub scrape: bool,
    pub path: String,
    pub port: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerData {
    pub repository: String,
    pub name: String,
    pub tag: String,
    pub port: u32,

    pub cpu_request: String,
    pub cpu_limit: String,
    pub memory_request: String,
    pub memory_limit: String,

    pub environment_variables: EnvironmentVariables,

    pub liveness: ProbeData,
    pub readiness: ProbeData,
    pub metrics: MetricsData,

    pub use_lifecycle_pre_stop_sleep_command: bool,
    pub pre_stop_sleep_seconds: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidecarData {
    #[serde(rename = "type")]
    pub sidecar_type: String,
    pub image: String,
    pub health_check_path: String,
    pub db_instance_connection_name: String,
    pub sql_proxy_port: u32,
    pub cpu_request: String,
    pub cpu_limit: String,
    pub memory_request: String,
    pub memory_limit: String,
    pub environment_variables: EnvironmentVariables,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalPortData {
    pub name: String,
    pub port: u32,
    pub protocol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMountData {
    pub name: String,
    pub mount_path: String,
    #[serde(rename = "volumeYAML")]
    pub volume_yaml: String,
}

/// Render-ready data for one release
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderingData {
    pub build_version: String,

    pub name: String,
    pub name_with_track: String,
    pub namespace: String,
    pub schedule: String,
    pub labels: BTreeMap<String, String>,
    pub app_label_selector: String,

    pub include_track_label: bool,
    pub track_label: String,
    #[serde(rename = "includeReleaseIDLabel")]
    pub include_release_id_label: bool,
    #[serde(rename = "releaseIDLabel")]
    pub release_id_label: String,

    pub hosts: Vec<String>,
    pub hosts_joined: String,
    pub internal_hosts: Vec<String>,
    pub internal_hosts_joined: String,
    pub ingress_path: String,
    pub internal_ingress_path: String,

    pub service_type: ServiceType,
    pub use_nginx_ingress: bool,
    pub use_gce_ingress: bool,
    pub use_dns_annotations_on_ingress: bool,
    pub use_dns_annotations_on_service: bool,
    pub limit_trusted_ip_ranges: bool,
    pub override_default_whitelist: bool,
    pub nginx_ingress_whitelist: String,
    #[serde(rename = "trustedIPRanges")]
    pub trusted_ip_ranges: Vec<String>,

    pub nginx_ingress_proxy_connect_timeout: String,
    pub nginx_ingress_proxy_send_timeout: String,
    pub nginx_ingress_proxy_read_timeout: String,
    pub nginx_ingress_proxy_body_size: String,
    pub nginx_ingress_client_body_buffer_size: String,
    pub nginx_ingress_proxy_buffer_size: String,
    pub nginx_ingress_proxy_buffers_number: String,

    pub include_replicas: bool,
    pub replicas: u32,
    pub min_replicas: u32,
    pub max_replicas: u32,
    #[serde(rename = "targetCPUPercentage")]
    pub target_cpu_percentage: u32,

    pub secrets: BTreeMap<String, String>,
    pub mount_application_secrets: bool,
    pub secret_mount_path: String,
    pub mount_configmap: bool,
    pub config_mount_path: String,
    pub configmap_files: BTreeMap<String, String>,

    pub mount_payload_logging: bool,
    pub add_safe_to_evict_annotation: bool,
    pub rolling_update_max_surge: String,
    pub rolling_update_max_unavailable: String,
    pub prefer_preemptibles: bool,
    pub mount_service_account_secret: bool,

    pub container: ContainerData,
    pub sidecars: Vec<SidecarData>,
    pub manifest_data: BTreeMap<String, serde_yaml::Value>,

    pub additional_volume_mounts: Vec<VolumeMountData>,
    pub mount_additional_volumes: bool,
    pub additional_container_ports: Vec<AdditionalPortData>,
    pub additional_service_ports: Vec<AdditionalPortData>,
}

/// Set an environment variable unless the user already did
fn add_environment_variable_if_not_set(
    environment_variables: &mut EnvironmentVariables,
    name: &str,
    value: &str,
) {
    environment_variables
        .entry(name.to_string())
        .or_insert_with(|| serde_yaml::Value::String(value.to_string()));
}

/// Append `/` unless the path already ends in `/` or `*`; GCE ingresses also need a trailing `*`
fn normalize_ingress_path(path: &str, glob: bool) -> String {
    let mut path = path.to_string();
    if !path.ends_with('/') && !path.ends_with('*') {
        path.push('/');
    }
    if glob && !path.ends_with('*') {
        path.push('*');
    }
    path
}

/// Map a sidecar's parameters; openresty sidecars also receive the request shaping settings
pub fn build_sidecar(sidecar: &SidecarParams, request: &RequestParams) -> SidecarData {
    let mut built = SidecarData {
        sidecar_type: sidecar.sidecar_type.clone(),
        image: sidecar.image.clone(),
        health_check_path: sidecar.health_check_path.clone(),
        db_instance_connection_name: sidecar.db_instance_connection_name.clone(),
        sql_proxy_port: sidecar.sql_proxy_port,
        cpu_request: sidecar.cpu.request.clone(),
        cpu_limit: sidecar.cpu.limit.clone(),
        memory_request: sidecar.memory.request.clone(),
        memory_limit: sidecar.memory.limit.clone(),
        environment_variables: sidecar.environment_variables.clone(),
    };

    if sidecar.is_openresty() {
        let buffers_number = request.proxy_buffers_number.to_string();
        let injected = [
            ("SEND_TIMEOUT", request.timeout.as_str()),
            ("CLIENT_BODY_TIMEOUT", request.timeout.as_str()),
            ("CLIENT_HEADER_TIMEOUT", request.timeout.as_str()),
            ("PROXY_CONNECT_TIMEOUT", request.timeout.as_str()),
            ("PROXY_SEND_TIMEOUT", request.timeout.as_str()),
            ("PROXY_READ_TIMEOUT", request.timeout.as_str()),
            ("CLIENT_MAX_BODY_SIZE", request.max_body_size.as_str()),
            ("CLIENT_BODY_BUFFER_SIZE", request.client_body_buffer_size.as_str()),
            ("PROXY_BUFFER_SIZE", request.proxy_buffer_size.as_str()),
            ("PROXY_BUFFERS_SIZE", request.proxy_buffer_size.as_str()),
            ("PROXY_BUFFERS_NUMBER", buffers_number.as_str()),
        ];
        for (name, value) in injected {
            add_environment_variable_if_not_set(&mut built.environment_variables, name, value);
        }
    }

    built
}

impl RenderingData {
    /// Build rendering data from a resolved parameter tree
    ///
    /// `current_replicas` is the live replica count (0 if unknown) and
    /// `release_id` the release identifier (empty if none).
    pub fn build(params: &Params, current_replicas: u32, release_id: &str) -> Self {
        let container = &params.container;
        let bundle = VisibilityBundle::for_visibility(params.visibility.as_ref());

        let (name_with_track, track_label) = match params.action {
            Some(Action::DeployCanary) => (format!("{}-canary", params.app), Some("canary")),
            Some(Action::DeployStable) => (format!("{}-stable", params.app), Some("stable")),
            _ => (params.app.clone(), None),
        };

        let mut environment_variables = container.environment_variables.clone();
        if params.use_google_cloud_credentials {
            add_environment_variable_if_not_set(
                &mut environment_variables,
                GOOGLE_CREDENTIALS_ENV,
                GOOGLE_CREDENTIALS_PATH,
            );
        }

        // the openresty sidecar already probes the app on the readiness path
        let readiness_proxied_by_sidecar = params.sidecar.is_openresty()
            && container.readiness_probe.port == container.port
            && container.readiness_probe.path == params.sidecar.health_check_path;

        let container_data = ContainerData {
            repository: container.image_repository.clone(),
            name: container.image_name.clone(),
            tag: container.image_tag.clone(),
            port: container.port,
            cpu_request: container.cpu.request.clone(),
            cpu_limit: container.cpu.limit.clone(),
            memory_request: container.memory.request.clone(),
            memory_limit: container.memory.limit.clone(),
            environment_variables,
            liveness: ProbeData {
                path: container.liveness_probe.path.clone(),
                port: container.liveness_probe.port,
                initial_delay_seconds: container.liveness_probe.initial_delay_seconds,
                timeout_seconds: container.liveness_probe.timeout_seconds,
                include_on_container: true,
            },
            readiness: ProbeData {
                path: container.readiness_probe.path.clone(),
                port: container.readiness_probe.port,
                initial_delay_seconds: container.readiness_probe.initial_delay_seconds,
                timeout_seconds: container.readiness_probe.timeout_seconds,
                include_on_container: !readiness_proxied_by_sidecar,
            },
            metrics: MetricsData {
                scrape: container.metrics.scrape_enabled().unwrap_or(false),
                path: container.metrics.path.clone(),
                port: container.metrics.port,
            },
            use_lifecycle_pre_stop_sleep_command: container
                .lifecycle
                .prestop_sleep
                .unwrap_or_default(),
            pre_stop_sleep_seconds: container.lifecycle.prestop_sleep_seconds.unwrap_or_default(),
        };

        let sidecars = std::iter::once(&params.sidecar)
            .chain(params.sidecars.iter())
            .map(|sidecar| build_sidecar(sidecar, &params.request))
            .collect();

        let mut additional_volume_mounts = Vec::new();
        for volume_mount in &params.volume_mounts {
            match serde_yaml::to_string(&volume_mount.volume) {
                Ok(volume_yaml) => additional_volume_mounts.push(VolumeMountData {
                    name: volume_mount.name.clone(),
                    mount_path: volume_mount.mount_path.clone(),
                    volume_yaml,
                }),
                Err(e) => warn!(
                    "Dropping volume mount '{}': volume cannot be serialized: {}",
                    volume_mount.name, e
                ),
            }
        }

        let mut additional_container_ports = Vec::new();
        let mut additional_service_ports = Vec::new();
        for additional_port in &container.additional_ports {
            let port = AdditionalPortData {
                name: additional_port.name.clone(),
                port: additional_port.port,
                protocol: additional_port.protocol.clone(),
            };
            if additional_port.visibility == params.visibility {
                additional_service_ports.push(port.clone());
            }
            additional_container_ports.push(port);
        }

        let (override_default_whitelist, nginx_ingress_whitelist) = if bundle.uses_whitelist {
            (
                !params.whitelisted_ips.is_empty(),
                params.whitelisted_ips.join(","),
            )
        } else {
            (false, String::new())
        };

        let request = &params.request;

        Self {
            build_version: params.build_version.clone(),

            name: params.app.clone(),
            name_with_track,
            namespace: params.namespace.clone(),
            schedule: params.schedule.clone(),
            labels: params.labels.clone(),
            app_label_selector: params.app.clone(),

            include_track_label: track_label.is_some(),
            track_label: track_label.unwrap_or_default().to_string(),
            include_release_id_label: !release_id.is_empty(),
            release_id_label: release_id.to_string(),

            hosts: params.hosts.clone(),
            hosts_joined: params.hosts.join(","),
            internal_hosts: params.internal_hosts.clone(),
            internal_hosts_joined: params.internal_hosts.join(","),
            ingress_path: normalize_ingress_path(&params.basepath, bundle.use_gce_ingress),
            internal_ingress_path: normalize_ingress_path(&params.basepath, false),

            service_type: bundle.service_type,
            use_nginx_ingress: bundle.use_nginx_ingress,
            use_gce_ingress: bundle.use_gce_ingress,
            use_dns_annotations_on_ingress: bundle.use_dns_annotations_on_ingress,
            use_dns_annotations_on_service: bundle.use_dns_annotations_on_service,
            limit_trusted_ip_ranges: bundle.limit_trusted_ip_ranges,
            override_default_whitelist,
            nginx_ingress_whitelist,
            trusted_ip_ranges: params.trusted_ip_ranges.clone(),

            nginx_ingress_proxy_connect_timeout: request.timeout.clone(),
            nginx_ingress_proxy_send_timeout: request.timeout.clone(),
            nginx_ingress_proxy_read_timeout: request.timeout.clone(),
            nginx_ingress_proxy_body_size: request.max_body_size.clone(),
            nginx_ingress_client_body_buffer_size: request.client_body_buffer_size.clone(),
            nginx_ingress_proxy_buffer_size: request.proxy_buffer_size.clone(),
            nginx_ingress_proxy_buffers_number: request.proxy_buffers_number.to_string(),

            include_replicas: current_replicas > 0,
            replicas: if current_replicas > 0 {
                current_replicas
            } else {
                params.autoscale.min_replicas
            },
            min_replicas: params.autoscale.min_replicas,
            max_replicas: params.autoscale.max_replicas,
            target_cpu_percentage: params.autoscale.cpu_percentage,

            secrets: params.secrets.keys.clone(),
            mount_application_secrets: !params.secrets.keys.is_empty(),
            secret_mount_path: params.secrets.mount_path.clone(),
            mount_configmap: !params.configs.files.is_empty()
                || !params.configs.inline_files.is_empty(),
            config_mount_path: params.configs.mount_path.clone(),
            configmap_files: params.configs.rendered_file_content.clone(),

            mount_payload_logging: params.enable_payload_logging,
            add_safe_to_evict_annotation: params.enable_payload_logging,
            rolling_update_max_surge: params.rolling_update.max_surge.clone(),
            rolling_update_max_unavailable: params.rolling_update.max_unavailable.clone(),
            prefer_preemptibles: params.chaos_proof,
            mount_service_account_secret: params.use_google_cloud_credentials,

            container: container_data,
            sidecars,
            manifest_data: params.manifests.data.clone(),

            mount_additional_volumes: !additional_volume_mounts.is_empty(),
            additional_volume_mounts,
            additional_container_ports,
            additional_service_ports,
        }
    }
}
