//! Static defaults applied by the defaulting resolver.
//!
//! Every literal the resolver can write into a parameter tree lives here so
//! the rules can be audited (and tested) as data.

/// Request/limit pair defaults for one resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDefaults {
    pub request: &'static str,
    pub limit: &'static str,
}

/// Probe defaults (port falls back to the container port)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeDefaults {
    pub path: &'static str,
    pub initial_delay_seconds: u32,
    pub timeout_seconds: u32,
}

/// Complete defaults table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Defaults {
    pub visibility: &'static str,
    pub credentials_prefix: &'static str,
    pub basepath: &'static str,

    pub container_port: u32,
    pub container_cpu: ResourceDefaults,
    pub container_memory: ResourceDefaults,

    pub min_replicas: u32,
    pub max_replicas: u32,
    pub cpu_percentage: u32,

    pub liveness: ProbeDefaults,
    pub readiness: ProbeDefaults,

    pub metrics_path: &'static str,
    pub metrics_scrape: &'static str,

    pub sidecar_type: &'static str,
    pub sidecar_cpu: ResourceDefaults,
    pub sidecar_memory: ResourceDefaults,
    pub openresty_image: &'static str,
    pub cloudsqlproxy_image: &'static str,
    pub cloudsqlproxy_port: u32,

    pub request_timeout: &'static str,
    pub request_max_body_size: &'static str,
    pub request_client_body_buffer_size: &'static str,
    pub request_proxy_buffer_size: &'static str,
    pub request_proxy_buffers_number: u32,

    pub rolling_update_max_surge: &'static str,
    pub rolling_update_max_unavailable: &'static str,

    pub secrets_mount_path: &'static str,
    pub configs_mount_path: &'static str,

    pub additional_port_protocol: &'static str,

    pub prestop_sleep: bool,
    pub prestop_sleep_seconds: u32,
}

pub const DEFAULTS: Defaults = Defaults {
    visibility: "private",
    credentials_prefix: "gke-",
    basepath: "/",

    container_port: 5000,
    container_cpu: ResourceDefaults {
        request: "100m",
        limit: "125m",
    },
    container_memory: ResourceDefaults {
        request: "128Mi",
        limit: "128Mi",
    },

    min_replicas: 3,
    max_replicas: 100,
    cpu_percentage: 80,

    liveness: ProbeDefaults {
        path: "/liveness",
        initial_delay_seconds: 30,
        timeout_seconds: 1,
    },
    readiness: ProbeDefaults {
        path: "/readiness",
        initial_delay_seconds: 0,
        timeout_seconds: 1,
    },

    metrics_path: "/metrics",
    metrics_scrape: "true",

    sidecar_type: "openresty",
    sidecar_cpu: ResourceDefaults {
        request: "10m",
        limit: "50m",
    },
    sidecar_memory: ResourceDefaults {
        request: "10Mi",
        limit: "50Mi",
    },
    openresty_image: "estafette/openresty-sidecar:1.13.6.2-alpine",
    cloudsqlproxy_image: "gcr.io/cloudsql-docker/gce-proxy:1.13",
    cloudsqlproxy_port: 5043,

    request_timeout: "60s",
    request_max_body_size: "128m",
    request_client_body_buffer_size: "8k",
    request_proxy_buffer_size: "4k",
    request_proxy_buffers_number: 4,

    rolling_update_max_surge: "25%",
    rolling_update_max_unavailable: "25%",

    secrets_mount_path: "/secrets",
    configs_mount_path: "/configs",

    additional_port_protocol: "TCP",

    prestop_sleep: true,
    prestop_sleep_seconds: 20,
};

/// Label key that always mirrors the resolved app name
pub const APP_LABEL_KEY: &str = "app";

/// Credential type accepted for cluster access
pub const CREDENTIAL_TYPE: &str = "kubernetes-engine";

/// Mount location of the google service account key
pub const GOOGLE_CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const GOOGLE_CREDENTIALS_PATH: &str = "/gcp-service-account/service-account-key.json";
