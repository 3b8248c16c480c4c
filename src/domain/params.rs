//! Release parameter tree
//!
//! The nested configuration object handed to the resolver by the loader.
//! Every field may be absent in the source file; absent fields hold their
//! type's zero value until the defaulting resolver fills them.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Environment variables keyed by name; values are kept as raw YAML scalars
pub type EnvironmentVariables = BTreeMap<String, serde_yaml::Value>;

/// Sidecar type that proxies requests and receives request-shaping settings
pub const OPENRESTY_SIDECAR: &str = "openresty";

/// Sidecar type that proxies connections to a Cloud SQL instance
pub const CLOUDSQLPROXY_SIDECAR: &str = "cloudsqlproxy";

/// Release action requested by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    DeploySimple,
    DeployCanary,
    DeployStable,
    RollbackCanary,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeploySimple => "deploy-simple",
            Self::DeployCanary => "deploy-canary",
            Self::DeployStable => "deploy-stable",
            Self::RollbackCanary => "rollback-canary",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network exposure of the deployed service
///
/// Unrecognised values are preserved so validation can report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Visibility {
    Private,
    Iap,
    Public,
    PublicWhitelist,
    Other(String),
}

impl Visibility {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Private => "private",
            Self::Iap => "iap",
            Self::Public => "public",
            Self::PublicWhitelist => "public-whitelist",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for Visibility {
    fn from(value: String) -> Self {
        match value.as_str() {
            "private" => Self::Private,
            "iap" => Self::Iap,
            "public" => Self::Public,
            "public-whitelist" => Self::PublicWhitelist,
            _ => Self::Other(value),
        }
    }
}

impl From<Visibility> for String {
    fn from(value: Visibility) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of workload; workers receive no ingress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkloadType {
    Api,
    Web,
    Worker,
    Other(String),
}

impl WorkloadType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Api => "api",
            Self::Web => "web",
            Self::Worker => "worker",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for WorkloadType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "api" => Self::Api,
            "web" => Self::Web,
            "worker" => Self::Worker,
            _ => Self::Other(value),
        }
    }
}

impl From<WorkloadType> for String {
    fn from(value: WorkloadType) -> Self {
        value.as_str().to_string()
    }
}

/// Treat a missing, null or blank string as unset
fn non_empty<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()).map(T::from))
}

/// Accept `true`, `"true"` and other scalars as their string form
fn optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_yaml::Value::Null) => None,
        Some(serde_yaml::Value::Bool(b)) => Some(b.to_string()),
        Some(serde_yaml::Value::Number(n)) => Some(n.to_string()),
        Some(serde_yaml::Value::String(s)) => Some(s),
        Some(other) => Some(serde_yaml::to_string(&other).unwrap_or_default().trim().to_string()),
    })
}

/// Full parameter tree for a single release
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Params {
    pub action: Option<Action>,
    pub app: String,
    pub namespace: String,
    pub credentials: String,
    #[serde(deserialize_with = "non_empty")]
    pub visibility: Option<Visibility>,
    #[serde(rename = "type", deserialize_with = "non_empty")]
    pub workload_type: Option<WorkloadType>,
    pub labels: BTreeMap<String, String>,

    pub hosts: Vec<String>,
    pub internal_hosts: Vec<String>,
    pub basepath: String,
    #[serde(rename = "whitelist")]
    pub whitelisted_ips: Vec<String>,
    #[serde(rename = "trustedIPRanges")]
    pub trusted_ip_ranges: Vec<String>,

    pub autoscale: AutoscaleParams,
    pub container: ContainerParams,
    pub sidecar: SidecarParams,
    pub sidecars: Vec<SidecarParams>,

    pub secrets: SecretsParams,
    pub configs: ConfigsParams,
    pub manifests: ManifestsParams,
    pub volume_mounts: Vec<VolumeMountParams>,

    pub request: RequestParams,
    pub rolling_update: RollingUpdateParams,

    pub chaos_proof: bool,
    pub use_google_cloud_credentials: bool,
    pub enable_payload_logging: bool,
    pub build_version: String,
    pub schedule: String,
}

impl Params {
    pub fn is_worker(&self) -> bool {
        matches!(self.workload_type, Some(WorkloadType::Worker))
    }

    pub fn is_scheduled(&self) -> bool {
        !self.schedule.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoscaleParams {
    #[serde(rename = "min")]
    pub min_replicas: u32,
    #[serde(rename = "max")]
    pub max_replicas: u32,
    #[serde(rename = "cpu")]
    pub cpu_percentage: u32,
}

/// Request and limit quantities, e.g. `100m` or `128Mi`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceParams {
    pub request: String,
    pub limit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerParams {
    #[serde(rename = "repository")]
    pub image_repository: String,
    #[serde(rename = "name")]
    pub image_name: String,
    #[serde(rename = "tag")]
    pub image_tag: String,
    pub port: u32,

    pub cpu: ResourceParams,
    pub memory: ResourceParams,

    #[serde(rename = "env")]
    pub environment_variables: EnvironmentVariables,

    #[serde(rename = "liveness")]
    pub liveness_probe: ProbeParams,
    #[serde(rename = "readiness")]
    pub readiness_probe: ProbeParams,
    pub metrics: MetricsParams,
    pub lifecycle: LifecycleParams,
    pub additional_ports: Vec<AdditionalPortParams>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProbeParams {
    pub path: String,
    pub port: u32,
    #[serde(rename = "delay")]
    pub initial_delay_seconds: u32,
    #[serde(rename = "timeout")]
    pub timeout_seconds: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsParams {
    /// Raw scrape flag; must be `"true"` or `"false"` once resolved
    #[serde(deserialize_with = "optional_scalar")]
    pub scrape: Option<String>,
    pub path: String,
    pub port: u32,
}

impl MetricsParams {
    /// Parsed scrape flag, `None` when unset or not a boolean literal
    pub fn scrape_enabled(&self) -> Option<bool> {
        self.scrape.as_deref().and_then(|s| s.parse::<bool>().ok())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LifecycleParams {
    #[serde(rename = "prestopsleep")]
    pub prestop_sleep: Option<bool>,
    #[serde(rename = "prestopsleepseconds")]
    pub prestop_sleep_seconds: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalPortParams {
    pub name: String,
    pub port: u32,
    pub protocol: String,
    #[serde(deserialize_with = "non_empty")]
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SidecarParams {
    #[serde(rename = "type")]
    pub sidecar_type: String,
    pub image: String,
    #[serde(rename = "healthcheckpath")]
    pub health_check_path: String,
    #[serde(rename = "dbinstanceconnectionname")]
    pub db_instance_connection_name: String,
    #[serde(rename = "sqlproxyport")]
    pub sql_proxy_port: u32,
    pub cpu: ResourceParams,
    pub memory: ResourceParams,
    #[serde(rename = "env")]
    pub environment_variables: EnvironmentVariables,
}

impl SidecarParams {
    pub fn is_openresty(&self) -> bool {
        self.sidecar_type == OPENRESTY_SIDECAR
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecretsParams {
    pub keys: BTreeMap<String, String>,
    pub mount_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigsParams {
    pub files: Vec<String>,
    #[serde(rename = "inline")]
    pub inline_files: BTreeMap<String, String>,
    pub mount_path: String,

    /// Filled by the loader from `files` and `inline_files`
    #[serde(skip)]
    pub rendered_file_content: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestsParams {
    /// Override template paths
    pub files: Vec<String>,
    pub data: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeMountParams {
    pub name: String,
    pub mount_path: String,
    pub volume: serde_yaml::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestParams {
    pub timeout: String,
    pub max_body_size: String,
    pub client_body_buffer_size: String,
    pub proxy_buffer_size: String,
    pub proxy_buffers_number: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RollingUpdateParams {
    pub max_surge: String,
    pub max_unavailable: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_minimal_yaml() {
        let yaml = r#"
app: myapp
visibility: public
container:
  repository: estafette
  port: 8080
  cpu:
    request: 100m
"#;
        let params: Params = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(params.app, "myapp");
        assert_eq!(params.visibility, Some(Visibility::Public));
        assert_eq!(params.container.image_repository, "estafette");
        assert_eq!(params.container.port, 8080);
        assert_eq!(params.container.cpu.request, "100m");
        assert!(params.container.cpu.limit.is_empty());
        assert_eq!(params.action, None);
    }

    #[test]
    fn test_blank_visibility_is_unset() {
        let params: Params = serde_yaml::from_str("visibility: ''").unwrap();
        assert_eq!(params.visibility, None);
    }

    #[test]
    fn test_unknown_visibility_is_preserved() {
        let params: Params = serde_yaml::from_str("visibility: everyone").unwrap();
        assert_eq!(params.visibility, Some(Visibility::Other("everyone".to_string())));
    }

    #[test]
    fn test_action_is_kebab_case() {
        let params: Params = serde_yaml::from_str("action: deploy-canary").unwrap();
        assert_eq!(params.action, Some(Action::DeployCanary));
        assert!(serde_yaml::from_str::<Params>("action: explode").is_err());
    }

    #[test]
    fn test_scrape_accepts_bool_and_string() {
        let params: Params = serde_yaml::from_str("container:\n  metrics:\n    scrape: false").unwrap();
        assert_eq!(params.container.metrics.scrape.as_deref(), Some("false"));
        assert_eq!(params.container.metrics.scrape_enabled(), Some(false));

        let params: Params =
            serde_yaml::from_str("container:\n  metrics:\n    scrape: \"yessir\"").unwrap();
        assert_eq!(params.container.metrics.scrape_enabled(), None);
    }

    #[test]
    fn test_worker_type() {
        let params: Params = serde_yaml::from_str("type: worker").unwrap();
        assert!(params.is_worker());
        let params: Params = serde_yaml::from_str("type: api").unwrap();
        assert!(!params.is_worker());
    }
}
