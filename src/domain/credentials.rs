//! Cluster credential records
//!
//! Supplied by the credential provider; read-only for the duration of a
//! resolution.

use serde::{Deserialize, Serialize};

use crate::config::defaults::CREDENTIAL_TYPE;
use crate::error::CredentialError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CredentialRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub credential_type: String,
    pub additional_properties: CredentialProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CredentialProperties {
    pub default_namespace: String,
    pub project: String,
}

/// Find the cluster credential with the given name
pub fn find_credential<'a>(
    records: &'a [CredentialRecord],
    name: &str,
) -> Result<&'a CredentialRecord, CredentialError> {
    let record = records
        .iter()
        .find(|r| r.name == name)
        .ok_or_else(|| CredentialError::NotFound {
            name: name.to_string(),
            available: records.len(),
        })?;

    if record.credential_type != CREDENTIAL_TYPE {
        return Err(CredentialError::WrongType {
            name: name.to_string(),
            actual: record.credential_type.clone(),
            expected: CREDENTIAL_TYPE.to_string(),
        });
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, credential_type: &str) -> CredentialRecord {
        CredentialRecord {
            name: name.to_string(),
            credential_type: credential_type.to_string(),
            additional_properties: CredentialProperties::default(),
        }
    }

    #[test]
    fn test_find_credential_by_name() {
        let records = vec![
            record("gke-staging", "kubernetes-engine"),
            record("gke-production", "kubernetes-engine"),
        ];
        let found = find_credential(&records, "gke-production").unwrap();
        assert_eq!(found.name, "gke-production");
    }

    #[test]
    fn test_missing_credential() {
        let records = vec![record("gke-staging", "kubernetes-engine")];
        let err = find_credential(&records, "gke-production").unwrap_err();
        assert!(matches!(err, CredentialError::NotFound { available: 1, .. }));
    }

    #[test]
    fn test_wrong_credential_type() {
        let records = vec![record("gke-production", "container-registry")];
        let err = find_credential(&records, "gke-production").unwrap_err();
        assert!(matches!(err, CredentialError::WrongType { .. }));
    }

    #[test]
    fn test_parses_json_record() {
        let json = r#"{
            "name": "gke-production",
            "type": "kubernetes-engine",
            "additionalProperties": { "defaultNamespace": "mynamespace", "project": "myproject" }
        }"#;
        let record: CredentialRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.additional_properties.default_namespace, "mynamespace");
        assert_eq!(record.additional_properties.project, "myproject");
    }
}
