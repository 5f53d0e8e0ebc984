//! Request bodies for creating secrets and variables.
//!
//! The Dependabot organization API takes `selected_repository_ids` as strings
//! while Actions and Codespaces take integers. [`SelectedRepositoryIds`] keeps
//! that difference in one place.

use serde::Serialize;

use crate::errors::SchemaError;
use crate::models::Provider;

/// Repository IDs in the shape the provider's API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SelectedRepositoryIds {
    Integers(Vec<u64>),
    Strings(Vec<String>),
}

impl SelectedRepositoryIds {
    /// Validate `ids` and shape them for `provider`. Never emits an ID that was
    /// not a number in the input.
    pub fn for_provider(provider: Provider, name: &str, ids: &[String]) -> Result<Self, SchemaError> {
        let numeric = parse_repository_ids(name, ids)?;
        Ok(match provider {
            Provider::Dependabot => {
                SelectedRepositoryIds::Strings(numeric.iter().map(u64::to_string).collect())
            }
            Provider::Actions | Provider::Codespaces => SelectedRepositoryIds::Integers(numeric),
        })
    }
}

/// Parse a `selected` ID list. Empty lists and non-numeric entries are errors.
pub fn parse_repository_ids(name: &str, ids: &[String]) -> Result<Vec<u64>, SchemaError> {
    let ids: Vec<&str> = ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .collect();

    if ids.is_empty() {
        return Err(SchemaError::NoSelectedRepositories(name.to_string()));
    }

    ids.into_iter()
        .map(|id| match id.parse::<u64>() {
            Ok(0) | Err(_) => Err(SchemaError::InvalidRepositoryId {
                name: name.to_string(),
                value: id.to_string(),
            }),
            Ok(n) => Ok(n),
        })
        .collect()
}

/// Body of `PUT .../secrets/{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretPayload {
    pub encrypted_value: String,
    pub key_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_repository_ids: Option<SelectedRepositoryIds>,
}

impl SecretPayload {
    /// Repository secrets carry only the ciphertext and key id.
    pub fn repository(key_id: String, encrypted_value: String) -> Self {
        Self {
            encrypted_value,
            key_id,
            visibility: None,
            selected_repository_ids: None,
        }
    }

    /// Organization secret body. Only `selected` access carries an ID array.
    pub fn organization(
        access: &str,
        selected: Option<SelectedRepositoryIds>,
        key_id: String,
        encrypted_value: String,
    ) -> Self {
        Self {
            encrypted_value,
            key_id,
            visibility: Some(access.to_string()),
            selected_repository_ids: selected,
        }
    }
}

/// Body of `POST .../actions/variables`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariablePayload {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_repository_ids: Option<Vec<u64>>,
}

impl VariablePayload {
    pub fn repository(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            visibility: None,
            selected_repository_ids: None,
        }
    }

    pub fn organization(name: &str, value: &str, access: &str, selected: Option<Vec<u64>>) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            visibility: Some(access.to_string()),
            selected_repository_ids: selected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_dependabot_ids_serialize_as_strings() {
        let selected =
            SelectedRepositoryIds::for_provider(Provider::Dependabot, "S", &ids(&["1234", "5678"]))
                .unwrap();
        assert_eq!(serde_json::to_value(&selected).unwrap(), json!(["1234", "5678"]));
    }

    #[test]
    fn test_actions_and_codespaces_ids_serialize_as_integers() {
        for provider in [Provider::Actions, Provider::Codespaces] {
            let selected =
                SelectedRepositoryIds::for_provider(provider, "S", &ids(&["1234", "5678"])).unwrap();
            assert_eq!(serde_json::to_value(&selected).unwrap(), json!([1234, 5678]));
        }
    }

    #[test]
    fn test_non_numeric_or_empty_ids_are_rejected() {
        assert!(matches!(
            parse_repository_ids("S", &ids(&["12", "abc"])),
            Err(SchemaError::InvalidRepositoryId { value, .. }) if value == "abc"
        ));
        assert!(matches!(
            parse_repository_ids("S", &ids(&[""])),
            Err(SchemaError::NoSelectedRepositories(_))
        ));
        assert!(matches!(
            parse_repository_ids("S", &ids(&["0"])),
            Err(SchemaError::InvalidRepositoryId { .. })
        ));
    }

    #[test]
    fn test_whole_org_payload_has_no_repository_field() {
        let payload = SecretPayload::organization(
            "private",
            None,
            "k1".to_string(),
            "enc".to_string(),
        );
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"encrypted_value": "enc", "key_id": "k1", "visibility": "private"})
        );
    }

    #[test]
    fn test_repository_payload_shape() {
        let payload = SecretPayload::repository("k1".to_string(), "enc".to_string());
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"encrypted_value": "enc", "key_id": "k1"})
        );

        let variable = VariablePayload::repository("NAME", "value");
        assert_eq!(
            serde_json::to_value(&variable).unwrap(),
            json!({"name": "NAME", "value": "value"})
        );
    }
}
