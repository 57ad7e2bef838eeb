//! The on-disk dictionary document shape.
//!
//! Every field is optional. Absent fields and explicit `null`s both decode to
//! empty collections; unknown fields are ignored.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DictionaryError;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A whole dictionary document: shared core plus per-vertical domains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDictionary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub core: RawCore,
    /// Domains keyed by name. A `null` domain is skipped.
    #[serde(default, deserialize_with = "null_as_default")]
    pub domains: BTreeMap<String, Option<RawDomain>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCore {
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: RawKeywords,
    /// Verb name to permission kind (`read`, `write`, `execute`, ...).
    #[serde(default, deserialize_with = "null_as_default")]
    pub verb_permissions: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationship_types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawKeywords {
    #[serde(default, deserialize_with = "null_as_default")]
    pub reserved: Vec<String>,
}

/// One vertical's vocabulary and permission model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDomain {
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data_objects: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verbs: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actors: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationships: Vec<String>,
    /// Actor name to the verbs it may perform.
    #[serde(default, deserialize_with = "null_as_default")]
    pub actor_verbs: BTreeMap<String, Vec<String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actor_data_perms: BTreeMap<String, RawDataPerms>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub doc_types_by_jurisdiction: BTreeMap<String, Vec<String>>,
}

/// Read and write lists for one actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDataPerms {
    #[serde(default, deserialize_with = "null_as_default")]
    pub read: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub write: Vec<String>,
}

impl RawDictionary {
    /// Decode a dictionary from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, DictionaryError> {
        Self::decode(json, "<inline>")
    }

    /// Read and decode a dictionary file.
    pub fn from_path(path: &Path) -> Result<Self, DictionaryError> {
        let json = std::fs::read_to_string(path).map_err(|source| DictionaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(&json, &path.display().to_string())
    }

    fn decode(json: &str, origin: &str) -> Result<Self, DictionaryError> {
        serde_json::from_str(json).map_err(|source| DictionaryError::Json {
            origin: origin.to_string(),
            source,
        })
    }

    /// Domains that are present (non-null), in name order.
    pub fn domains(&self) -> impl Iterator<Item = (&str, &RawDomain)> {
        self.domains
            .iter()
            .filter_map(|(name, domain)| domain.as_ref().map(|d| (name.as_str(), d)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_empty_dictionary() {
        let dict = RawDictionary::from_json_str("{}").expect("valid");
        assert_eq!(dict, RawDictionary::default());
    }

    #[test]
    fn nulls_decode_as_empty() {
        let dict = RawDictionary::from_json_str(
            r#"{
                "core": { "keywords": null, "verbPermissions": null, "relationshipTypes": null },
                "domains": {
                    "kyc": { "actors": null, "actorVerbs": { "Analyst": ["Review"] }, "actorDataPerms": { "Analyst": { "read": null } } },
                    "retired": null
                }
            }"#,
        )
        .expect("valid");

        assert!(dict.core.keywords.reserved.is_empty());
        let domains: Vec<_> = dict.domains().map(|(name, _)| name).collect();
        assert_eq!(domains, ["kyc"]);
        let (_, kyc) = dict.domains().next().expect("kyc domain");
        assert!(kyc.actors.is_empty());
        assert_eq!(kyc.actor_verbs["Analyst"], ["Review"]);
        assert!(kyc.actor_data_perms["Analyst"].read.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let dict = RawDictionary::from_json_str(r#"{ "version": "1.3.0", "domains": {} }"#);
        assert!(dict.is_ok());
    }

    #[test]
    fn wrong_shape_is_a_decode_error() {
        let err = RawDictionary::from_json_str(r#"{ "domains": [] }"#).expect_err("array is not a map");
        assert!(matches!(err, DictionaryError::Json { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = RawDictionary::from_path(Path::new("/definitely/not/here.json"))
            .expect_err("missing file");
        assert!(matches!(err, DictionaryError::Io { .. }));
    }
}
