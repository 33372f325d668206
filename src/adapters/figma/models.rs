//! Figma REST API response models
//!
//! Only the fields Figport reads are modelled explicitly. The document tree
//! and variable collections are kept as raw JSON; node traversal happens
//! outside this crate.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Response of `GET /v1/files/{key}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetFileResponse {
    pub name: String,

    /// Changes whenever the file is edited; used to detect stale exports
    pub version: String,

    #[serde(default)]
    pub last_modified: Option<String>,

    #[serde(default)]
    pub thumbnail_url: Option<String>,

    #[serde(default)]
    pub document: serde_json::Value,
}

/// Response of `GET /v1/images/{key}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetImagesResponse {
    #[serde(default)]
    pub err: Option<String>,

    /// Node id to rendered URL; `None` when the node could not be rendered
    #[serde(default)]
    pub images: HashMap<String, Option<String>>,

    #[serde(default)]
    pub status: Option<u16>,
}

impl GetImagesResponse {
    /// Rendered URL for a node, if the API produced one
    pub fn url_for(&self, node_id: &str) -> Option<&str> {
        self.images.get(node_id).and_then(|url| url.as_deref())
    }
}

/// Response of `GET /v1/files/{key}/variables/local`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetLocalVariablesResponse {
    #[serde(default)]
    pub status: Option<u16>,

    #[serde(default)]
    pub error: bool,

    #[serde(default)]
    pub meta: LocalVariablesMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalVariablesMeta {
    #[serde(default)]
    pub variables: HashMap<String, serde_json::Value>,

    #[serde(default)]
    pub variable_collections: HashMap<String, serde_json::Value>,
}

/// Error body returned by the API on failure
///
/// The API is inconsistent about the message field name, so both are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: Option<u16>,

    #[serde(default)]
    pub err: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<&str> {
        self.err.as_deref().or(self.message.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_file_response_deserialization() {
        let json = r#"{
            "name": "Design System",
            "version": "4567",
            "lastModified": "2024-03-01T10:00:00Z",
            "thumbnailUrl": "https://example.com/thumb.png",
            "document": {"id": "0:0", "type": "DOCUMENT"}
        }"#;

        let response: GetFileResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.name, "Design System");
        assert_eq!(response.version, "4567");
        assert_eq!(
            response.last_modified.as_deref(),
            Some("2024-03-01T10:00:00Z")
        );
        assert_eq!(response.document["type"], "DOCUMENT");
    }

    #[test]
    fn test_get_images_response_null_urls() {
        let json = r#"{"err": null, "images": {"1:2": "https://cdn/1.png", "1:3": null}}"#;

        let response: GetImagesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.url_for("1:2"), Some("https://cdn/1.png"));
        assert_eq!(response.url_for("1:3"), None);
        assert_eq!(response.url_for("9:9"), None);
    }

    #[test]
    fn test_local_variables_response() {
        let json = r#"{
            "status": 200,
            "error": false,
            "meta": {
                "variables": {"VariableID:1": {"name": "primary"}},
                "variableCollections": {}
            }
        }"#;

        let response: GetLocalVariablesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.meta.variables.len(), 1);
        assert!(response.meta.variable_collections.is_empty());
    }

    #[test]
    fn test_error_body_message_fallback() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"status": 429, "err": "Rate limit exceeded"}"#).unwrap();
        assert_eq!(body.message(), Some("Rate limit exceeded"));

        let body: ErrorBody = serde_json::from_str(r#"{"message": "Not found"}"#).unwrap();
        assert_eq!(body.message(), Some("Not found"));
    }
}
