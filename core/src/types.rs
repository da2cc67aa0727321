//! Typed views of common catalog payloads.
//!
//! # Design
//! The catalog adds fields over time, so each DTO declares the fields callers
//! commonly need and keeps everything else in a flattened `extra` map.
//! Missing fields default instead of failing. Use with
//! [`SpigetClient::fetch`](crate::SpigetClient::fetch) or
//! [`Payload::decode`](crate::Payload::decode).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reference to another entity by id, e.g. `"author": {"id": 1}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdReference {
    pub id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    #[serde(default)]
    pub url: String,
    /// Base64 image data.
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub average: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: Option<Icon>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceFile {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub size: f64,
    #[serde(default)]
    pub size_unit: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub external_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub tested_versions: Vec<String>,
    #[serde(default)]
    pub rating: Option<Rating>,
    /// Unix seconds.
    #[serde(default)]
    pub release_date: i64,
    /// Unix seconds.
    #[serde(default)]
    pub update_date: i64,
    #[serde(default)]
    pub external: bool,
    #[serde(default)]
    pub premium: bool,
    #[serde(default)]
    pub file: Option<ResourceFile>,
    #[serde(default)]
    pub author: Option<IdReference>,
    #[serde(default)]
    pub category: Option<IdReference>,
    #[serde(default)]
    pub version: Option<IdReference>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceVersion {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub release_date: i64,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    #[serde(default)]
    pub author: Option<IdReference>,
    #[serde(default)]
    pub rating: Option<Rating>,
    /// Base64 encoded.
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub response_message: Option<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub date: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvents {
    #[serde(default)]
    pub events: Vec<String>,
}

/// Returned by webhook registration. `secret` is needed to delete the hook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookRegistration {
    pub id: String,
    pub secret: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookStatus {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub failed_connections: i64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn resource_keeps_unknown_fields() {
        let resource: Resource = serde_json::from_value(json!({
            "id": 1,
            "name": "WorldEdit",
            "testedVersions": ["1.20", "1.21"],
            "file": {"type": ".jar", "size": 4.2, "sizeUnit": "MB", "url": "resources/1/download"},
            "author": {"id": 7},
            "price": 0.0,
            "contributors": "sk89q"
        }))
        .unwrap();
        assert_eq!(resource.name, "WorldEdit");
        assert_eq!(resource.tested_versions, ["1.20", "1.21"]);
        assert_eq!(resource.file.as_ref().map(|f| f.kind.as_str()), Some(".jar"));
        assert_eq!(resource.author, Some(IdReference { id: 7 }));
        assert_eq!(resource.extra.get("contributors"), Some(&json!("sk89q")));
        assert!(!resource.premium);
    }

    #[test]
    fn author_requires_id() {
        assert!(serde_json::from_value::<Author>(json!({"name": "md_5"})).is_err());
        let author: Author = serde_json::from_value(json!({"id": 1, "name": "md_5"})).unwrap();
        assert_eq!(author.icon, None);
    }

    #[test]
    fn webhook_status_is_camel_case() {
        let status: WebhookStatus =
            serde_json::from_value(json!({"status": 1, "failedConnections": 3})).unwrap();
        assert_eq!(status.failed_connections, 3);
    }
}
