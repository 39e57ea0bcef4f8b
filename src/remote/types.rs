//! Wire types for the artifact service.

use serde::{Deserialize, Serialize};

/// Response of `GET <artifactsUrl>`: the artifacts of one workflow run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactList {
    /// Number of artifacts the service reports.
    pub count: usize,
    /// The artifacts themselves.
    #[serde(default)]
    pub value: Vec<ArtifactEntry>,
}

impl ArtifactList {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.value.is_empty()
    }

    /// Finds an artifact by exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ArtifactEntry> {
        self.value.iter().find(|entry| entry.name == name)
    }
}

/// One artifact of the run and the container holding its files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactEntry {
    pub name: String,
    pub file_container_resource_url: String,
}

/// Kind of a container entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    File,
    Folder,
}

/// One entry of an artifact container, as listed by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerItem {
    /// `<artifact name>/<relative path>`.
    pub path: String,
    pub item_type: ItemType,
    /// Download URL; empty for folders.
    #[serde(default)]
    pub content_location: String,
}

/// Response of `GET <containerUrl>?itemPath=<name>`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ContainerItemList {
    #[serde(default)]
    pub(crate) value: Vec<ContainerItem>,
}

/// Body of the container creation request.
#[derive(Debug, Serialize)]
pub(crate) struct CreateArtifactRequest<'a> {
    #[serde(rename = "Type")]
    pub(crate) kind: &'static str,
    #[serde(rename = "Name")]
    pub(crate) name: &'a str,
}

/// Response of the container creation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateArtifactResponse {
    #[serde(default)]
    pub(crate) file_container_resource_url: Option<String>,
}

/// Body of the size finalization request.
#[derive(Debug, Serialize)]
pub(crate) struct ArtifactSizeUpdate {
    pub(crate) size: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_list_parses_service_shape() {
        let body = r#"{"count":2,"value":[
            {"name":"logs","fileContainerResourceUrl":"https://store.test/c/1","type":"actions_storage"},
            {"name":"dist","fileContainerResourceUrl":"https://store.test/c/2"}
        ]}"#;
        let list: ArtifactList = serde_json::from_str(body).unwrap();
        assert_eq!(list.count, 2);
        assert_eq!(list.find("dist").unwrap().file_container_resource_url, "https://store.test/c/2");
        assert!(list.find("missing").is_none());
    }

    #[test]
    fn test_artifact_list_zero_is_empty() {
        let list: ArtifactList = serde_json::from_str(r#"{"count":0,"value":[]}"#).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_container_item_parses_file_and_folder() {
        let body = r#"{"value":[
            {"path":"logs","itemType":"folder"},
            {"path":"logs/a.txt","itemType":"file","contentLocation":"https://store.test/f/a"}
        ]}"#;
        let list: ContainerItemList = serde_json::from_str(body).unwrap();
        assert_eq!(list.value[0].item_type, ItemType::Folder);
        assert_eq!(list.value[0].content_location, "");
        assert_eq!(list.value[1].item_type, ItemType::File);
        assert_eq!(list.value[1].content_location, "https://store.test/f/a");
    }

    #[test]
    fn test_unknown_item_type_is_rejected() {
        let body = r#"{"value":[{"path":"x","itemType":"symlink"}]}"#;
        assert!(serde_json::from_str::<ContainerItemList>(body).is_err());
    }

    #[test]
    fn test_create_request_uses_service_field_names() {
        let json = serde_json::to_value(CreateArtifactRequest {
            kind: "actions_storage",
            name: "dist",
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"Type": "actions_storage", "Name": "dist"}));
    }
}
