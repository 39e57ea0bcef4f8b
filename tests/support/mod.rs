//! Shared helpers for integration tests against a mock artifact service.

#![allow(dead_code)]

pub mod socket_guard;

use std::sync::Arc;
use std::time::Duration;

use artifact_transfer::{
    ArtifactClient, HttpArtifactStore, HttpTimeouts, RuntimeEnvironment, TransferSettings,
};
use serde_json::{Value, json};
use wiremock::MockServer;

/// Run id every mock service is addressed with.
pub const RUN_ID: &str = "4242";

/// Path of the run's artifact collection on the mock service.
pub fn artifacts_path() -> String {
    format!("/_apis/pipelines/workflows/{RUN_ID}/artifacts")
}

/// Runtime environment pointing at `server`.
pub fn environment(server: &MockServer, token: Option<&str>) -> RuntimeEnvironment {
    let base = format!("{}/", server.uri());
    let token = token.map(str::to_string);
    RuntimeEnvironment::from_lookup(|name| match name {
        "ACTIONS_RUNTIME_URL" => Some(base.clone()),
        "ACTIONS_RUNTIME_TOKEN" => token.clone(),
        "GITHUB_RUN_ID" => Some(RUN_ID.to_string()),
        "GITHUB_WORKSPACE" => Some("/unused".to_string()),
        _ => None,
    })
    .unwrap()
}

/// Settings with a millisecond retry delay so retry tests stay fast.
pub fn fast_settings() -> TransferSettings {
    TransferSettings {
        retry_delay: Duration::from_millis(10),
        ..TransferSettings::default()
    }
}

/// Client talking to `server` over HTTP.
pub fn http_client(server: &MockServer, token: Option<&str>) -> ArtifactClient {
    let env = environment(server, token);
    let store = HttpArtifactStore::new(
        env.artifacts_url().unwrap(),
        env.runtime_token.clone(),
        HttpTimeouts::default(),
    )
    .unwrap();
    ArtifactClient::new(Arc::new(store), fast_settings())
}

/// Container URL for the artifact stored under `id`.
pub fn container_url(server: &MockServer, id: u32) -> String {
    format!("{}/_apis/resources/Containers/{id}", server.uri())
}

/// Body of an artifact listing.
pub fn artifact_listing(entries: &[(&str, String)]) -> Value {
    let value: Vec<Value> = entries
        .iter()
        .map(|(name, url)| json!({ "name": name, "fileContainerResourceUrl": url }))
        .collect();
    json!({ "count": value.len(), "value": value })
}

/// Body of a container listing; `(path, itemType, contentLocation)`.
pub fn container_listing(entries: &[(&str, &str, String)]) -> Value {
    let value: Vec<Value> = entries
        .iter()
        .map(|(path, kind, location)| {
            json!({ "path": path, "itemType": kind, "contentLocation": location })
        })
        .collect();
    json!({ "value": value })
}
