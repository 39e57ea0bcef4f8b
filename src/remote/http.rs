//! HTTP implementation of [`RemoteStore`].

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::types::{
    ArtifactSizeUpdate, ContainerItemList, CreateArtifactRequest, CreateArtifactResponse,
};
use super::{ArtifactList, ContainerItem, RemoteError, RemoteStore};
use crate::specification::{DownloadItem, UploadItem};
use crate::transfer::TransferError;

/// Content type and API version the service expects on JSON calls.
const JSON_ACCEPT: &str = "application/json;api-version=6.0-preview";

/// Container type sent when creating an artifact.
const CONTAINER_TYPE: &str = "actions_storage";

/// Connect and read timeouts for the HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            read: Duration::from_secs(300),
        }
    }
}

/// Artifact service client over HTTP.
///
/// Cheap to clone; the underlying connection pool is shared and holds no
/// per-call state, so one instance serves every worker.
#[derive(Debug, Clone)]
pub struct HttpArtifactStore {
    client: Client,
    artifacts_url: Url,
    token: Option<String>,
}

impl HttpArtifactStore {
    /// Creates a store for the run whose artifacts live at `artifacts_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::ClientBuild`] if the HTTP client cannot be built.
    #[instrument(level = "debug", skip(token), fields(has_token = token.is_some()))]
    pub fn new(
        artifacts_url: Url,
        token: Option<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.read)
            .user_agent(default_user_agent())
            .build()
            .map_err(|source| RemoteError::ClientBuild { source })?;

        Ok(Self {
            client,
            artifacts_url,
            token,
        })
    }

    #[must_use]
    pub fn artifacts_url(&self) -> &Url {
        &self.artifacts_url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn json_request(&self, method: Method, url: Url) -> RequestBuilder {
        self.request(method, url).header(ACCEPT, JSON_ACCEPT)
    }
}

#[async_trait]
impl RemoteStore for HttpArtifactStore {
    #[instrument(skip(self))]
    async fn list_artifacts(&self) -> Result<ArtifactList, RemoteError> {
        let url = self.artifacts_url.clone();
        let response = self
            .json_request(Method::GET, url.clone())
            .send()
            .await
            .map_err(|e| RemoteError::request(url.as_str(), e))?;

        let list: ArtifactList = read_listing(response, url.as_str()).await?;
        debug!(count = list.count, "listed artifacts");
        Ok(list)
    }

    #[instrument(skip(self))]
    async fn list_container_items(
        &self,
        artifact_name: &str,
        container_url: &str,
    ) -> Result<Vec<ContainerItem>, RemoteError> {
        let mut url =
            Url::parse(container_url).map_err(|_| RemoteError::invalid_url(container_url))?;
        url.query_pairs_mut().append_pair("itemPath", artifact_name);

        let response = self
            .json_request(Method::GET, url.clone())
            .send()
            .await
            .map_err(|e| RemoteError::request(url.as_str(), e))?;

        let list: ContainerItemList = read_listing(response, url.as_str()).await?;
        debug!(entries = list.value.len(), "listed container items");
        Ok(list.value)
    }

    #[instrument(skip(self))]
    async fn create_container(&self, artifact_name: &str) -> Result<String, RemoteError> {
        let url = self.artifacts_url.clone();
        let response = self
            .json_request(Method::POST, url.clone())
            .json(&CreateArtifactRequest {
                kind: CONTAINER_TYPE,
                name: artifact_name,
            })
            .send()
            .await
            .map_err(|e| RemoteError::request(url.as_str(), e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::request(url.as_str(), e))?;
        if !status.is_success() {
            debug!(status = status.as_u16(), %body, "container creation rejected");
            return Err(RemoteError::container_creation_with_body(
                artifact_name,
                format!("HTTP {}", status.as_u16()),
                body,
            ));
        }

        let parsed: CreateArtifactResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(source) => {
                debug!(%body, "container response is not JSON");
                return Err(RemoteError::container_creation_with_body(
                    artifact_name,
                    format!("unparsable response: {source}"),
                    body,
                ));
            }
        };

        match parsed.file_container_resource_url {
            Some(resource_url) if !resource_url.is_empty() => {
                debug!(%resource_url, "created artifact container");
                Ok(resource_url)
            }
            _ => {
                debug!(%body, "container response without resource URL");
                Err(RemoteError::container_creation_with_body(
                    artifact_name,
                    "no fileContainerResourceUrl in response",
                    body,
                ))
            }
        }
    }

    #[instrument(skip(self, item), fields(local = %item.local_path.display(), remote = %item.remote_path))]
    async fn upload_file(
        &self,
        resource_url: &str,
        artifact_name: &str,
        item: &UploadItem,
    ) -> Result<u64, TransferError> {
        let mut url =
            Url::parse(resource_url).map_err(|_| TransferError::invalid_url(resource_url))?;
        url.query_pairs_mut()
            .append_pair("itemPath", &format!("{artifact_name}/{}", item.remote_path));

        // Streamed from disk; each attempt reopens the file.
        let file = File::open(&item.local_path)
            .await
            .map_err(|e| TransferError::io(&item.local_path, e))?;
        let size = file
            .metadata()
            .await
            .map_err(|e| TransferError::io(&item.local_path, e))?
            .len();

        let response = self
            .request(Method::PUT, url.clone())
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, size)
            .body(Body::from(file))
            .send()
            .await
            .map_err(|e| TransferError::network(url.as_str(), e))?;

        ensure_success(response, url.as_str()).await?;
        debug!(bytes = size, "uploaded file");
        Ok(size)
    }

    #[instrument(skip(self, item), fields(url = %item.content_location, local = %item.local_path.display()))]
    async fn download_file(&self, item: &DownloadItem) -> Result<u64, TransferError> {
        let url = Url::parse(&item.content_location)
            .map_err(|_| TransferError::invalid_url(&item.content_location))?;

        let response = self
            .request(Method::GET, url.clone())
            .send()
            .await
            .map_err(|e| TransferError::network(url.as_str(), e))?;
        let response = ensure_success(response, url.as_str()).await?;

        // Truncates any existing file at the target.
        let mut file = File::create(&item.local_path)
            .await
            .map_err(|e| TransferError::io(&item.local_path, e))?;

        let result = stream_to_file(&mut file, response, url.as_str(), &item.local_path).await;
        if result.is_err() {
            debug!(path = %item.local_path.display(), "removing partial file after error");
            let _ = tokio::fs::remove_file(&item.local_path).await;
        }
        let bytes = result?;
        debug!(bytes, "downloaded file");
        Ok(bytes)
    }

    #[instrument(skip(self))]
    async fn finalize_size(&self, artifact_name: &str, size: u64) -> Result<(), RemoteError> {
        let mut url = self.artifacts_url.clone();
        url.query_pairs_mut().append_pair("artifactName", artifact_name);

        let response = self
            .json_request(Method::PATCH, url.clone())
            .json(&ArtifactSizeUpdate { size })
            .send()
            .await
            .map_err(|e| RemoteError::request(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::SizeFinalization {
                name: artifact_name.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        info!(artifact = artifact_name, size, "finalized artifact size");
        Ok(())
    }
}

/// Reads a listing body; non-success or empty bodies are [`RemoteError::List`].
async fn read_listing<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, RemoteError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| RemoteError::request(url, e))?;

    if !status.is_success() || body.trim().is_empty() {
        debug!(status = status.as_u16(), %body, "listing failed");
        return Err(RemoteError::List {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|source| RemoteError::Parse {
        url: url.to_string(),
        source,
        body,
    })
}

/// Turns a non-success response into [`TransferError::HttpStatus`] with its body.
async fn ensure_success(response: Response, url: &str) -> Result<Response, TransferError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransferError::http_status_with_body(
        url,
        status.as_u16(),
        body,
    ))
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, TransferError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| TransferError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| TransferError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| TransferError::io(file_path, e))?;

    Ok(bytes_written)
}

fn default_user_agent() -> String {
    format!("artifact-transfer/{}", env!("CARGO_PKG_VERSION"))
}
