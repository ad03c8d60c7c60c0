//! Client for the remote sample store.
//!
//! The store is the only authority on positions: it clamps, wraps and counts.
//! Every call here is a single round trip with no client-side caching.

use async_trait::async_trait;
use labelcheck_core::{AnnotateRequest, DatasetInfo, Sample, ServiceType};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::recording::{RecordingLogger, RecordingMiddleware};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest_middleware::Error,
    },
    #[error("store returned HTTP {status} for {path}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },
    /// The store answered `success: false`.
    #[error("{0}")]
    Rejected(String),
    #[error("could not decode {path} response: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid store URL: {0}")]
    InvalidUrl(String),
}

/// Navigation request. `Goto` carries a zero-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Prev,
    Next,
    Goto(usize),
}

impl NavAction {
    pub fn name(self) -> &'static str {
        match self {
            NavAction::Prev => "prev",
            NavAction::Next => "next",
            NavAction::Goto(_) => "goto",
        }
    }
}

#[derive(Debug, Serialize)]
struct NavigateRequest {
    action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
}

impl From<NavAction> for NavigateRequest {
    fn from(action: NavAction) -> Self {
        let index = match action {
            NavAction::Goto(index) => Some(index),
            _ => None,
        };
        Self {
            action: action.name(),
            index,
        }
    }
}

/// Dataset position plus the sample at that position.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SamplePage {
    pub dataset_info: DatasetInfo,
    pub sample: Sample,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RelabelPage {
    #[serde(flatten)]
    pub page: SamplePage,
    #[serde(default)]
    pub total_relabeled: u64,
}

#[derive(Deserialize)]
struct FilesResponse {
    #[serde(default)]
    files: Vec<String>,
}

#[derive(Deserialize)]
struct RelabelStatusResponse {
    #[serde(default)]
    relabel_file_exists: bool,
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Names of the dataset files the store can serve.
    async fn list_files(&self) -> Result<Vec<String>, StoreError>;

    /// Open a dataset file and return its first page.
    async fn load(&self, file: &str) -> Result<SamplePage, StoreError>;

    /// Page at the store's current position, without moving.
    async fn current(&self) -> Result<SamplePage, StoreError>;

    async fn navigate(&self, action: NavAction) -> Result<SamplePage, StoreError>;

    async fn annotate(&self, request: &AnnotateRequest) -> Result<(), StoreError>;

    /// Whether a conflict dataset exists for re-annotation.
    async fn relabel_status(&self) -> Result<bool, StoreError>;

    async fn relabel_load(&self) -> Result<RelabelPage, StoreError>;

    /// Tell the store relabel mode is over. The response carries nothing.
    async fn relabel_exit(&self) -> Result<(), StoreError>;
}

/// Build the middleware-wrapped HTTP client used for store calls.
pub fn create_store_client(
    config: &Config,
    recording_logger: Option<RecordingLogger>,
) -> anyhow::Result<ClientWithMiddleware> {
    use anyhow::Context;

    let client = Client::builder()
        .user_agent(labelcheck_core::user_agent())
        .timeout(config.request_timeout)
        .build()
        .context("Failed to create HTTP client")?;

    let mut builder = ClientBuilder::new(client);

    if let Some(logger) = recording_logger {
        builder = builder.with(RecordingMiddleware::new(logger, ServiceType::SampleStore));
    }

    Ok(builder.build())
}

/// `RemoteStore` over JSON/HTTP.
pub struct HttpStore {
    client: ClientWithMiddleware,
    base_url: Url,
}

impl HttpStore {
    /// `base_url` should end with `/` so API paths join beneath it.
    pub fn new(client: ClientWithMiddleware, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn from_config(
        config: &Config,
        recording_logger: Option<RecordingLogger>,
    ) -> anyhow::Result<Self> {
        Ok(Self::new(
            create_store_client(config, recording_logger)?,
            config.store_url.clone(),
        ))
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(path)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {}", path, e)))
    }

    async fn get_json(&self, path: &str) -> Result<Value, StoreError> {
        let url = self.endpoint(path)?;
        self.send(path, self.client.get(url)).await
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, StoreError> {
        let url = self.endpoint(path)?;
        self.send(path, self.client.post(url).json(body)).await
    }

    async fn send(
        &self,
        path: &str,
        request: reqwest_middleware::RequestBuilder,
    ) -> Result<Value, StoreError> {
        let transport = |source: reqwest_middleware::Error| StoreError::Transport {
            path: path.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport(reqwest_middleware::Error::from(e)))?;

        debug!("Store {} -> {}", path, status);

        match serde_json::from_str::<Value>(&body) {
            Ok(value) if status.is_success() => Ok(value),
            // Error statuses that still carry a store envelope are rejections.
            Ok(value) if value.get("success").and_then(Value::as_bool) == Some(false) => {
                Err(rejection(&value))
            }
            Ok(_) => Err(StoreError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            }),
            Err(_) if !status.is_success() => Err(StoreError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            }),
            Err(source) => Err(StoreError::Decode {
                path: path.to_string(),
                source,
            }),
        }
    }
}

fn rejection(value: &Value) -> StoreError {
    StoreError::Rejected(
        value
            .get("error")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or("store reported failure")
            .to_string(),
    )
}

/// Require `success: true`, then decode the envelope into `T`.
fn decode_envelope<T: serde::de::DeserializeOwned>(path: &str, value: Value) -> Result<T, StoreError> {
    if value.get("success").and_then(Value::as_bool) != Some(true) {
        return Err(rejection(&value));
    }
    decode(path, value)
}

fn decode<T: serde::de::DeserializeOwned>(path: &str, value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|source| StoreError::Decode {
        path: path.to_string(),
        source,
    })
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn list_files(&self) -> Result<Vec<String>, StoreError> {
        let path = "api/files";
        let response: FilesResponse = decode(path, self.get_json(path).await?)?;
        Ok(response.files)
    }

    async fn load(&self, file: &str) -> Result<SamplePage, StoreError> {
        let path = "api/load/";
        let mut url = self.endpoint(path)?;
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(file);
        let value = self.send(path, self.client.get(url)).await?;
        decode_envelope(path, value)
    }

    async fn current(&self) -> Result<SamplePage, StoreError> {
        let path = "api/sample";
        decode_envelope(path, self.get_json(path).await?)
    }

    async fn navigate(&self, action: NavAction) -> Result<SamplePage, StoreError> {
        let path = "api/navigate";
        let value = self
            .post_json(path, &NavigateRequest::from(action))
            .await?;
        decode_envelope(path, value)
    }

    async fn annotate(&self, request: &AnnotateRequest) -> Result<(), StoreError> {
        let path = "api/annotate";
        let value = self.post_json(path, request).await?;
        if value.get("success").and_then(Value::as_bool) == Some(true) {
            Ok(())
        } else {
            Err(rejection(&value))
        }
    }

    async fn relabel_status(&self) -> Result<bool, StoreError> {
        let path = "api/relabel/status";
        let response: RelabelStatusResponse = decode(path, self.get_json(path).await?)?;
        Ok(response.relabel_file_exists)
    }

    async fn relabel_load(&self) -> Result<RelabelPage, StoreError> {
        let path = "api/relabel/load";
        decode_envelope(path, self.get_json(path).await?)
    }

    async fn relabel_exit(&self) -> Result<(), StoreError> {
        let url = self.endpoint("api/relabel/exit")?;
        self.client
            .get(url)
            .send()
            .await
            .map_err(|source| StoreError::Transport {
                path: "api/relabel/exit".to_string(),
                source,
            })?;
        Ok(())
    }
}
