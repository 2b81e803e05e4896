//! Typed HTTP client for the public and admin document API.
//!
//! Public reads never fail: transport and server errors are logged and
//! degrade to an empty result. Admin writes surface a typed error instead,
//! see [`admin::AdminError`].

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Url};
use serde_json::Value;
use thiserror::Error;

use crate::domain::collection::{Cardinality, Collection};
use crate::domain::document::ResourceDocument;
use crate::dto::api::ApiEnvelope;

pub mod admin;
pub mod pharmacies;
pub mod retry;
pub mod session;

use retry::RetryPolicy;

/// Environment variable holding the API base URL.
pub const API_URL_VAR: &str = "VITE_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            timeout: REQUEST_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Reads `VITE_API_URL`, falling back to the local development server.
    pub fn from_env() -> Self {
        let api_url = std::env::var(API_URL_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(api_url)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("invalid API url: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("server answered {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("request rejected: {0}")]
    Rejected(String),
}

impl FetchError {
    /// Network failures, throttling and 5xx may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Result of a public read, shaped by the collection's cardinality.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceData {
    Document(ResourceDocument),
    Null,
    Documents(Vec<ResourceDocument>),
}

impl ResourceData {
    /// Coerces any shape to a list.
    pub fn into_documents(self) -> Vec<ResourceDocument> {
        match self {
            ResourceData::Document(doc) => vec![doc],
            ResourceData::Null => Vec::new(),
            ResourceData::Documents(docs) => docs,
        }
    }

    /// The document a singleton page renders.
    pub fn into_first(self) -> Option<ResourceDocument> {
        self.into_documents().into_iter().next()
    }

    fn empty_for(cardinality: Cardinality) -> Self {
        match cardinality {
            Cardinality::Singleton => ResourceData::Null,
            Cardinality::List => ResourceData::Documents(Vec::new()),
        }
    }

    fn shaped(cardinality: Cardinality, docs: Vec<ResourceDocument>) -> Self {
        match cardinality {
            Cardinality::List => ResourceData::Documents(docs),
            Cardinality::Singleton => docs
                .into_iter()
                .next()
                .map_or(ResourceData::Null, ResourceData::Document),
        }
    }
}

/// Result of an always-array read.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Loaded(Vec<ResourceDocument>),
    /// Transient failures outlasted the retry budget.
    Unavailable,
}

/// Turns the `data` member of an envelope into documents, wrapping a bare object.
pub fn documents_from(data: Option<Value>) -> Vec<ResourceDocument> {
    match data {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(ResourceDocument::from_value)
            .collect(),
        Some(Value::Object(map)) => vec![map.into()],
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone)]
pub struct ResourceClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ResourceClient {
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("onp-portal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Joins percent-encoded path segments onto the API base URL.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.config.api_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", self.config.api_url)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.config.api_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn request(&self, method: Method, url: Url, token: Option<&str>) -> RequestBuilder {
        let request = self.http.request(method, url);
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends once and unwraps the `{ success, data, message }` envelope.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Option<Value>, FetchError> {
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiEnvelope<Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| status.to_string());
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiEnvelope<Value> =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;
        if !envelope.success {
            return Err(FetchError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ));
        }
        Ok(envelope.data)
    }

    /// Sends a read, retrying transient failures with backoff.
    pub(crate) async fn read<F>(&self, build: F) -> Result<Option<Value>, FetchError>
    where
        F: Fn() -> RequestBuilder,
    {
        let policy = self.config.retry;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send(build()).await {
                Err(err) if err.is_transient() && policy.allows_retry(attempt) => {
                    let delay = policy.backoff(attempt);
                    log::warn!(
                        "Attempt {attempt}/{} failed: {err}; retrying in {delay:?}",
                        policy.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }

    async fn read_public(&self, segments: &[&str]) -> Result<Vec<ResourceDocument>, FetchError> {
        let url = self.url(segments)?;
        let data = self
            .read(|| self.request(Method::GET, url.clone(), None))
            .await?;
        Ok(documents_from(data))
    }

    /// Loads a public collection shaped by its cardinality.
    ///
    /// Singleton collections yield the first document or `Null`; `videos`
    /// yields a list, empty on failure.
    pub async fn fetch_resource_data(&self, collection: &str) -> ResourceData {
        let cardinality = Collection::from(collection).cardinality();
        match self.read_public(&["public", collection]).await {
            Ok(docs) => ResourceData::shaped(cardinality, docs),
            Err(err) => {
                log::error!("Failed to fetch `{collection}`: {err}");
                ResourceData::empty_for(cardinality)
            }
        }
    }

    pub async fn fetch_resource_by_id(&self, collection: &str, id: &str) -> Option<ResourceDocument> {
        match self.read_public(&["public", collection, id]).await {
            Ok(docs) => docs.into_iter().next(),
            Err(err) => {
                log::error!("Failed to fetch `{collection}/{id}`: {err}");
                None
            }
        }
    }

    /// Always-array read telling "nothing published" apart from "unavailable".
    pub async fn fetch_collection(&self, collection: &str) -> FetchOutcome {
        match self.read_public(&["public", collection]).await {
            Ok(docs) => FetchOutcome::Loaded(docs),
            Err(err) if err.is_transient() => {
                log::error!("`{collection}` is unavailable: {err}");
                FetchOutcome::Unavailable
            }
            Err(err) => {
                log::error!("Failed to fetch `{collection}`: {err}");
                FetchOutcome::Loaded(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn client(api_url: &str) -> ResourceClient {
        ResourceClient::new(ClientConfig::new(api_url)).unwrap()
    }

    #[test]
    fn urls_encode_segments() {
        let client = client("http://localhost:3001/api/");
        let url = client.url(&["public", "pageMocks", "a b"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/api/public/pageMocks/a%20b");
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let client = client("not a url");
        assert!(matches!(client.url(&["public"]), Err(FetchError::InvalidUrl(_))));
    }

    #[test]
    fn data_shapes_follow_cardinality() {
        let docs = documents_from(Some(json!([{"title": "a"}, {"title": "b"}, 3])));
        assert_eq!(docs.len(), 2);

        let single = ResourceData::shaped(Cardinality::Singleton, docs.clone());
        assert_eq!(single.into_first().unwrap().title(), Some("a"));
        assert_eq!(
            ResourceData::shaped(Cardinality::Singleton, Vec::new()),
            ResourceData::Null
        );
        assert_eq!(
            ResourceData::shaped(Cardinality::List, docs.clone()),
            ResourceData::Documents(docs)
        );
    }

    #[test]
    fn bare_objects_are_wrapped() {
        let docs = documents_from(Some(json!({"title": "seul"})));
        assert_eq!(docs.len(), 1);
        assert!(documents_from(Some(Value::Null)).is_empty());
        assert!(documents_from(None).is_empty());
    }

    #[test]
    fn transient_errors() {
        assert!(FetchError::Transport("reset".into()).is_transient());
        assert!(
            FetchError::Status {
                status: 503,
                message: String::new()
            }
            .is_transient()
        );
        assert!(
            !FetchError::Status {
                status: 404,
                message: String::new()
            }
            .is_transient()
        );
        assert!(!FetchError::Rejected("no".into()).is_transient());
    }
}
