//! Back-office list/create/update/delete screen.

use reqwest::Method;
use serde_json::Value;
use thiserror::Error;

use crate::client::session::Session;
use crate::client::{FetchError, ResourceClient, documents_from};
use crate::domain::document::ResourceDocument;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdminError {
    #[error("authentication required")]
    Unauthorized,

    #[error("insufficient permissions: {0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Rejected(String),

    #[error("network error: {0}")]
    Transport(String),
}

impl From<FetchError> for AdminError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Status { status: 401, .. } => AdminError::Unauthorized,
            FetchError::Status {
                status: 403,
                message,
            } => AdminError::Forbidden(message),
            FetchError::Status {
                status: 409,
                message,
            } => AdminError::Conflict(message),
            FetchError::Status { status, message } if (400..500).contains(&status) => {
                AdminError::Rejected(message)
            }
            FetchError::Rejected(message) => AdminError::Rejected(message),
            other => AdminError::Transport(other.to_string()),
        }
    }
}

/// Rows of one collection as shown in the back-office.
///
/// Rows only change when a list request succeeds; writes never patch them
/// locally.
#[derive(Debug, Clone)]
pub struct AdminScreen {
    client: ResourceClient,
    session: Session,
    collection: String,
    rows: Vec<ResourceDocument>,
    stale: bool,
}

impl AdminScreen {
    pub fn new(client: ResourceClient, session: Session, collection: impl Into<String>) -> Self {
        Self {
            client,
            session,
            collection: collection.into(),
            rows: Vec::new(),
            stale: true,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn rows(&self) -> &[ResourceDocument] {
        &self.rows
    }

    /// `true` until a list request succeeds after the last write.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    fn ensure_session(&self) -> Result<(), AdminError> {
        if self.session.is_expired() {
            return Err(AdminError::Unauthorized);
        }
        Ok(())
    }

    async fn write(
        &self,
        method: Method,
        segments: &[&str],
        payload: Option<&Value>,
    ) -> Result<Option<Value>, AdminError> {
        self.ensure_session()?;
        let url = self.client.url(segments)?;
        let mut request = self
            .client
            .request(method, url, Some(self.session.token()));
        if let Some(payload) = payload {
            request = request.json(payload);
        }
        Ok(self.client.send(request).await?)
    }

    /// Re-fetches the rows; on failure the previous rows stay visible.
    pub async fn refresh(&mut self) -> Result<(), AdminError> {
        self.ensure_session()?;
        let url = self.client.url(&["admin", self.collection.as_str()])?;
        let token = self.session.token();
        let data = self
            .client
            .read(|| self.client.request(Method::GET, url.clone(), Some(token)))
            .await?;
        self.rows = documents_from(data);
        self.stale = false;
        Ok(())
    }

    async fn refresh_after_write(&mut self) {
        self.stale = true;
        if let Err(err) = self.refresh().await {
            log::error!("Failed to reload `{}` after a write: {err}", self.collection);
        }
    }

    fn single(data: Option<Value>) -> Result<ResourceDocument, AdminError> {
        documents_from(data)
            .into_iter()
            .next()
            .ok_or_else(|| AdminError::Transport("response carried no document".to_string()))
    }

    pub async fn create(&mut self, payload: &Value) -> Result<ResourceDocument, AdminError> {
        let data = self
            .write(Method::POST, &["admin", self.collection.as_str()], Some(payload))
            .await?;
        self.refresh_after_write().await;
        Self::single(data)
    }

    /// Replaces the whole document; include `version` to guard against
    /// overwriting a concurrent edit.
    pub async fn update(&mut self, id: &str, payload: &Value) -> Result<ResourceDocument, AdminError> {
        let data = self
            .write(Method::PUT, &["admin", self.collection.as_str(), id], Some(payload))
            .await?;
        self.refresh_after_write().await;
        Self::single(data)
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), AdminError> {
        self.write(Method::DELETE, &["admin", self.collection.as_str(), id], None)
            .await?;
        self.refresh_after_write().await;
        Ok(())
    }
}
