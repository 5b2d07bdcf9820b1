//! Backend task protocol — submission, status polling, result retrieval.
//!
//! Endpoints, parameterized by task kind, database, and prediction id:
//!
//!   POST {base}/{kind}/{database}/{id}/post               — submit
//!   GET  {base}/{kind}/{database}/{id}/tasks              — poll task list
//!   POST {base}/{kind}/{database}/{id}/public/result.json — fetch result
//!
//! `TaskBackend` is the seam: the submitter, the reconciler, and the
//! client-side count tasks are generic over it, so tests can run
//! against an in-memory queue instead of a live server.

use async_trait::async_trait;
use thiserror::Error;

use dockflow_core::task::{BackendTaskView, ServerTaskKind, TaskListResponse};
use dockflow_core::TaskIdentity;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned HTTP {0}")]
    Status(u16),
}

#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Submit a task. The response body is ignored — only transport
    /// failure matters to the caller.
    async fn post_task(
        &self,
        kind: ServerTaskKind,
        body: serde_json::Value,
    ) -> Result<(), BackendError>;

    /// Fetch the backend's full task list for one kind.
    async fn list_tasks(&self, kind: ServerTaskKind) -> Result<Vec<BackendTaskView>, BackendError>;

    /// Fetch the result artifact of a successful task by identity.
    async fn fetch_result(
        &self,
        kind: ServerTaskKind,
        identity: &TaskIdentity,
    ) -> Result<serde_json::Value, BackendError>;
}

#[async_trait]
impl<'a, B: TaskBackend> TaskBackend for &'a B {
    async fn post_task(
        &self,
        kind: ServerTaskKind,
        body: serde_json::Value,
    ) -> Result<(), BackendError> {
        (**self).post_task(kind, body).await
    }

    async fn list_tasks(&self, kind: ServerTaskKind) -> Result<Vec<BackendTaskView>, BackendError> {
        (**self).list_tasks(kind).await
    }

    async fn fetch_result(
        &self,
        kind: ServerTaskKind,
        identity: &TaskIdentity,
    ) -> Result<serde_json::Value, BackendError> {
        (**self).fetch_result(kind, identity).await
    }
}

// ── HTTP implementation ───────────────────────────────────────────────────────

/// Live HTTP backend for one prediction.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    database: String,
    prediction_id: String,
}

impl HttpBackend {
    pub fn new(
        base_url: impl Into<String>,
        database: impl Into<String>,
        prediction_id: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            database: database.into(),
            prediction_id: prediction_id.into(),
        }
    }

    fn endpoint(&self, kind: ServerTaskKind, suffix: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.base_url,
            kind.as_path(),
            self.database,
            self.prediction_id,
            suffix
        )
    }
}

#[async_trait]
impl TaskBackend for HttpBackend {
    async fn post_task(
        &self,
        kind: ServerTaskKind,
        body: serde_json::Value,
    ) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.endpoint(kind, "post"))
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BackendError::Status(response.status().as_u16()));
        }
        Ok(())
    }

    async fn list_tasks(&self, kind: ServerTaskKind) -> Result<Vec<BackendTaskView>, BackendError> {
        let response = self
            .client
            .get(self.endpoint(kind, "tasks"))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BackendError::Status(response.status().as_u16()));
        }
        let list: TaskListResponse = response.json().await?;
        Ok(list.tasks)
    }

    async fn fetch_result(
        &self,
        kind: ServerTaskKind,
        identity: &TaskIdentity,
    ) -> Result<serde_json::Value, BackendError> {
        let response = self
            .client
            .post(self.endpoint(kind, "public/result.json"))
            .json(&serde_json::json!({ "hash": identity.as_str() }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BackendError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}
