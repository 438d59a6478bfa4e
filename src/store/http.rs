use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use tracing::warn;
use url::Url;

use super::subscription::{Snapshot, TaskSubscription};
use super::{StoreError, TaskQuery, TaskStore};
use crate::config::{HttpBackendConfig, RetryConfig};
use crate::model::{NewTask, TaskId, TaskPatch};

/// REST client for the remote document collection. Writes are single
/// requests; listing retries with backoff, and a subscription is a polling
/// loop that delivers a fresh snapshot whenever the filtered ordered listing
/// changed.
#[derive(Clone)]
pub struct HttpTaskStore {
    client: reqwest::Client,
    store_url: Url,
    collection: String,
    poll_interval: Duration,
    retry: RetryConfig,
}

#[derive(Deserialize)]
struct InsertResponse {
    id: TaskId,
}

impl HttpTaskStore {
    pub fn new(cfg: &HttpBackendConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_millis))
            .build()
            .map_err(|err| StoreError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            store_url: cfg.store_url.clone(),
            collection: cfg.collection.clone(),
            poll_interval: Duration::from_millis(cfg.poll_interval_millis),
            retry: cfg.retry.clone(),
        })
    }

    fn collection_url(&self) -> Result<Url, StoreError> {
        self.store_url
            .join(&self.collection)
            .map_err(|err| StoreError::Transport(err.to_string()))
    }

    fn document_url(&self, id: &str) -> Result<Url, StoreError> {
        self.store_url
            .join(&format!("{}/{}", self.collection, id))
            .map_err(|err| StoreError::Transport(err.to_string()))
    }

    fn retry_strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(self.retry.interval_ms)
            .max_delay(Duration::from_millis(self.retry.max_interval_ms))
            .map(jitter)
            .take(self.retry.max_retries as usize)
    }

    async fn fail(id: Option<&str>, response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            404 => StoreError::NotFound(id.unwrap_or("unknown").to_string()),
            401 | 403 => StoreError::PermissionDenied(body),
            400..=499 => StoreError::Rejected(body),
            _ => StoreError::Transport(format!("{}: {}", status, body)),
        }
    }

    async fn list(&self, query: &TaskQuery) -> Result<Snapshot, StoreError> {
        let email = match &query.user_email {
            Some(email) => email.clone(),
            None => return Ok(Vec::new()),
        };

        let url = self.collection_url()?;
        let response = Retry::spawn(self.retry_strategy(), || {
            self.client
                .get(url.clone())
                .query(&[
                    ("userEmail", email.as_str()),
                    ("orderBy", "createdAt"),
                    ("direction", "desc"),
                ])
                .send()
        })
        .await
        .map_err(|err| StoreError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::fail(None, response).await);
        }
        response
            .json::<Snapshot>()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))
    }

    async fn poll(self, query: TaskQuery, tx: mpsc::UnboundedSender<Snapshot>) {
        let mut interval = tokio::time::interval(self.poll_interval);
        let mut last: Option<Snapshot> = None;
        loop {
            interval.tick().await;
            match self.list(&query).await {
                Ok(snapshot) => {
                    if last.as_ref() == Some(&snapshot) {
                        continue;
                    }
                    if tx.send(snapshot.clone()).is_err() {
                        break;
                    }
                    last = Some(snapshot);
                }
                // the consumer keeps its last authoritative snapshot,
                // delivery resumes on a later tick
                Err(err) => warn!(reason = %err, "Unable to poll the task collection."),
            }
        }
    }
}

#[async_trait::async_trait]
impl TaskStore for HttpTaskStore {
    async fn insert(&self, fields: NewTask) -> Result<TaskId, StoreError> {
        let url = self.collection_url()?;
        let response = self
            .client
            .post(url)
            .json(&fields)
            .send()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::fail(None, response).await);
        }
        response
            .json::<InsertResponse>()
            .await
            .map(|body| body.id)
            .map_err(|err| StoreError::Transport(err.to_string()))
    }

    async fn update(&self, id: &str, patch: TaskPatch) -> Result<(), StoreError> {
        if patch.is_empty() {
            return Err(StoreError::Rejected("patch names no fields".to_string()));
        }
        let url = self.document_url(id)?;
        let response = self
            .client
            .patch(url)
            .json(&patch)
            .send()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::fail(Some(id), response).await);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let url = self.document_url(id)?;
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::fail(Some(id), response).await);
        }
        Ok(())
    }

    async fn subscribe(&self, query: TaskQuery) -> Result<TaskSubscription, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let poller = tokio::spawn(self.clone().poll(query, tx));
        Ok(TaskSubscription::new(rx, Box::new(move || poller.abort())))
    }
}
