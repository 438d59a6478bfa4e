mod error;
mod http;
mod memory;
mod subscription;

pub use error::StoreError;
pub use http::HttpTaskStore;
pub use memory::MemoryTaskStore;
pub use subscription::{Snapshot, TaskDocument, TaskSubscription};

use async_trait::async_trait;

use crate::model::{NewTask, TaskId, TaskPatch, UserEmail};

/// Remote collection boundary. The store is the sole owner of persisted
/// records; callers hold nothing but the disposable snapshots a subscription
/// delivers.
#[async_trait]
pub trait TaskStore: Send + Sync + 'static {
    async fn insert(&self, fields: NewTask) -> Result<TaskId, StoreError>;
    async fn update(&self, id: &str, patch: TaskPatch) -> Result<(), StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
    async fn subscribe(&self, query: TaskQuery) -> Result<TaskSubscription, StoreError>;
}

/// Read scope of a subscription: records owned by one identity, ordered by
/// creation time descending. The identity is passed in explicitly by the
/// caller that opens the subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub user_email: Option<UserEmail>,
}

impl TaskQuery {
    pub fn owned_by(user_email: UserEmail) -> Self {
        Self {
            user_email: Some(user_email),
        }
    }

    /// No identity: the subscription degrades to an empty result set instead
    /// of failing.
    pub fn unauthenticated() -> Self {
        Self { user_email: None }
    }

    pub fn matches(&self, fields: &NewTask) -> bool {
        match &self.user_email {
            Some(email) => fields.user_email == *email,
            None => false,
        }
    }
}
