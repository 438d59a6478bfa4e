use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use uuid::Uuid;

use super::subscription::{Snapshot, TaskDocument, TaskSubscription};
use super::{StoreError, TaskQuery, TaskStore};
use crate::model::{NewTask, TaskId, TaskPatch};

/// In-process document collection with live filtered subscriptions. Every
/// mutation fans a complete recomputed snapshot out to each registered
/// subscriber; a snapshot is never a diff.
pub struct MemoryTaskStore {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    docs: HashMap<TaskId, NewTask>,
    subscribers: HashMap<u64, Subscriber>,
    next_subscriber: u64,
}

struct Subscriber {
    query: TaskQuery,
    tx: mpsc::UnboundedSender<Snapshot>,
}

impl Inner {
    fn broadcast(&mut self) {
        let docs = &self.docs;
        // senders with a closed receiver are unregistered here
        self.subscribers
            .retain(|_, subscriber| subscriber.tx.send(snapshot_for(&subscriber.query, docs)).is_ok());
    }
}

fn snapshot_for(query: &TaskQuery, docs: &HashMap<TaskId, NewTask>) -> Snapshot {
    let mut matching = docs
        .iter()
        .filter(|(_, fields)| query.matches(fields))
        .map(|(id, fields)| TaskDocument {
            id: id.clone(),
            fields: fields.clone(),
        })
        .collect::<Vec<TaskDocument>>();
    // creation time descending; the id breaks ties so the order is stable
    // across snapshots
    matching.sort_by(|a, b| {
        b.fields
            .created_at
            .cmp(&a.fields.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    matching
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                docs: HashMap::new(),
                subscribers: HashMap::new(),
                next_subscriber: 0,
            })),
        }
    }

    /// All stored records, in subscription order.
    #[allow(dead_code)]
    pub fn documents(&self) -> Vec<TaskDocument> {
        let inner = self.inner.lock().unwrap();
        let mut all = inner
            .docs
            .iter()
            .map(|(id, fields)| TaskDocument {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect::<Vec<TaskDocument>>();
        all.sort_by(|a, b| {
            b.fields
                .created_at
                .cmp(&a.fields.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        all
    }

    #[allow(dead_code)]
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().unwrap().subscribers.len()
    }
}

#[async_trait::async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, fields: NewTask) -> Result<TaskId, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let id = Uuid::new_v4().to_string();
        inner.docs.insert(id.clone(), fields);
        inner.broadcast();
        Ok(id)
    }

    async fn update(&self, id: &str, patch: TaskPatch) -> Result<(), StoreError> {
        if patch.is_empty() {
            return Err(StoreError::Rejected("patch names no fields".to_string()));
        }
        let mut inner = self.inner.lock().unwrap();
        match inner.docs.get_mut(id) {
            Some(fields) => patch.apply(fields),
            None => return Err(StoreError::NotFound(id.to_string())),
        }
        inner.broadcast();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.docs.remove(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        inner.broadcast();
        Ok(())
    }

    async fn subscribe(&self, query: TaskQuery) -> Result<TaskSubscription, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.next_subscriber;
            inner.next_subscriber += 1;
            // the current result set is delivered up front, before any change
            let _ = tx.send(snapshot_for(&query, &inner.docs));
            inner.subscribers.insert(id, Subscriber { query, tx });
            id
        };

        let registry = self.inner.clone();
        Ok(TaskSubscription::new(
            rx,
            Box::new(move || {
                registry.lock().unwrap().subscribers.remove(&id);
            }),
        ))
    }
}
