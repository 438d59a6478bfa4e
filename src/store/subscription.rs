use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::model::{NewTask, TaskId};

/// One raw record of a snapshot: the stored fields with the identifier the
/// store attached to them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TaskDocument {
    pub id: TaskId,
    #[serde(flatten)]
    pub fields: NewTask,
}

/// Complete ordered result set of all matching records at one instant.
/// Always authoritative: the consumer replaces its cached view, it never
/// merges.
pub type Snapshot = Vec<TaskDocument>;

/// Standing read subscription against a collection. The handle is a scoped
/// acquisition: closing it, or dropping it on any exit path, unregisters the
/// subscriber and no snapshot is delivered afterwards.
pub struct TaskSubscription {
    rx: UnboundedReceiver<Snapshot>,
    unregister: Option<Box<dyn FnOnce() + Send>>,
}

impl TaskSubscription {
    pub fn new(rx: UnboundedReceiver<Snapshot>, unregister: Box<dyn FnOnce() + Send>) -> Self {
        Self {
            rx,
            unregister: Some(unregister),
        }
    }

    /// Next delivered snapshot, or `None` once the store side went away.
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    pub fn close(self) {
        // release() runs in Drop
    }

    fn release(&mut self) {
        if let Some(unregister) = self.unregister.take() {
            unregister();
        }
        self.rx.close();
    }
}

impl Drop for TaskSubscription {
    fn drop(&mut self) {
        self.release();
    }
}
