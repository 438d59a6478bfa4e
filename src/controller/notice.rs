use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::warn;

/// User-visible, dismissible notification raised from a failed remote write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub message: String,
}

/// Shared queue of notices. Every failed store call lands here so that no
/// write failure stays invisible.
#[derive(Clone)]
pub struct NoticeBoard {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    next_id: u64,
    notices: Vec<Notice>,
    tx: watch::Sender<Vec<Notice>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Mutex::new(Inner {
                next_id: 0,
                notices: Vec::new(),
                tx,
            })),
        }
    }

    pub fn push(&self, message: impl Into<String>) -> u64 {
        let message = message.into();
        warn!(notice = %message, "notice raised");
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.notices.push(Notice { id, message });
        let snapshot = inner.notices.clone();
        inner.tx.send_replace(snapshot);
        id
    }

    pub fn dismiss(&self, id: u64) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.notices.len();
        inner.notices.retain(|notice| notice.id != id);
        let dismissed = inner.notices.len() != before;
        if dismissed {
            let snapshot = inner.notices.clone();
            inner.tx.send_replace(snapshot);
        }
        dismissed
    }

    pub fn current(&self) -> Vec<Notice> {
        self.inner.lock().unwrap().notices.clone()
    }

    pub fn watch(&self) -> watch::Receiver<Vec<Notice>> {
        self.inner.lock().unwrap().tx.subscribe()
    }
}
