mod error;
mod form;
mod guard;
mod login;
mod notice;
mod reconciler;

pub use error::ControllerError;
pub use form::{Submission, TaskForm};
pub use guard::{GuardState, LogNavigator, Navigator, RouteGuard};
pub use login::AccountController;
pub use notice::{Notice, NoticeBoard};
pub use reconciler::reconcile;

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::model::{Task, UserEmail};
use crate::store::{TaskQuery, TaskStore, TaskSubscription};

/// Live task board for one signed-in user. Owns the scoped subscription and
/// the render state it feeds; the identity is passed in explicitly rather
/// than read from ambient session state.
pub struct Dashboard<S: TaskStore> {
    store: Arc<S>,
    user_email: UserEmail,
    form: TaskForm,
    notices: NoticeBoard,
    tasks: watch::Receiver<Vec<Task>>,
    sync_loop: JoinHandle<()>,
}

impl<S: TaskStore> Dashboard<S> {
    /// Opens the subscription scoped to `user_email` and starts the snapshot
    /// loop. That loop is the only writer of the task list.
    pub async fn open(
        store: Arc<S>,
        user_email: UserEmail,
        notices: NoticeBoard,
    ) -> Result<Self, ControllerError> {
        let subscription = store
            .subscribe(TaskQuery::owned_by(user_email.clone()))
            .await?;
        let (tx, rx) = watch::channel(Vec::new());
        let sync_loop = tokio::spawn(sync_snapshots(subscription, tx));

        Ok(Self {
            store,
            user_email,
            form: TaskForm::new(notices.clone()),
            notices,
            tasks: rx,
            sync_loop,
        })
    }

    /// Current render state: exactly the records of the last snapshot, in
    /// the snapshot's order.
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.borrow().clone()
    }

    pub fn watch_tasks(&self) -> watch::Receiver<Vec<Task>> {
        self.tasks.clone()
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn form(&self) -> &TaskForm {
        &self.form
    }

    /// Mutable access for pure input edits (title, description, priority).
    pub fn form_mut(&mut self) -> &mut TaskForm {
        &mut self.form
    }

    pub fn begin_edit(&mut self, task: &Task) {
        self.form.begin_edit(task);
    }

    pub async fn submit(&mut self) -> Submission {
        self.form
            .submit(self.store.as_ref(), &self.user_email)
            .await
    }

    pub async fn toggle_completed(&self, task: &Task) {
        self.form.toggle_completed(self.store.as_ref(), task).await;
    }

    pub async fn delete(&mut self, id: &str) {
        self.form.delete(self.store.as_ref(), id).await;
    }

    /// Tears the subscription down. After this no snapshot reaches the
    /// dropped render state, even if the store keeps emitting.
    pub fn close(self) {
        self.sync_loop.abort();
    }
}

async fn sync_snapshots(mut subscription: TaskSubscription, tx: watch::Sender<Vec<Task>>) {
    while let Some(snapshot) = subscription.recv().await {
        // each delivery replaces the previous list wholesale
        let tasks = reconcile(snapshot);
        debug!(count = tasks.len(), "snapshot applied");
        if tx.send(tasks).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;
    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;
    use crate::model::Priority;
    use crate::store::MemoryTaskStore;

    fn owner() -> UserEmail {
        UserEmail::try_from("a@x.com").unwrap()
    }

    async fn open_dashboard(store: Arc<MemoryTaskStore>) -> Dashboard<MemoryTaskStore> {
        Dashboard::open(store, owner(), NoticeBoard::new())
            .await
            .unwrap()
    }

    async fn settle(dashboard: &Dashboard<MemoryTaskStore>) -> Vec<Task> {
        sleep(Duration::from_millis(20)).await;
        dashboard.tasks()
    }

    #[tokio::test]
    async fn test_rendered_list_tracks_snapshots() {
        // GIVEN
        let store = Arc::new(MemoryTaskStore::new());
        let mut dashboard = open_dashboard(store.clone()).await;
        assert!(settle(&dashboard).await.is_empty());

        // WHEN a task is created through the form
        dashboard.form_mut().set_title("T1");
        dashboard.form_mut().set_description("D1");
        dashboard.form_mut().set_priority(Priority::Medium);
        let outcome = dashboard.submit().await;
        assert!(matches!(outcome, Submission::Created(_)));

        // THEN the next snapshot is the whole rendered list
        let tasks = settle(&dashboard).await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "T1");
        assert_eq!(tasks[0].user_email, owner());

        // WHEN a second writer touches the same collection
        let other = store
            .insert(
                crate::model::NewTask::validated("T2", "D2", Priority::Low, owner()).unwrap(),
            )
            .await
            .unwrap();

        // THEN the list is replaced, not merged
        let tasks = settle(&dashboard).await;
        assert_eq!(tasks.len(), 2);

        // WHEN that record goes away again
        dashboard.delete(&other).await;

        // THEN
        let tasks = settle(&dashboard).await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "T1");
    }

    #[tokio::test]
    async fn test_other_users_records_never_render() {
        // GIVEN
        let store = Arc::new(MemoryTaskStore::new());
        store
            .insert(
                crate::model::NewTask::validated(
                    "foreign",
                    "D",
                    Priority::Low,
                    UserEmail::try_from("b@y.com").unwrap(),
                )
                .unwrap(),
            )
            .await
            .unwrap();

        // WHEN
        let dashboard = open_dashboard(store).await;

        // THEN
        assert!(settle(&dashboard).await.is_empty());
    }

    #[tokio::test]
    async fn test_close_tears_the_subscription_down() {
        // GIVEN
        let store = Arc::new(MemoryTaskStore::new());
        let dashboard = open_dashboard(store.clone()).await;
        sleep(Duration::from_millis(20)).await;
        assert_eq!(store.subscriber_count(), 1);

        // WHEN
        dashboard.close();
        sleep(Duration::from_millis(20)).await;

        // THEN post-close emissions reach nobody
        assert_eq!(store.subscriber_count(), 0);
        store
            .insert(
                crate::model::NewTask::validated("T1", "D1", Priority::Low, owner()).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(store.subscriber_count(), 0);
    }
}
