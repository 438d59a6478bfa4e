#[cfg(test)]
mod tests {

    use std::convert::TryFrom;
    use std::sync::Arc;
    use std::time::Duration;

    use rand::distributions::Alphanumeric;
    use rand::{thread_rng, Rng};
    use tokio::time::sleep;

    use crate::auth::{IdentityProvider, MemoryIdentityProvider};
    use crate::controller::{Dashboard, NoticeBoard, Submission};
    use crate::model::{NewTask, Priority, UserEmail};
    use crate::store::{MemoryTaskStore, TaskQuery, TaskStore};

    fn random_email() -> String {
        let local: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();
        format!("{}@x.com", local.to_lowercase())
    }

    async fn settle() {
        // let the snapshot loops catch up, increase if needed
        sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_e2e_task_lifecycle() {
        // GIVEN a registered identity with an open dashboard
        let provider = MemoryIdentityProvider::new();
        let session = provider.sign_up("a@x.com", "secret1").await.unwrap();
        let store = Arc::new(MemoryTaskStore::new());
        let mut dashboard = Dashboard::open(
            store.clone(),
            session.user_email.clone(),
            NoticeBoard::new(),
        )
        .await
        .unwrap();

        // WHEN a task is created
        dashboard.form_mut().set_title("T1");
        dashboard.form_mut().set_description("D1");
        dashboard.form_mut().set_priority(Priority::Low);
        let outcome = dashboard.submit().await;
        assert!(matches!(outcome, Submission::Created(_)));
        settle().await;

        // THEN the snapshot shows one uncompleted record owned by the user
        let tasks = dashboard.tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "T1");
        assert_eq!(tasks[0].description, "D1");
        assert_eq!(tasks[0].priority, Priority::Low);
        assert!(!tasks[0].completed);
        assert_eq!(tasks[0].user_email.as_str(), "a@x.com");

        // WHEN it is toggled
        dashboard.toggle_completed(&tasks[0]).await;
        settle().await;

        // THEN
        let tasks = dashboard.tasks();
        assert!(tasks[0].completed);

        // WHEN it is deleted
        let id = tasks[0].id.clone();
        dashboard.delete(&id).await;
        settle().await;

        // THEN the snapshot is empty
        assert!(dashboard.tasks().is_empty());
        dashboard.close();
    }

    #[tokio::test]
    async fn test_e2e_lists_stay_scoped_per_user() {
        // GIVEN two identities sharing one collection
        let provider = MemoryIdentityProvider::new();
        let store = Arc::new(MemoryTaskStore::new());
        let first = provider.sign_up(&random_email(), "secret1").await.unwrap();
        let second = provider.sign_up(&random_email(), "secret2").await.unwrap();

        let mut board_one = Dashboard::open(
            store.clone(),
            first.user_email.clone(),
            NoticeBoard::new(),
        )
        .await
        .unwrap();
        let board_two = Dashboard::open(
            store.clone(),
            second.user_email.clone(),
            NoticeBoard::new(),
        )
        .await
        .unwrap();

        // WHEN both create tasks concurrently
        let mut handles = vec![];
        for (title, owner) in [("one-a", &first), ("one-b", &first), ("two-a", &second)] {
            let store = store.clone();
            let fields = NewTask::validated(
                title,
                "description",
                Priority::Medium,
                owner.user_email.clone(),
            )
            .unwrap();
            handles.push(tokio::spawn(async move {
                store.insert(fields).await.unwrap()
            }));
        }
        futures::future::join_all(handles).await;
        settle().await;

        // THEN each dashboard renders only its own records
        let one = board_one.tasks();
        let two = board_two.tasks();
        assert_eq!(one.len(), 2);
        assert_eq!(two.len(), 1);
        assert!(one.iter().all(|task| task.user_email == first.user_email));
        assert!(two.iter().all(|task| task.user_email == second.user_email));

        // AND a delete on one side never leaks to the other
        let id = one[0].id.clone();
        board_one.delete(&id).await;
        settle().await;
        assert_eq!(board_one.tasks().len(), 1);
        assert_eq!(board_two.tasks().len(), 1);

        board_one.close();
        board_two.close();
    }

    #[tokio::test]
    async fn test_e2e_sign_out_ends_the_session_and_redirects() {
        use std::sync::Mutex;

        use crate::controller::{GuardState, Navigator, RouteGuard};

        struct RecordingNavigator {
            paths: Mutex<Vec<String>>,
        }

        impl Navigator for RecordingNavigator {
            fn navigate(&self, path: &str) {
                self.paths.lock().unwrap().push(path.to_string());
            }
        }

        // GIVEN a signed-in identity observed by the route guard
        let provider = Arc::new(MemoryIdentityProvider::new());
        provider.sign_up("a@x.com", "secret1").await.unwrap();
        let navigator = Arc::new(RecordingNavigator {
            paths: Mutex::new(Vec::new()),
        });
        let guard = RouteGuard::new(navigator.clone(), "/login");
        assert_eq!(guard.state(), &GuardState::Unknown);
        let guard_loop = tokio::spawn(guard.run(provider.on_session_change()));
        settle().await;
        assert!(navigator.paths.lock().unwrap().is_empty());

        // WHEN
        provider.sign_out().await.unwrap();
        settle().await;

        // THEN one redirect to the login view
        assert_eq!(*navigator.paths.lock().unwrap(), vec!["/login".to_string()]);
        guard_loop.abort();
    }

    #[tokio::test]
    async fn test_e2e_unauthenticated_dashboard_degrades_to_empty() {
        // a dashboard can only be opened for an explicit identity; the
        // unauthenticated query itself must stay harmless
        let store = Arc::new(MemoryTaskStore::new());
        store
            .insert(
                NewTask::validated(
                    "T1",
                    "D1",
                    Priority::Low,
                    UserEmail::try_from("a@x.com").unwrap(),
                )
                .unwrap(),
            )
            .await
            .unwrap();

        let mut subscription = store
            .subscribe(TaskQuery::unauthenticated())
            .await
            .unwrap();
        assert!(subscription.recv().await.unwrap().is_empty());
    }
}
