use tracing::debug;

use super::notice::NoticeBoard;
use crate::model::{NewTask, Priority, Task, TaskId, TaskPatch, UserEmail};
use crate::store::TaskStore;

/// Outcome of a submit: which write was issued, or a refusal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Created(TaskId),
    Updated(TaskId),
    /// The write was issued and failed; a notice carries the reason.
    Failed,
    /// A required field was blank. The submit is refused without a store
    /// call and the inputs stay as they are.
    Rejected,
}

/// Create/edit input state machine. With no edit target the inputs
/// accumulate for a creation; `begin_edit` pre-fills them from an existing
/// task and the next submit updates that record in place.
///
/// Every write is fire-and-forget with respect to the task list: the list
/// changes only when the next subscription snapshot arrives.
pub struct TaskForm {
    title: String,
    description: String,
    priority: Priority,
    editing: Option<TaskId>,
    notices: NoticeBoard,
}

impl TaskForm {
    pub fn new(notices: NoticeBoard) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            priority: Priority::default(),
            editing: None,
            notices,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn edit_target(&self) -> Option<&TaskId> {
        self.editing.as_ref()
    }

    // Pure input edits, no side effects.

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    /// Pre-fills all editable fields from the given task and makes it the
    /// edit target.
    pub fn begin_edit(&mut self, task: &Task) {
        self.title = task.title.clone();
        self.description = task.description.clone();
        self.priority = task.priority;
        self.editing = Some(task.id.clone());
    }

    fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.description.trim().is_empty()
    }

    fn clear_inputs(&mut self) {
        self.title.clear();
        self.description.clear();
        self.priority = Priority::default();
    }

    /// Issues the creation or the in-place update for the current inputs.
    pub async fn submit<S: TaskStore>(&mut self, store: &S, user_email: &UserEmail) -> Submission {
        if !self.is_valid() {
            // deliberate guard, not data loss: refuse without a store call
            // and keep the inputs
            debug!("submit refused, required field is blank");
            return Submission::Rejected;
        }

        match self.editing.clone() {
            Some(id) => {
                let patch = TaskPatch::edit(&self.title, &self.description, self.priority);
                let result = store.update(&id, patch).await;
                // the transition back to a blank create form does not wait
                // for the write, the list catches up on the next snapshot
                self.editing = None;
                self.clear_inputs();
                match result {
                    Ok(()) => Submission::Updated(id),
                    Err(err) => {
                        self.notices.push(format!("Unable to update task: {}", err));
                        Submission::Failed
                    }
                }
            }
            None => {
                let draft = match NewTask::validated(
                    &self.title,
                    &self.description,
                    self.priority,
                    user_email.clone(),
                ) {
                    Ok(draft) => draft,
                    Err(_) => return Submission::Rejected,
                };
                match store.insert(draft).await {
                    Ok(id) => {
                        self.clear_inputs();
                        Submission::Created(id)
                    }
                    Err(err) => {
                        // inputs stay for a retry
                        self.notices.push(format!("Unable to create task: {}", err));
                        Submission::Failed
                    }
                }
            }
        }
    }

    /// Flips `completed` on the given task. Independent of the form state
    /// machine.
    pub async fn toggle_completed<S: TaskStore>(&self, store: &S, task: &Task) {
        if let Err(err) = store
            .update(&task.id, TaskPatch::completed(!task.completed))
            .await
        {
            self.notices.push(format!("Unable to update task: {}", err));
        }
    }

    /// Deletes the record. A deleted edit target falls back to a blank
    /// create form instead of going stale.
    pub async fn delete<S: TaskStore>(&mut self, store: &S, id: &str) {
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
            self.clear_inputs();
        }
        if let Err(err) = store.delete(id).await {
            self.notices.push(format!("Unable to delete task: {}", err));
        }
    }
}
