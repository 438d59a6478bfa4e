use crate::model::Task;
use crate::store::{Snapshot, TaskDocument};

/// Pure projection from a delivered snapshot into the ordered render state.
/// The snapshot's order is kept as-is; nothing is reordered, deduplicated or
/// dropped, and the caller replaces its previous list wholesale. That
/// replacement costs O(n) per delivery, which is accepted over diffing by
/// id.
pub fn reconcile(snapshot: Snapshot) -> Vec<Task> {
    snapshot.into_iter().map(into_task).collect()
}

fn into_task(doc: TaskDocument) -> Task {
    let TaskDocument { id, fields } = doc;
    Task {
        id,
        title: fields.title,
        description: fields.description,
        priority: fields.priority,
        completed: fields.completed,
        user_email: fields.user_email,
        created_at: fields.created_at,
    }
}
