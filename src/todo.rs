//! Date-keyed to-do lists.
//!
//! Each day owns one list document; tasks keep insertion order. Task ids
//! are generated here, never supplied by the caller.

use serde_json::json;
use thiserror::Error;

use crate::models::{Task, ToDoList};
use crate::session::UserContext;
use crate::store::{paths, DocumentStore, StoreError};

#[derive(Error, Debug)]
pub enum TodoError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No task with id {id}")]
    TaskNotFound { id: String },
}

/// The day's list; an empty list if nothing was stored for that date.
pub fn get_list(
    store: &dyn DocumentStore,
    user: &UserContext,
    date: &str,
) -> Result<ToDoList, StoreError> {
    match store.get_document(&paths::daily_todo_lists(&user.uid), date)? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(ToDoList {
            date: date.to_string(),
            tasks: Vec::new(),
        }),
    }
}

fn save_tasks(
    store: &dyn DocumentStore,
    user: &UserContext,
    date: &str,
    tasks: &[Task],
) -> Result<(), StoreError> {
    // Merge keeps any foreign fields on the day's document; the tasks
    // array itself is replaced whole.
    store.set_document(
        &paths::daily_todo_lists(&user.uid),
        date,
        &json!({ "date": date, "tasks": tasks }),
        true,
    )
}

/// Append a task to the day's list, creating the list on first use.
pub fn add_task(
    store: &dyn DocumentStore,
    user: &UserContext,
    date: &str,
    text: &str,
) -> Result<Task, StoreError> {
    let mut list = get_list(store, user, date)?;
    let task = Task::new(text);
    list.tasks.push(task.clone());
    save_tasks(store, user, date, &list.tasks)?;
    tracing::debug!(uid = %user.uid, date, task_id = %task.id, "Task added");
    Ok(task)
}

fn mutate_task<F>(
    store: &dyn DocumentStore,
    user: &UserContext,
    date: &str,
    task_id: &str,
    apply: F,
) -> Result<Task, TodoError>
where
    F: FnOnce(&mut Task),
{
    let mut list = get_list(store, user, date)?;
    let task = list
        .tasks
        .iter_mut()
        .find(|t| t.id == task_id)
        .ok_or_else(|| TodoError::TaskNotFound { id: task_id.to_string() })?;
    apply(task);
    let updated = task.clone();
    save_tasks(store, user, date, &list.tasks)?;
    Ok(updated)
}

/// Replace a task's text, keeping its position and completion state.
pub fn edit_task(
    store: &dyn DocumentStore,
    user: &UserContext,
    date: &str,
    task_id: &str,
    text: &str,
) -> Result<Task, TodoError> {
    mutate_task(store, user, date, task_id, |task| {
        task.task_text = text.to_string();
    })
}

/// Set a task's completion state. Idempotent: setting an already-set
/// state writes the same list again.
pub fn set_task_completed(
    store: &dyn DocumentStore,
    user: &UserContext,
    date: &str,
    task_id: &str,
    completed: bool,
) -> Result<Task, TodoError> {
    mutate_task(store, user, date, task_id, |task| {
        task.is_completed = completed;
    })
}

/// Remove a task from the day's list.
pub fn delete_task(
    store: &dyn DocumentStore,
    user: &UserContext,
    date: &str,
    task_id: &str,
) -> Result<(), TodoError> {
    let mut list = get_list(store, user, date)?;
    let before = list.tasks.len();
    list.tasks.retain(|t| t.id != task_id);
    if list.tasks.len() == before {
        return Err(TodoError::TaskNotFound { id: task_id.to_string() });
    }
    save_tasks(store, user, date, &list.tasks)?;
    tracing::debug!(uid = %user.uid, date, task_id, "Task deleted");
    Ok(())
}

/// The day's tasks as flat context text for the chat prompt, one
/// `[x]`/`[ ]`-prefixed line per task.
pub fn tasks_text(list: &ToDoList) -> String {
    list.tasks
        .iter()
        .map(|t| {
            let mark = if t.is_completed { "[x]" } else { "[ ]" };
            format!("{mark} {}", t.task_text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    const DATE: &str = "2026-08-28";

    fn fixture() -> (SqliteStore, UserContext) {
        (SqliteStore::open_in_memory().unwrap(), UserContext::new("u1"))
    }

    #[test]
    fn absent_list_is_empty() {
        let (store, user) = fixture();
        let list = get_list(&store, &user, DATE).unwrap();
        assert_eq!(list.date, DATE);
        assert!(list.tasks.is_empty());
    }

    #[test]
    fn add_creates_list_on_first_use() {
        let (store, user) = fixture();
        let task = add_task(&store, &user, DATE, "Drink water").unwrap();
        assert!(!task.is_completed);

        let list = get_list(&store, &user, DATE).unwrap();
        assert_eq!(list.tasks.len(), 1);
        assert_eq!(list.tasks[0].task_text, "Drink water");
    }

    #[test]
    fn tasks_keep_insertion_order() {
        let (store, user) = fixture();
        add_task(&store, &user, DATE, "first").unwrap();
        add_task(&store, &user, DATE, "second").unwrap();
        add_task(&store, &user, DATE, "third").unwrap();

        let texts: Vec<String> = get_list(&store, &user, DATE)
            .unwrap()
            .tasks
            .into_iter()
            .map(|t| t.task_text)
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn edit_replaces_text_only() {
        let (store, user) = fixture();
        let task = add_task(&store, &user, DATE, "Walk 500 steps").unwrap();
        set_task_completed(&store, &user, DATE, &task.id, true).unwrap();

        let edited = edit_task(&store, &user, DATE, &task.id, "Walk 5000 steps").unwrap();
        assert_eq!(edited.task_text, "Walk 5000 steps");
        assert!(edited.is_completed, "completion state survives an edit");
        assert_eq!(edited.id, task.id);
    }

    #[test]
    fn set_completed_is_idempotent() {
        let (store, user) = fixture();
        let task = add_task(&store, &user, DATE, "Stretch").unwrap();
        set_task_completed(&store, &user, DATE, &task.id, true).unwrap();
        let again = set_task_completed(&store, &user, DATE, &task.id, true).unwrap();
        assert!(again.is_completed);
    }

    #[test]
    fn double_toggle_restores_stored_document() {
        let (store, user) = fixture();
        let task = add_task(&store, &user, DATE, "Stretch").unwrap();
        let before = store
            .get_document("users/u1/dailyToDoLists", DATE)
            .unwrap()
            .unwrap();

        set_task_completed(&store, &user, DATE, &task.id, true).unwrap();
        set_task_completed(&store, &user, DATE, &task.id, false).unwrap();

        let after = store
            .get_document("users/u1/dailyToDoLists", DATE)
            .unwrap()
            .unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn delete_removes_only_target() {
        let (store, user) = fixture();
        let a = add_task(&store, &user, DATE, "a").unwrap();
        let b = add_task(&store, &user, DATE, "b").unwrap();

        delete_task(&store, &user, DATE, &a.id).unwrap();
        let list = get_list(&store, &user, DATE).unwrap();
        assert_eq!(list.tasks.len(), 1);
        assert_eq!(list.tasks[0].id, b.id);
    }

    #[test]
    fn missing_task_id_fails() {
        let (store, user) = fixture();
        add_task(&store, &user, DATE, "a").unwrap();

        let err = set_task_completed(&store, &user, DATE, "ghost", true).unwrap_err();
        assert!(matches!(err, TodoError::TaskNotFound { .. }));
        let err = delete_task(&store, &user, DATE, "ghost").unwrap_err();
        assert!(matches!(err, TodoError::TaskNotFound { .. }));
    }

    #[test]
    fn dates_are_isolated() {
        let (store, user) = fixture();
        add_task(&store, &user, "2026-08-27", "yesterday").unwrap();
        assert!(get_list(&store, &user, DATE).unwrap().tasks.is_empty());
    }

    #[test]
    fn tasks_text_marks_completion() {
        let (store, user) = fixture();
        let a = add_task(&store, &user, DATE, "Drink water").unwrap();
        add_task(&store, &user, DATE, "Stretch").unwrap();
        set_task_completed(&store, &user, DATE, &a.id, true).unwrap();

        let text = tasks_text(&get_list(&store, &user, DATE).unwrap());
        assert_eq!(text, "[x] Drink water\n[ ] Stretch");
    }
}
