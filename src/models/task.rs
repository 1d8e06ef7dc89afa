use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single to-do entry. Belongs to a date-keyed list; insertion order
/// is display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub task_text: String,
    pub is_completed: bool,
}

impl Task {
    pub fn new(text: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_text: text.to_string(),
            is_completed: false,
        }
    }
}

/// The day's to-do document at `users/{uid}/dailyToDoLists/{yyyy-MM-dd}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToDoList {
    pub date: String,
    pub tasks: Vec<Task>,
}
