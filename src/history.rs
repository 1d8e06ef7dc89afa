//! Per-day history view: the three documents a date can carry.

use serde::Serialize;

use crate::models::{DailyHealthLog, PredictionRecord, ToDoList};
use crate::session::UserContext;
use crate::store::{paths, DocumentStore, StoreError};

/// Everything stored for one date. Any of the three may be absent; a date
/// with a prediction but no to-do list is normal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHistory {
    pub date: String,
    pub health_log: Option<DailyHealthLog>,
    pub prediction: Option<PredictionRecord>,
    pub todo_list: Option<ToDoList>,
}

impl DayHistory {
    pub fn is_blank(&self) -> bool {
        self.health_log.is_none() && self.prediction.is_none() && self.todo_list.is_none()
    }
}

fn read_typed<T: serde::de::DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get_document(collection, key)? {
        Some(value) => Ok(Some(serde_json::from_value::<T>(value)?)),
        None => Ok(None),
    }
}

/// The full picture for one date.
pub fn get_day(
    store: &dyn DocumentStore,
    user: &UserContext,
    date: &str,
) -> Result<DayHistory, StoreError> {
    Ok(DayHistory {
        date: date.to_string(),
        health_log: read_typed(store, &paths::daily_health_logs(&user.uid), date)?,
        prediction: read_typed(store, &paths::health_predictions(&user.uid), date)?,
        todo_list: read_typed(store, &paths::daily_todo_lists(&user.uid), date)?,
    })
}

/// Dates with a stored health log, ascending. Drives the history picker.
pub fn logged_dates(
    store: &dyn DocumentStore,
    user: &UserContext,
) -> Result<Vec<String>, StoreError> {
    let docs = store.list_collection(&paths::daily_health_logs(&user.uid), "date")?;
    Ok(docs.into_iter().map(|doc| doc.key).collect())
}

/// The day's health stats as flat context text for the chat prompt,
/// empty if nothing was logged.
pub fn health_stats_text(log: &Option<DailyHealthLog>) -> String {
    match log {
        Some(log) => format!(
            "Heart rate: {}, Steps: {}, Calories: {}",
            log.heart_rate, log.steps, log.calories
        ),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Gender;
    use crate::models::HealthMetrics;
    use crate::store::SqliteStore;
    use crate::todo;

    const DATE: &str = "2026-08-28";

    fn fixture() -> (SqliteStore, UserContext) {
        (SqliteStore::open_in_memory().unwrap(), UserContext::new("u1"))
    }

    fn write_log(store: &SqliteStore, user: &UserContext, date: &str, heart_rate: u32) {
        let metrics = HealthMetrics {
            heart_rate,
            steps: 5000,
            calories: 1200,
            age: 30,
            gender: Gender::Male,
            existing_conditions: None,
        };
        let log = DailyHealthLog::from_metrics(&metrics, date);
        store
            .set_document(
                &paths::daily_health_logs(&user.uid),
                date,
                &serde_json::to_value(&log).unwrap(),
                true,
            )
            .unwrap();
    }

    #[test]
    fn blank_day_has_nothing() {
        let (store, user) = fixture();
        let day = get_day(&store, &user, DATE).unwrap();
        assert!(day.is_blank());
        assert_eq!(day.date, DATE);
    }

    #[test]
    fn partial_day_is_partial() {
        let (store, user) = fixture();
        todo::add_task(&store, &user, DATE, "Stretch").unwrap();

        let day = get_day(&store, &user, DATE).unwrap();
        assert!(day.health_log.is_none());
        assert!(day.prediction.is_none());
        assert_eq!(day.todo_list.unwrap().tasks.len(), 1);
    }

    #[test]
    fn full_day_reads_all_three() {
        let (store, user) = fixture();
        write_log(&store, &user, DATE, 80);
        todo::add_task(&store, &user, DATE, "Walk").unwrap();

        let day = get_day(&store, &user, DATE).unwrap();
        assert_eq!(day.health_log.unwrap().heart_rate, 80);
        assert!(day.todo_list.is_some());
    }

    #[test]
    fn logged_dates_ascend() {
        let (store, user) = fixture();
        write_log(&store, &user, "2026-08-28", 80);
        write_log(&store, &user, "2026-08-26", 70);
        write_log(&store, &user, "2026-08-27", 75);

        assert_eq!(
            logged_dates(&store, &user).unwrap(),
            vec!["2026-08-26", "2026-08-27", "2026-08-28"]
        );
    }

    #[test]
    fn stats_text_formats_log() {
        let log = DailyHealthLog {
            heart_rate: 80,
            steps: 5000,
            calories: 1200,
            date: DATE.into(),
        };
        assert_eq!(
            health_stats_text(&Some(log)),
            "Heart rate: 80, Steps: 5000, Calories: 1200"
        );
        assert_eq!(health_stats_text(&None), "");
    }
}
