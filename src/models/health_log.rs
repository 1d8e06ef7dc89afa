use serde::{Deserialize, Serialize};

use super::enums::Gender;

/// One prediction-form submission: the six fields the user enters.
/// Field names match the stored document shape (camelCase on the wire).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    pub heart_rate: u32,
    pub steps: u32,
    pub calories: u32,
    pub age: u32,
    pub gender: Gender,
    #[serde(default)]
    pub existing_conditions: Option<String>,
}

/// The day's health log document at `users/{uid}/dailyHealthLogs/{yyyy-MM-dd}`.
/// Written with merge semantics — a resubmission overwrites only these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyHealthLog {
    pub heart_rate: u32,
    pub steps: u32,
    pub calories: u32,
    pub date: String,
}

impl DailyHealthLog {
    pub fn from_metrics(metrics: &HealthMetrics, date: &str) -> Self {
        Self {
            heart_rate: metrics.heart_rate,
            steps: metrics.steps,
            calories: metrics.calories,
            date: date.to_string(),
        }
    }
}
