//! Prediction submissions and stored prediction records.
//!
//! Validates raw form input, runs the prediction flow, and on success
//! persists two documents: the day's health log (merged) and the day's
//! prediction record (replaced). A flow failure writes nothing.

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;

use crate::flows::{self, GenerationError};
use crate::llm::LlmClient;
use crate::models::{DailyHealthLog, HealthMetrics, PredictionRecord};
use crate::schema::{health_metrics_shape, validate, Constraint, ValidationError, Violation};
use crate::session::UserContext;
use crate::store::{paths, DocumentStore, StoreError};

#[derive(Error, Debug)]
pub enum PredictionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validate a raw prediction form: coerce numeric strings, enforce ranges
/// and the gender enum, then deserialize into typed metrics.
pub fn validate_metrics(form: &Value) -> Result<HealthMetrics, ValidationError> {
    let coerced = validate(&health_metrics_shape(), form)?;
    serde_json::from_value(coerced).map_err(|e| {
        // Coerced output matching the shape always deserializes; a failure
        // here means the shape and the struct drifted apart.
        tracing::error!(error = %e, "Validated metrics failed to deserialize");
        ValidationError(vec![Violation {
            field: "form".into(),
            constraint: Constraint::WrongType { expected: "healthMetrics" },
        }])
    })
}

/// Submit validated metrics for a date.
///
/// Runs the flow first; only a successful result reaches the store. The
/// health log write merges so fields other modules put on the day's log
/// survive, while the prediction record is replaced wholesale.
pub fn submit_prediction(
    store: &dyn DocumentStore,
    llm: &dyn LlmClient,
    user: &UserContext,
    metrics: &HealthMetrics,
    date: &str,
) -> Result<PredictionRecord, PredictionError> {
    let result = flows::prediction::run(llm, metrics)?;
    let record = PredictionRecord::new(metrics.clone(), &result, Utc::now());

    let log = DailyHealthLog::from_metrics(metrics, date);
    store.set_document(
        &paths::daily_health_logs(&user.uid),
        date,
        &serde_json::to_value(&log).map_err(StoreError::from)?,
        true,
    )?;
    store.set_document(
        &paths::health_predictions(&user.uid),
        date,
        &serde_json::to_value(&record).map_err(StoreError::from)?,
        false,
    )?;

    tracing::info!(uid = %user.uid, date, "Prediction stored");
    Ok(record)
}

/// The stored prediction for a date, `None` if the user never submitted one.
pub fn get_prediction(
    store: &dyn DocumentStore,
    user: &UserContext,
    date: &str,
) -> Result<Option<PredictionRecord>, StoreError> {
    match store.get_document(&paths::health_predictions(&user.uid), date)? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}
