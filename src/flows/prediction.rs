//! Prediction flow: health metrics in, `PredictionResult` out.
//!
//! One templated prompt, one model call, one shape gate. The caller owns
//! all persistence side effects (see `crate::predictions`).

use crate::llm::LlmClient;
use crate::models::{HealthMetrics, PredictionResult};
use crate::schema::{prediction_output_shape, validate};

use super::{extract_json_block, GenerationError};

pub const PREDICTION_SYSTEM_PROMPT: &str = "You are an AI health assistant that provides health predictions, lifestyle tips, and doctor references based on user data.";

/// Render the prediction prompt, substituting the six input fields verbatim.
pub fn build_prediction_prompt(metrics: &HealthMetrics) -> String {
    format!(
        r#"Based on the following health stats, provide a health prediction, suggest medication/lifestyle tips, and provide a doctor reference.

Heart Rate: {heart_rate}
Steps: {steps}
Calories: {calories}
Age: {age}
Gender: {gender}
Existing Conditions: {conditions}

Follow these instructions carefully:

1. Make a prediction based on these stats. For example, predict risk of dehydration, overexertion, etc.
2. Suggest medications and lifestyle tips relevant to the prediction. For example, suggest drinking more water if dehydration is predicted, or suggest resting if overexertion is predicted.
3. Provide a doctor reference with a name, specialization, and contact information for a doctor that can help with the prediction.

Respond with a JSON object containing "prediction" (string), "suggestedMedication" (string), and "doctorReference" (object with "name", "specialization", "contact")."#,
        heart_rate = metrics.heart_rate,
        steps = metrics.steps,
        calories = metrics.calories,
        age = metrics.age,
        gender = metrics.gender.as_str(),
        conditions = metrics.existing_conditions.as_deref().unwrap_or(""),
    )
}

/// Run the prediction flow. All-or-nothing: any call or shape failure
/// propagates as `GenerationError` and no result is produced.
pub fn run(
    llm: &dyn LlmClient,
    metrics: &HealthMetrics,
) -> Result<PredictionResult, GenerationError> {
    let prompt = build_prediction_prompt(metrics);
    let response = llm.generate(&prompt, PREDICTION_SYSTEM_PROMPT)?;

    let raw = extract_json_block(&response)?;
    let validated = validate(&prediction_output_shape(), &raw)?;

    let result: PredictionResult = serde_json::from_value(validated)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

    tracing::debug!(prediction_len = result.prediction.len(), "Prediction flow complete");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::models::enums::Gender;

    fn sample_metrics() -> HealthMetrics {
        HealthMetrics {
            heart_rate: 80,
            steps: 5000,
            calories: 1200,
            age: 30,
            gender: Gender::Male,
            existing_conditions: Some(String::new()),
        }
    }

    fn well_formed_payload() -> &'static str {
        r#"{"prediction": "Risk: mild dehydration", "suggestedMedication": "Drink water", "doctorReference": {"name": "Dr. A", "specialization": "GP", "contact": "555-0100"}}"#
    }

    #[test]
    fn prompt_substitutes_fields_verbatim() {
        let prompt = build_prediction_prompt(&sample_metrics());
        assert!(prompt.contains("Heart Rate: 80"));
        assert!(prompt.contains("Steps: 5000"));
        assert!(prompt.contains("Calories: 1200"));
        assert!(prompt.contains("Age: 30"));
        assert!(prompt.contains("Gender: male"));
        assert!(prompt.contains("Existing Conditions: \n"));
    }

    #[test]
    fn prompt_includes_conditions_text() {
        let mut metrics = sample_metrics();
        metrics.existing_conditions = Some("asthma, hay fever".into());
        let prompt = build_prediction_prompt(&metrics);
        assert!(prompt.contains("Existing Conditions: asthma, hay fever"));
    }

    #[test]
    fn well_formed_payload_passes_through() {
        let llm = MockLlmClient::new(well_formed_payload());
        let result = run(&llm, &sample_metrics()).unwrap();
        assert_eq!(result.prediction, "Risk: mild dehydration");
        assert_eq!(result.suggested_medication, "Drink water");
        assert_eq!(result.doctor_reference.name, "Dr. A");
        assert_eq!(result.doctor_reference.specialization, "GP");
        assert_eq!(result.doctor_reference.contact, "555-0100");
    }

    #[test]
    fn fenced_payload_accepted() {
        let fenced = format!("Here is my analysis:\n```json\n{}\n```", well_formed_payload());
        let llm = MockLlmClient::new(&fenced);
        let result = run(&llm, &sample_metrics()).unwrap();
        assert_eq!(result.suggested_medication, "Drink water");
    }

    #[test]
    fn missing_doctor_reference_fails() {
        let llm = MockLlmClient::new(
            r#"{"prediction": "Risk: overexertion", "suggestedMedication": "Rest"}"#,
        );
        let err = run(&llm, &sample_metrics()).unwrap_err();
        assert!(matches!(err, GenerationError::ShapeMismatch(_)));
    }

    #[test]
    fn call_failure_propagates() {
        let llm = MockLlmClient::failing("connection refused");
        let err = run(&llm, &sample_metrics()).unwrap_err();
        assert!(matches!(err, GenerationError::HttpClient(_)));
    }

    #[test]
    fn non_json_response_fails() {
        let llm = MockLlmClient::new("I cannot help with that.");
        let err = run(&llm, &sample_metrics()).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(_)));
    }
}
