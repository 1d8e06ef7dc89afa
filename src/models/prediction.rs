use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::health_log::HealthMetrics;

/// Doctor reference produced by the prediction flow. Never user-created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorReference {
    pub name: String,
    pub specialization: String,
    pub contact: String,
}

/// The prediction flow's validated output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub prediction: String,
    pub suggested_medication: String,
    pub doctor_reference: DoctorReference,
}

/// The stored prediction document at `users/{uid}/healthPredictions/{yyyy-MM-dd}`.
/// One per date; a resubmission replaces the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub input_stats: HealthMetrics,
    pub prediction_report: String,
    pub suggested_medication: String,
    pub doctor_reference: DoctorReference,
    pub timestamp: DateTime<Utc>,
}

impl PredictionRecord {
    pub fn new(input: HealthMetrics, result: &PredictionResult, timestamp: DateTime<Utc>) -> Self {
        Self {
            input_stats: input,
            prediction_report: result.prediction.clone(),
            suggested_medication: result.suggested_medication.clone(),
            doctor_reference: result.doctor_reference.clone(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Gender;

    fn sample_result() -> PredictionResult {
        PredictionResult {
            prediction: "Risk: mild dehydration".into(),
            suggested_medication: "Drink water".into(),
            doctor_reference: DoctorReference {
                name: "Dr. A".into(),
                specialization: "GP".into(),
                contact: "555-0100".into(),
            },
        }
    }

    #[test]
    fn result_wire_fields_are_camel_case() {
        let json = serde_json::to_value(sample_result()).unwrap();
        assert_eq!(json["suggestedMedication"], "Drink water");
        assert_eq!(json["doctorReference"]["specialization"], "GP");
    }

    #[test]
    fn record_copies_flow_output() {
        let input = HealthMetrics {
            heart_rate: 80,
            steps: 5000,
            calories: 1200,
            age: 30,
            gender: Gender::Male,
            existing_conditions: None,
        };
        let result = sample_result();
        let record = PredictionRecord::new(input.clone(), &result, Utc::now());
        assert_eq!(record.input_stats, input);
        assert_eq!(record.prediction_report, result.prediction);
        assert_eq!(record.doctor_reference, result.doctor_reference);
    }

    #[test]
    fn record_round_trips_through_json() {
        let input = HealthMetrics {
            heart_rate: 70,
            steps: 100,
            calories: 50,
            age: 55,
            gender: Gender::Female,
            existing_conditions: Some("asthma".into()),
        };
        let record = PredictionRecord::new(input, &sample_result(), Utc::now());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["inputStats"]["existingConditions"], "asthma");
        let back: PredictionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
