//! Reference knowledge loaded by the offline dataset job.

use serde::{Deserialize, Serialize};

/// Triage thresholds and advice for one symptom.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymptomRule {
    pub symptom_name: String,
    pub mild_threshold: Option<f64>,
    pub high_threshold: Option<f64>,
    pub spike_threshold: Option<f64>,
    pub threshold_gte: Option<f64>,
    pub is_boolean: Option<bool>,
    pub advice_mild: Option<String>,
    pub advice_high: Option<String>,
    pub advice_spike: Option<String>,
    pub advice: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    pub category: Option<String>,
    pub age_range: Option<String>,
}

/// Post-procedure care instructions for a condition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AftercareGuide {
    pub condition: String,
    pub overview: Option<String>,
    pub pain_management: Option<String>,
    pub activity_restrictions: Option<String>,
    pub diet_instructions: Option<String>,
    pub wound_care: Option<String>,
    pub red_flags: Vec<String>,
    pub follow_up: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleDialogue {
    pub query: String,
    pub expected_answer: String,
}

/// Synthetic check-in row. Kept as text because the source data is loosely typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub timestamp: String,
    pub child_id: String,
    pub symptom: String,
    pub severity: Option<String>,
    pub action: Option<String>,
}
