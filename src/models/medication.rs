use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::RecordSource;

/// Reference medication node. Identity is the name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub forms: Vec<String>,
    pub use_description: Option<String>,
    pub safety_info: Option<String>,
    pub storage: Option<String>,
    pub notes: Option<String>,
    pub source: RecordSource,
}

/// Input for linking a medication to a child.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMedication {
    pub child_id: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    /// Defaults to today (UTC) when absent.
    pub start_date: Option<NaiveDate>,
}

/// The "takes" relation between a child and a medication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationAssignment {
    pub child_id: String,
    pub medication: Medication,
    pub start_date: NaiveDate,
    pub dosage: String,
    pub frequency: String,
    pub active: bool,
}

/// A medication the child currently takes, as shown to the prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveMedication {
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub start_date: NaiveDate,
}
