use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_SEVERITY: u8 = 1;
pub const MAX_SEVERITY: u8 = 10;

/// One entry of a child's append-only symptom log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomReport {
    pub id: Uuid,
    pub child_id: String,
    pub name: String,
    /// 1 (mild) to 10 (worst).
    pub severity: u8,
    pub notes: Option<String>,
    pub reported_at: DateTime<Utc>,
}

/// Name and severity pair surfaced by the emergency verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomSummary {
    pub name: String,
    pub severity: u8,
}

impl From<&SymptomReport> for SymptomSummary {
    fn from(report: &SymptomReport) -> Self {
        Self {
            name: report.name.clone(),
            severity: report.severity,
        }
    }
}
