use chrono::{DateTime, Duration, Utc};

use crate::models::{SymptomReport, SymptomSummary};

use super::types::EmergencyVerdict;

/// Severity at or above which a single report makes the situation an emergency.
pub const CRITICAL_SEVERITY_THRESHOLD: u8 = 8;

/// Trailing window, in hours, of reports considered by the emergency check.
pub const EMERGENCY_WINDOW_HOURS: i64 = 24;

/// Start of the emergency window for an evaluation at `now` (exclusive).
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::hours(EMERGENCY_WINDOW_HOURS)
}

pub fn is_critical(severity: u8) -> bool {
    severity >= CRITICAL_SEVERITY_THRESHOLD
}

/// Derive the emergency verdict from a child's symptom reports.
///
/// Reports at or before the window start are ignored, so the result depends
/// only on the reports and `now` even if the caller passes a wider slice.
/// Input order is preserved in both lists.
pub fn evaluate_emergency(reports: &[SymptomReport], now: DateTime<Utc>) -> EmergencyVerdict {
    let since = window_start(now);

    let recent_symptoms: Vec<SymptomSummary> = reports
        .iter()
        .filter(|r| r.reported_at > since)
        .map(SymptomSummary::from)
        .collect();

    let critical_symptoms: Vec<SymptomSummary> = recent_symptoms
        .iter()
        .filter(|s| is_critical(s.severity))
        .cloned()
        .collect();

    EmergencyVerdict {
        is_emergency: !critical_symptoms.is_empty(),
        critical_symptoms,
        recent_symptoms,
    }
}
