use serde::{Deserialize, Serialize};

use crate::models::{InteractionMatch, SymptomSummary};

// ---------------------------------------------------------------------------
// EmergencyVerdict
// ---------------------------------------------------------------------------

/// Emergency status derived from the symptom reports of the trailing window.
/// Recomputed on every request, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyVerdict {
    pub is_emergency: bool,
    /// Reports at or above the critical threshold.
    pub critical_symptoms: Vec<SymptomSummary>,
    /// Every report in the window, critical ones included.
    pub recent_symptoms: Vec<SymptomSummary>,
}

// ---------------------------------------------------------------------------
// SafetyVerdict
// ---------------------------------------------------------------------------

/// Outcome of the allergy and interaction checks for one candidate medication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyVerdict {
    pub safe: bool,
    pub has_allergy: bool,
    /// The child's recorded allergies, populated only when `has_allergy`.
    pub allergies: Vec<String>,
    pub interactions: Vec<InteractionMatch>,
}

impl SafetyVerdict {
    /// Verdict for a candidate with nothing against it.
    pub fn clear() -> Self {
        Self {
            safe: true,
            has_allergy: false,
            allergies: Vec::new(),
            interactions: Vec::new(),
        }
    }
}

impl Default for SafetyVerdict {
    fn default() -> Self {
        Self::clear()
    }
}
