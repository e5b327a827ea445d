use serde::{Deserialize, Serialize};

use super::enums::InteractionSeverity;

/// Known interaction between two medications. The pair is unordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionFact {
    pub medication_a: String,
    pub medication_b: String,
    pub severity: InteractionSeverity,
    pub description: String,
}

impl InteractionFact {
    pub fn new(a: &str, b: &str, severity: InteractionSeverity, description: &str) -> Self {
        Self {
            medication_a: a.to_string(),
            medication_b: b.to_string(),
            severity,
            description: description.to_string(),
        }
    }

    /// The other side of the pair, if `name` is one side of it.
    pub fn partner_of(&self, name: &str) -> Option<&str> {
        if self.medication_a == name {
            Some(&self.medication_b)
        } else if self.medication_b == name {
            Some(&self.medication_a)
        } else {
            None
        }
    }
}

/// An interaction between a current medication and a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionMatch {
    pub current_med: String,
    pub severity: InteractionSeverity,
    pub description: String,
}
