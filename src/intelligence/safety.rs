use crate::models::{Child, InteractionMatch};

use super::types::SafetyVerdict;

/// Whether `medication` contains any of the recorded allergies,
/// case-insensitively. "penicillin" flags "Amoxicillin-Penicillin"
/// but not "Amoxicillin". An empty entry matches every medication, so
/// blank allergies are dropped when a profile is written.
pub fn matches_allergy(medication: &str, allergies: &[String]) -> bool {
    let medication = medication.to_lowercase();
    allergies
        .iter()
        .any(|a| medication.contains(&a.to_lowercase()))
}

/// Combine the allergy check with the interactions already found for
/// `medication`. An unknown child has no allergies.
pub fn evaluate_safety(
    child: Option<&Child>,
    medication: &str,
    interactions: Vec<InteractionMatch>,
) -> SafetyVerdict {
    let recorded: &[String] = child.map(|c| c.allergies.as_slice()).unwrap_or(&[]);
    let has_allergy = matches_allergy(medication, recorded);

    SafetyVerdict {
        safe: !has_allergy && interactions.is_empty(),
        has_allergy,
        allergies: if has_allergy {
            recorded.to_vec()
        } else {
            Vec::new()
        },
        interactions,
    }
}
