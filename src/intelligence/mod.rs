//! Health risk evaluation: emergency detection and medication safety.
//!
//! Verdicts are derived from the record store on every call. The pure
//! cores (`evaluate_emergency`, `evaluate_safety`) take records and time
//! explicitly; `RiskEvaluator` fetches the records and wraps them.

pub mod emergency;
pub mod safety;
pub mod types;

pub use emergency::*;
pub use safety::*;
pub use types::*;

use chrono::{DateTime, Utc};

use crate::store::{RecordStore, StoreError};

/// Stateless evaluator over a borrowed record store.
pub struct RiskEvaluator<'s, S: RecordStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: RecordStore + ?Sized> RiskEvaluator<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Emergency status over the last 24 hours, evaluated now.
    pub fn check_emergency_status(&self, child_id: &str) -> Result<EmergencyVerdict, StoreError> {
        self.check_emergency_status_at(child_id, Utc::now())
    }

    pub fn check_emergency_status_at(
        &self,
        child_id: &str,
        now: DateTime<Utc>,
    ) -> Result<EmergencyVerdict, StoreError> {
        let reports = self.store.recent_symptoms(child_id, window_start(now))?;
        tracing::debug!(child_id = %child_id, count = reports.len(), "Loaded windowed symptom reports");

        let verdict = evaluate_emergency(&reports, now);
        if verdict.is_emergency {
            tracing::warn!(
                child_id = %child_id,
                critical = verdict.critical_symptoms.len(),
                "Critical symptoms in the last {EMERGENCY_WINDOW_HOURS}h"
            );
        }
        Ok(verdict)
    }

    /// Allergy and interaction check for giving `medication` to the child.
    pub fn check_medication_safety(
        &self,
        child_id: &str,
        medication: &str,
    ) -> Result<SafetyVerdict, StoreError> {
        let child = self.store.get_child(child_id)?;

        let current: Vec<String> = self
            .store
            .active_medications(child_id)?
            .into_iter()
            .map(|m| m.medication)
            .collect();

        let interactions = if current.is_empty() {
            Vec::new()
        } else {
            self.store.interactions_with(&current, medication)?
        };

        let verdict = evaluate_safety(child.as_ref(), medication, interactions);
        if !verdict.safe {
            tracing::warn!(
                child_id = %child_id,
                medication = %medication,
                has_allergy = verdict.has_allergy,
                interactions = verdict.interactions.len(),
                "Medication flagged as unsafe"
            );
        }
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::knowledge::initialize_knowledge_graph;
    use crate::models::enums::InteractionSeverity;
    use crate::models::{Child, NewMedication, SymptomSummary};
    use crate::store::testing::UnavailableStore;
    use crate::store::SqliteRecordStore;

    fn store_with_emma() -> SqliteRecordStore {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        store
            .upsert_child(&Child::new("emma", "Emma", 5, 18.5).with_allergies(["penicillin"]))
            .unwrap();
        store
    }

    fn give(store: &SqliteRecordStore, medication: &str) {
        store
            .add_medication(&NewMedication {
                child_id: "emma".into(),
                name: medication.into(),
                dosage: "100mg".into(),
                frequency: "Every 6 hours".into(),
                start_date: None,
            })
            .unwrap();
    }

    #[test]
    fn no_symptoms_is_not_emergency() {
        let store = store_with_emma();
        let verdict = RiskEvaluator::new(&store).check_emergency_status("emma").unwrap();
        assert_eq!(verdict, EmergencyVerdict::default());
    }

    #[test]
    fn unknown_child_is_empty_not_error() {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        let evaluator = RiskEvaluator::new(&store);
        assert!(!evaluator.check_emergency_status("ghost").unwrap().is_emergency);
        assert!(evaluator.check_medication_safety("ghost", "Ibuprofen").unwrap().safe);
    }

    #[test]
    fn emma_with_moderate_fever_is_not_emergency() {
        let store = store_with_emma();
        let now = Utc::now();
        store
            .log_symptom("emma", "fever_c", 7, Some("38.9C"), now - Duration::hours(1))
            .unwrap();

        let verdict = RiskEvaluator::new(&store)
            .check_emergency_status_at("emma", now)
            .unwrap();
        assert!(!verdict.is_emergency);
        assert!(verdict.critical_symptoms.is_empty());
        assert_eq!(
            verdict.recent_symptoms,
            vec![SymptomSummary {
                name: "fever_c".into(),
                severity: 7
            }]
        );
    }

    #[test]
    fn breathing_difficulty_nine_is_emergency() {
        let store = store_with_emma();
        let now = Utc::now();
        store
            .log_symptom("emma", "breathing_difficulty", 9, None, now - Duration::minutes(5))
            .unwrap();

        let verdict = RiskEvaluator::new(&store)
            .check_emergency_status_at("emma", now)
            .unwrap();
        assert!(verdict.is_emergency);
        assert_eq!(
            verdict.critical_symptoms,
            vec![SymptomSummary {
                name: "breathing_difficulty".into(),
                severity: 9
            }]
        );
    }

    #[test]
    fn old_critical_report_does_not_count() {
        let store = store_with_emma();
        let now = Utc::now();
        store
            .log_symptom("emma", "breathing_difficulty", 10, None, now - Duration::hours(30))
            .unwrap();

        let verdict = RiskEvaluator::new(&store)
            .check_emergency_status_at("emma", now)
            .unwrap();
        assert!(!verdict.is_emergency);
        assert!(verdict.recent_symptoms.is_empty());
    }

    #[test]
    fn ibuprofen_is_safe_for_emma() {
        let store = store_with_emma();
        initialize_knowledge_graph(&store).unwrap();
        give(&store, "Ibuprofen");

        let verdict = RiskEvaluator::new(&store)
            .check_medication_safety("emma", "Ibuprofen")
            .unwrap();
        assert!(verdict.safe);
        assert!(!verdict.has_allergy);
        assert!(verdict.interactions.is_empty());
    }

    #[test]
    fn penicillin_allergy_flags_compound_name_only() {
        let store = store_with_emma();
        let evaluator = RiskEvaluator::new(&store);

        let flagged = evaluator
            .check_medication_safety("emma", "Amoxicillin-Penicillin")
            .unwrap();
        assert!(!flagged.safe);
        assert!(flagged.has_allergy);
        assert_eq!(flagged.allergies, vec!["penicillin".to_string()]);

        let plain = evaluator.check_medication_safety("emma", "Amoxicillin").unwrap();
        assert!(plain.safe);
    }

    #[test]
    fn interaction_is_symmetric() {
        let store = store_with_emma();
        initialize_knowledge_graph(&store).unwrap();
        let evaluator = RiskEvaluator::new(&store);

        give(&store, "Ibuprofen");
        let forward = evaluator.check_medication_safety("emma", "Aspirin").unwrap();
        assert!(!forward.safe);
        assert_eq!(forward.interactions.len(), 1);
        assert_eq!(forward.interactions[0].current_med, "Ibuprofen");
        assert_eq!(forward.interactions[0].severity, InteractionSeverity::Moderate);

        store.stop_medication("emma", "Ibuprofen").unwrap();
        give(&store, "Aspirin");
        let reverse = evaluator.check_medication_safety("emma", "Ibuprofen").unwrap();
        assert!(!reverse.safe);
        assert_eq!(reverse.interactions[0].current_med, "Aspirin");
        assert_eq!(reverse.interactions[0].description, "Increased bleeding risk");
    }

    #[test]
    fn stopped_medication_does_not_interact() {
        let store = store_with_emma();
        initialize_knowledge_graph(&store).unwrap();
        give(&store, "Ibuprofen");
        store.stop_medication("emma", "Ibuprofen").unwrap();

        let verdict = RiskEvaluator::new(&store)
            .check_medication_safety("emma", "Aspirin")
            .unwrap();
        assert!(verdict.safe);
    }

    #[test]
    fn unavailable_store_propagates() {
        let evaluator = RiskEvaluator::new(&UnavailableStore);
        assert!(evaluator
            .check_emergency_status("emma")
            .unwrap_err()
            .is_unavailable());
        assert!(evaluator
            .check_medication_safety("emma", "Ibuprofen")
            .unwrap_err()
            .is_unavailable());
    }

    #[test]
    fn corrupt_allergy_record_is_error_not_safe() {
        let store = store_with_emma();
        store
            .with_connection(|conn| {
                conn.execute(
                    "UPDATE children SET allergies = 'penicillin' WHERE child_id = 'emma'",
                    [],
                )?;
                Ok(())
            })
            .unwrap();

        let err = RiskEvaluator::new(&store)
            .check_medication_safety("emma", "Amoxicillin-Penicillin")
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Database(crate::db::DatabaseError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn blank_allergy_is_not_stored() {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        store
            .upsert_child(&Child::new("c", "C", 4, 16.0).with_allergies([""]))
            .unwrap();

        let verdict = RiskEvaluator::new(&store)
            .check_medication_safety("c", "Ibuprofen")
            .unwrap();
        assert!(verdict.safe);
        assert!(store.get_child("c").unwrap().unwrap().allergies.is_empty());
    }
}
