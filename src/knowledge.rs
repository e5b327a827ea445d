//! Built-in reference knowledge seeded into every record store.

use crate::models::enums::InteractionSeverity;
use crate::models::InteractionFact;
use crate::store::{RecordStore, StoreError};

/// Interaction facts every installation starts with.
pub fn default_interactions() -> Vec<InteractionFact> {
    vec![
        InteractionFact::new(
            "Ibuprofen",
            "Aspirin",
            InteractionSeverity::Moderate,
            "Increased bleeding risk",
        ),
        InteractionFact::new(
            "Amoxicillin",
            "Warfarin",
            InteractionSeverity::High,
            "May increase bleeding",
        ),
    ]
}

/// Upsert the built-in interaction facts. Safe to run repeatedly.
/// Returns the number of facts written.
pub fn initialize_knowledge_graph<S: RecordStore + ?Sized>(store: &S) -> Result<usize, StoreError> {
    let facts = default_interactions();
    for fact in &facts {
        store.upsert_interaction(fact)?;
    }
    tracing::info!(count = facts.len(), "Knowledge graph initialized");
    Ok(facts.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::store::testing::UnavailableStore;
    use crate::store::SqliteRecordStore;

    #[test]
    fn seeding_is_idempotent() {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        assert_eq!(initialize_knowledge_graph(&store).unwrap(), 2);
        assert_eq!(initialize_knowledge_graph(&store).unwrap(), 2);

        let count: i64 = store
            .with_connection(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM interactions", [], |r| r.get(0))?)
            })
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn seeded_facts_are_queryable_both_ways() {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        initialize_knowledge_graph(&store).unwrap();

        let fact = store
            .with_connection(|conn| db::get_interaction(conn, "Warfarin", "Amoxicillin"))
            .unwrap()
            .unwrap();
        assert_eq!(fact.severity, InteractionSeverity::High);
        assert_eq!(fact.description, "May increase bleeding");
    }

    #[test]
    fn seeding_fails_when_store_is_down() {
        assert!(initialize_knowledge_graph(&UnavailableStore)
            .unwrap_err()
            .is_unavailable());
    }
}
