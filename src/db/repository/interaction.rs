use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};

use super::medication::ensure_medication;
use crate::db::DatabaseError;
use crate::models::enums::InteractionSeverity;
use crate::models::*;

/// Store pairs in a canonical order so (A, B) and (B, A) are the same row.
fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Create or replace the interaction fact between two medications.
pub fn upsert_interaction(conn: &Connection, fact: &InteractionFact) -> Result<(), DatabaseError> {
    if fact.medication_a == fact.medication_b {
        return Err(DatabaseError::ConstraintViolation(format!(
            "a medication cannot interact with itself: {}",
            fact.medication_a
        )));
    }
    ensure_medication(conn, &fact.medication_a)?;
    ensure_medication(conn, &fact.medication_b)?;

    let (a, b) = canonical_pair(&fact.medication_a, &fact.medication_b);
    conn.execute(
        "INSERT INTO interactions (medication_a, medication_b, severity, description)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(medication_a, medication_b) DO UPDATE SET
            severity = excluded.severity,
            description = excluded.description",
        params![a, b, fact.severity.as_str(), fact.description],
    )?;
    Ok(())
}

/// Look up the interaction between two medications, in either order.
pub fn get_interaction(
    conn: &Connection,
    first: &str,
    second: &str,
) -> Result<Option<InteractionFact>, DatabaseError> {
    let (a, b) = canonical_pair(first, second);
    let row = conn
        .query_row(
            "SELECT medication_a, medication_b, severity, description
             FROM interactions WHERE medication_a = ?1 AND medication_b = ?2",
            params![a, b],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((medication_a, medication_b, severity, description)) => Ok(Some(InteractionFact {
            medication_a,
            medication_b,
            severity: InteractionSeverity::from_str(&severity)?,
            description,
        })),
        None => Ok(None),
    }
}

/// Every interaction between `candidate` and any of `current`, in the order given.
pub fn find_interactions(
    conn: &Connection,
    current: &[String],
    candidate: &str,
) -> Result<Vec<InteractionMatch>, DatabaseError> {
    let mut matches = Vec::new();
    for current_med in current {
        if let Some(fact) = get_interaction(conn, current_med, candidate)? {
            matches.push(InteractionMatch {
                current_med: current_med.clone(),
                severity: fact.severity,
                description: fact.description,
            });
        }
    }
    Ok(matches)
}
