use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{format_timestamp, from_json_list, parse_timestamp, to_json_list};
use crate::db::DatabaseError;
use crate::models::Child;

/// Create or update a child's profile. `updated_at` is stamped here.
/// Blank allergy entries are dropped before writing.
pub fn upsert_child(conn: &Connection, child: &Child) -> Result<Child, DatabaseError> {
    if child.weight_kg <= 0.0 || !child.weight_kg.is_finite() {
        return Err(DatabaseError::ConstraintViolation(format!(
            "weight_kg must be positive, got {}",
            child.weight_kg
        )));
    }

    let allergies: Vec<String> = child
        .allergies
        .iter()
        .filter(|a| !a.trim().is_empty())
        .cloned()
        .collect();

    let now = Utc::now();
    conn.execute(
        "INSERT INTO children (child_id, name, age, weight_kg, allergies, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(child_id) DO UPDATE SET
            name = excluded.name,
            age = excluded.age,
            weight_kg = excluded.weight_kg,
            allergies = excluded.allergies,
            updated_at = excluded.updated_at",
        params![
            child.child_id,
            child.name,
            child.age,
            child.weight_kg,
            to_json_list(&allergies)?,
            format_timestamp(&now),
        ],
    )?;

    Ok(Child {
        allergies,
        updated_at: Some(now),
        ..child.clone()
    })
}

pub fn get_child(conn: &Connection, child_id: &str) -> Result<Option<Child>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT child_id, name, age, weight_kg, allergies, updated_at
             FROM children WHERE child_id = ?1",
            params![child_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((child_id, name, age, weight_kg, allergies, updated_at)) => Ok(Some(Child {
            child_id,
            name,
            age,
            weight_kg,
            allergies: from_json_list(&allergies)?,
            updated_at: Some(parse_timestamp(&updated_at)?),
        })),
        None => Ok(None),
    }
}

pub fn child_exists(conn: &Connection, child_id: &str) -> Result<bool, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM children WHERE child_id = ?1",
        params![child_id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Fails with `NotFound` unless the child has a profile.
pub(crate) fn require_child(conn: &Connection, child_id: &str) -> Result<(), DatabaseError> {
    if child_exists(conn, child_id)? {
        Ok(())
    } else {
        Err(DatabaseError::NotFound {
            entity_type: "Child".into(),
            id: child_id.into(),
        })
    }
}
