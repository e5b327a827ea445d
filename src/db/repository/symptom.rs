use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::child::require_child;
use super::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::enums::RecordSource;
use crate::models::*;

/// Insert the symptom node if it does not exist yet.
pub fn ensure_symptom(
    conn: &Connection,
    name: &str,
    source: RecordSource,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO symptoms (name, source) VALUES (?1, ?2)
         ON CONFLICT(name) DO NOTHING",
        params![name, source.as_str()],
    )?;
    Ok(())
}

/// Append a symptom report to the child's log.
pub fn log_symptom(
    conn: &Connection,
    child_id: &str,
    symptom_name: &str,
    severity: u8,
    notes: Option<&str>,
    reported_at: DateTime<Utc>,
) -> Result<SymptomReport, DatabaseError> {
    if !(MIN_SEVERITY..=MAX_SEVERITY).contains(&severity) {
        return Err(DatabaseError::ConstraintViolation(format!(
            "severity must be between {MIN_SEVERITY} and {MAX_SEVERITY}, got {severity}"
        )));
    }
    require_child(conn, child_id)?;
    ensure_symptom(conn, symptom_name, RecordSource::Manual)?;

    let report = SymptomReport {
        id: Uuid::new_v4(),
        child_id: child_id.to_string(),
        name: symptom_name.to_string(),
        severity,
        notes: notes.filter(|n| !n.is_empty()).map(str::to_string),
        reported_at,
    };

    conn.execute(
        "INSERT INTO symptom_reports (id, child_id, symptom_name, severity, notes, reported_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            report.id.to_string(),
            report.child_id,
            report.name,
            report.severity,
            report.notes,
            format_timestamp(&report.reported_at),
        ],
    )?;

    Ok(report)
}

/// Reports for a child strictly after `since`, oldest first.
pub fn get_symptoms_since(
    conn: &Connection,
    child_id: &str,
    since: &DateTime<Utc>,
) -> Result<Vec<SymptomReport>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, child_id, symptom_name, severity, notes, reported_at
         FROM symptom_reports
         WHERE child_id = ?1 AND reported_at > ?2
         ORDER BY reported_at ASC",
    )?;

    let rows = stmt.query_map(params![child_id, format_timestamp(since)], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, u8>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut reports = Vec::new();
    for row in rows {
        let (id, child_id, name, severity, notes, reported_at) = row?;
        reports.push(SymptomReport {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            child_id,
            name,
            severity,
            notes,
            reported_at: parse_timestamp(&reported_at)?,
        });
    }
    Ok(reports)
}
