use std::str::FromStr;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::child::require_child;
use super::{from_json_list, parse_date, to_json_list};
use crate::db::DatabaseError;
use crate::models::enums::RecordSource;
use crate::models::*;

/// Insert the medication node if it does not exist yet.
pub fn ensure_medication(conn: &Connection, name: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO medications (name) VALUES (?1)",
        params![name],
    )?;
    Ok(())
}

/// Upsert the reference fields of a medication (guide data).
/// Dosage and frequency set by `add_medication` are left untouched.
pub fn upsert_medication_reference(conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medications (name, forms, use_description, safety_info, storage, notes, source)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(name) DO UPDATE SET
            forms = excluded.forms,
            use_description = excluded.use_description,
            safety_info = excluded.safety_info,
            storage = excluded.storage,
            notes = excluded.notes,
            source = excluded.source",
        params![
            med.name,
            to_json_list(&med.forms)?,
            med.use_description,
            med.safety_info,
            med.storage,
            med.notes,
            med.source.as_str(),
        ],
    )?;
    Ok(())
}

pub fn get_medication(conn: &Connection, name: &str) -> Result<Option<Medication>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT name, dosage, frequency, forms, use_description, safety_info, storage, notes, source
             FROM medications WHERE name = ?1",
            params![name],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, Option<String>>(7)?,
                    row.get::<_, String>(8)?,
                ))
            },
        )
        .optional()?;

    let Some((name, dosage, frequency, forms, use_description, safety_info, storage, notes, source)) =
        row
    else {
        return Ok(None);
    };

    Ok(Some(Medication {
        name,
        dosage,
        frequency,
        forms: from_json_list(&forms)?,
        use_description,
        safety_info,
        storage,
        notes,
        source: RecordSource::from_str(&source)?,
    }))
}

/// Link a medication to a child as an active "takes" relation.
///
/// The medication node keeps the latest dosage/frequency. Re-adding the same
/// medication with the same start date and dosage reactivates the existing
/// relation instead of creating a second one.
pub fn add_medication(
    conn: &Connection,
    new: &NewMedication,
) -> Result<MedicationAssignment, DatabaseError> {
    require_child(conn, &new.child_id)?;
    let start_date = new.start_date.unwrap_or_else(|| Utc::now().date_naive());

    conn.execute(
        "INSERT INTO medications (name, dosage, frequency) VALUES (?1, ?2, ?3)
         ON CONFLICT(name) DO UPDATE SET dosage = excluded.dosage, frequency = excluded.frequency",
        params![new.name, new.dosage, new.frequency],
    )?;

    conn.execute(
        "INSERT INTO takes (child_id, medication_name, start_date, dosage, frequency, active)
         VALUES (?1, ?2, ?3, ?4, ?5, 1)
         ON CONFLICT(child_id, medication_name, start_date, dosage) DO UPDATE SET
            frequency = excluded.frequency,
            active = 1",
        params![
            new.child_id,
            new.name,
            start_date.to_string(),
            new.dosage,
            new.frequency,
        ],
    )?;

    let medication = get_medication(conn, &new.name)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "Medication".into(),
        id: new.name.clone(),
    })?;

    Ok(MedicationAssignment {
        child_id: new.child_id.clone(),
        medication,
        start_date,
        dosage: new.dosage.clone(),
        frequency: new.frequency.clone(),
        active: true,
    })
}

/// Deactivate every active "takes" relation between the child and the medication.
/// Returns the number of relations deactivated.
pub fn stop_medication(
    conn: &Connection,
    child_id: &str,
    medication_name: &str,
) -> Result<usize, DatabaseError> {
    let updated = conn.execute(
        "UPDATE takes SET active = 0
         WHERE child_id = ?1 AND medication_name = ?2 AND active = 1",
        params![child_id, medication_name],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "ActiveMedication".into(),
            id: format!("{child_id}/{medication_name}"),
        });
    }
    Ok(updated)
}

/// Active medications for a child, most recently started first.
pub fn get_active_medications(
    conn: &Connection,
    child_id: &str,
) -> Result<Vec<ActiveMedication>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT medication_name, dosage, frequency, start_date
         FROM takes WHERE child_id = ?1 AND active = 1
         ORDER BY start_date DESC, id DESC",
    )?;

    let rows = stmt.query_map(params![child_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut meds = Vec::new();
    for row in rows {
        let (medication, dosage, frequency, start_date) = row?;
        meds.push(ActiveMedication {
            medication,
            dosage,
            frequency,
            start_date: parse_date(&start_date)?,
        });
    }
    Ok(meds)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::repository::upsert_child;
    use crate::db::sqlite::open_memory_database;

    fn test_db() -> Connection {
        let conn = open_memory_database().expect("in-memory DB");
        upsert_child(&conn, &Child::new("emma", "Emma", 5, 18.5)).unwrap();
        conn
    }

    fn new_med(name: &str, dosage: &str, start: Option<NaiveDate>) -> NewMedication {
        NewMedication {
            child_id: "emma".into(),
            name: name.into(),
            dosage: dosage.into(),
            frequency: "every 6 hours as needed".into(),
            start_date: start,
        }
    }

    #[test]
    fn add_medication_creates_active_relation() {
        let conn = test_db();
        let assignment = add_medication(&conn, &new_med("Ibuprofen", "100mg", None)).unwrap();
        assert!(assignment.active);
        assert_eq!(assignment.medication.name, "Ibuprofen");
        assert_eq!(assignment.medication.dosage.as_deref(), Some("100mg"));
        assert_eq!(assignment.start_date, Utc::now().date_naive());

        let active = get_active_medications(&conn, "emma").unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].medication, "Ibuprofen");
        assert_eq!(active[0].frequency, "every 6 hours as needed");
    }

    #[test]
    fn add_medication_for_unknown_child_is_not_found() {
        let conn = test_db();
        let mut med = new_med("Ibuprofen", "100mg", None);
        med.child_id = "ghost".into();
        let err = add_medication(&conn, &med).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn re_adding_same_medication_is_idempotent() {
        let conn = test_db();
        let start = NaiveDate::from_ymd_opt(2026, 1, 10);
        add_medication(&conn, &new_med("Ibuprofen", "100mg", start)).unwrap();
        add_medication(&conn, &new_med("Ibuprofen", "100mg", start)).unwrap();
        assert_eq!(get_active_medications(&conn, "emma").unwrap().len(), 1);
    }

    #[test]
    fn active_medications_newest_first() {
        let conn = test_db();
        add_medication(&conn, &new_med("Amoxicillin", "250mg", NaiveDate::from_ymd_opt(2026, 1, 1))).unwrap();
        add_medication(&conn, &new_med("Ibuprofen", "100mg", NaiveDate::from_ymd_opt(2026, 2, 1))).unwrap();

        let names: Vec<_> = get_active_medications(&conn, "emma")
            .unwrap()
            .into_iter()
            .map(|m| m.medication)
            .collect();
        assert_eq!(names, vec!["Ibuprofen", "Amoxicillin"]);
    }

    #[test]
    fn stop_medication_removes_from_active() {
        let conn = test_db();
        add_medication(&conn, &new_med("Ibuprofen", "100mg", None)).unwrap();
        assert_eq!(stop_medication(&conn, "emma", "Ibuprofen").unwrap(), 1);
        assert!(get_active_medications(&conn, "emma").unwrap().is_empty());

        let err = stop_medication(&conn, "emma", "Ibuprofen").unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn reference_upsert_keeps_dosage() {
        let conn = test_db();
        add_medication(&conn, &new_med("Ibuprofen", "100mg", None)).unwrap();
        upsert_medication_reference(
            &conn,
            &Medication {
                name: "Ibuprofen".into(),
                dosage: None,
                frequency: None,
                forms: vec!["liquid".into(), "chewable".into()],
                use_description: Some("Fever and pain".into()),
                safety_info: None,
                storage: None,
                notes: None,
                source: RecordSource::Dataset,
            },
        )
        .unwrap();

        let med = get_medication(&conn, "Ibuprofen").unwrap().unwrap();
        assert_eq!(med.dosage.as_deref(), Some("100mg"));
        assert_eq!(med.forms, vec!["liquid", "chewable"]);
        assert_eq!(med.source, RecordSource::Dataset);
    }

    #[test]
    fn ensure_medication_is_idempotent() {
        let conn = test_db();
        ensure_medication(&conn, "Aspirin").unwrap();
        ensure_medication(&conn, "Aspirin").unwrap();
        let med = get_medication(&conn, "Aspirin").unwrap().unwrap();
        assert_eq!(med.source, RecordSource::Manual);
        assert!(med.dosage.is_none());
    }

    #[test]
    fn corrupt_forms_column_is_error() {
        let conn = test_db();
        ensure_medication(&conn, "Aspirin").unwrap();
        conn.execute("UPDATE medications SET forms = 'liquid' WHERE name = 'Aspirin'", [])
            .unwrap();

        let err = get_medication(&conn, "Aspirin").unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }
}
