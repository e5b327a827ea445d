use rusqlite::{params, Connection};

use super::symptom::ensure_symptom;
use super::to_json_list;
use crate::db::DatabaseError;
use crate::models::enums::RecordSource;
use crate::models::*;

pub fn upsert_symptom_rule(conn: &Connection, rule: &SymptomRule) -> Result<(), DatabaseError> {
    ensure_symptom(conn, &rule.symptom_name, RecordSource::Dataset)?;
    conn.execute(
        "INSERT INTO symptom_rules (symptom_name, mild_threshold, high_threshold, spike_threshold,
         threshold_gte, is_boolean, advice_mild, advice_high, advice_spike, advice)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(symptom_name) DO UPDATE SET
            mild_threshold = excluded.mild_threshold,
            high_threshold = excluded.high_threshold,
            spike_threshold = excluded.spike_threshold,
            threshold_gte = excluded.threshold_gte,
            is_boolean = excluded.is_boolean,
            advice_mild = excluded.advice_mild,
            advice_high = excluded.advice_high,
            advice_spike = excluded.advice_spike,
            advice = excluded.advice",
        params![
            rule.symptom_name,
            rule.mild_threshold,
            rule.high_threshold,
            rule.spike_threshold,
            rule.threshold_gte,
            rule.is_boolean,
            rule.advice_mild,
            rule.advice_high,
            rule.advice_spike,
            rule.advice,
        ],
    )?;
    Ok(())
}

pub fn upsert_condition(conn: &Connection, condition: &Condition) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO conditions (name, category, age_range) VALUES (?1, ?2, ?3)
         ON CONFLICT(name) DO UPDATE SET
            category = excluded.category,
            age_range = excluded.age_range",
        params![condition.name, condition.category, condition.age_range],
    )?;
    Ok(())
}

/// Requires the condition to exist (see `upsert_condition`).
pub fn upsert_aftercare_guide(conn: &Connection, guide: &AftercareGuide) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO aftercare_guides (condition, overview, pain_management, activity_restrictions,
         diet_instructions, wound_care, red_flags, follow_up)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(condition) DO UPDATE SET
            overview = excluded.overview,
            pain_management = excluded.pain_management,
            activity_restrictions = excluded.activity_restrictions,
            diet_instructions = excluded.diet_instructions,
            wound_care = excluded.wound_care,
            red_flags = excluded.red_flags,
            follow_up = excluded.follow_up",
        params![
            guide.condition,
            guide.overview,
            guide.pain_management,
            guide.activity_restrictions,
            guide.diet_instructions,
            guide.wound_care,
            to_json_list(&guide.red_flags)?,
            guide.follow_up,
        ],
    )?;
    Ok(())
}

/// Link every condition whose name contains one of `name_fragments`
/// (case-sensitive) to the symptom. Returns the number of new links.
pub fn link_conditions_to_symptom(
    conn: &Connection,
    symptom_name: &str,
    name_fragments: &[&str],
) -> Result<usize, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM symptoms WHERE name = ?1",
        params![symptom_name],
        |row| row.get(0),
    )?;
    if !exists {
        return Ok(0);
    }

    let mut linked = 0;
    for fragment in name_fragments {
        linked += conn.execute(
            "INSERT OR IGNORE INTO condition_symptoms (condition_name, symptom_name)
             SELECT name, ?1 FROM conditions WHERE instr(name, ?2) > 0",
            params![symptom_name, fragment],
        )?;
    }
    Ok(linked)
}

/// Conditions known to cause the symptom, alphabetically.
pub fn get_conditions_causing(
    conn: &Connection,
    symptom_name: &str,
) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT condition_name FROM condition_symptoms WHERE symptom_name = ?1
         ORDER BY condition_name",
    )?;
    let rows = stmt.query_map(params![symptom_name], |row| row.get::<_, String>(0))?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn upsert_sample_dialogue(
    conn: &Connection,
    dialogue: &SampleDialogue,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO sample_dialogues (query, expected_answer) VALUES (?1, ?2)
         ON CONFLICT(query) DO UPDATE SET expected_answer = excluded.expected_answer",
        params![dialogue.query, dialogue.expected_answer],
    )?;
    Ok(())
}

pub fn upsert_check_in(conn: &Connection, check_in: &CheckIn) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO check_ins (timestamp, child_id, symptom, severity, action)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(timestamp, child_id, symptom) DO UPDATE SET
            severity = excluded.severity,
            action = excluded.action",
        params![
            check_in.timestamp,
            check_in.child_id,
            check_in.symptom,
            check_in.severity,
            check_in.action,
        ],
    )?;
    Ok(())
}

/// Tables reported by `table_counts`, in display order.
const COUNTED_TABLES: &[&str] = &[
    "children",
    "medications",
    "symptoms",
    "symptom_reports",
    "interactions",
    "appointments",
    "pharmacies",
    "symptom_rules",
    "conditions",
    "aftercare_guides",
    "condition_symptoms",
    "sample_dialogues",
    "check_ins",
];

/// Row count per table, largest first.
pub fn table_counts(conn: &Connection) -> Result<Vec<(String, i64)>, DatabaseError> {
    let mut counts = Vec::with_capacity(COUNTED_TABLES.len());
    for table in COUNTED_TABLES {
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        counts.push((table.to_string(), count));
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(counts)
}
