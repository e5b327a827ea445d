//! Offline bulk load of the pediatric reference dataset.
//!
//! Each file is loaded in its own transaction and every write is an upsert,
//! so re-running over the same directory changes nothing.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{self, DatabaseError};
use crate::models::enums::RecordSource;
use crate::models::*;
use crate::store::{SqliteRecordStore, StoreError};

pub const MEDICATION_GUIDES_FILE: &str = "medication_guides.jsonl";
pub const SYMPTOM_RULES_FILE: &str = "symptom_rules.json";
pub const AFTERCARE_FILE: &str = "pediatric_aftercare.jsonl";
pub const DIALOGUES_FILE: &str = "dialogues.jsonl";
pub const CHECK_INS_FILE: &str = "synthetic_checkins.csv";

/// Symptom → fragments of condition names that may cause it.
pub const CONDITION_LINKS: &[(&str, &[&str])] = &[
    ("fever_c", &["tonsillectomy", "RSV", "pneumonia"]),
    ("pain_0_10", &["tonsillectomy", "appendectomy"]),
    ("breathing_difficulty", &["RSV", "pneumonia", "flu"]),
];

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path} line {line}: {source}")]
    Json {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },

    #[error("Invalid CSV in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for DatasetError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.into())
    }
}

/// Rows written per file. Re-runs report the same counts except for
/// `condition_links`, which only counts links that did not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub medication_guides: usize,
    pub symptom_rules: usize,
    pub aftercare_guides: usize,
    pub dialogues: usize,
    pub check_ins: usize,
    pub condition_links: usize,
    pub skipped_records: usize,
    pub missing_files: Vec<String>,
}

// ---------------------------------------------------------------------------
// Source record shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MedicationGuideRecord {
    #[serde(default)]
    drug: String,
    #[serde(default)]
    forms: Vec<String>,
    #[serde(rename = "use")]
    use_description: Option<String>,
    safety: Option<String>,
    storage: Option<String>,
    notes: Option<String>,
}

impl From<MedicationGuideRecord> for Medication {
    fn from(r: MedicationGuideRecord) -> Self {
        Medication {
            name: r.drug,
            dosage: None,
            frequency: None,
            forms: r.forms,
            use_description: r.use_description,
            safety_info: r.safety,
            storage: r.storage,
            notes: r.notes,
            source: RecordSource::Dataset,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SymptomRuleRecord {
    #[serde(default)]
    symptom: String,
    mild_lt: Option<f64>,
    high_gte: Option<f64>,
    spike_gte: Option<f64>,
    threshold_gte: Option<f64>,
    boolean: Option<bool>,
    advice_mild: Option<String>,
    advice_high: Option<String>,
    advice_spike: Option<String>,
    advice: Option<String>,
}

impl From<SymptomRuleRecord> for SymptomRule {
    fn from(r: SymptomRuleRecord) -> Self {
        SymptomRule {
            symptom_name: r.symptom,
            mild_threshold: r.mild_lt,
            high_threshold: r.high_gte,
            spike_threshold: r.spike_gte,
            threshold_gte: r.threshold_gte,
            is_boolean: r.boolean,
            advice_mild: r.advice_mild,
            advice_high: r.advice_high,
            advice_spike: r.advice_spike,
            advice: r.advice,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AftercareRecord {
    #[serde(default)]
    condition: String,
    category: Option<String>,
    age_range: Option<String>,
    overview: Option<String>,
    pain_management: Option<String>,
    activity: Option<String>,
    diet: Option<String>,
    wound_care: Option<String>,
    #[serde(default)]
    red_flags: Vec<String>,
    follow_up: Option<String>,
}

impl AftercareRecord {
    fn split(self) -> (Condition, AftercareGuide) {
        let condition = Condition {
            name: self.condition.clone(),
            category: self.category,
            age_range: self.age_range,
        };
        let guide = AftercareGuide {
            condition: self.condition,
            overview: self.overview,
            pain_management: self.pain_management,
            activity_restrictions: self.activity,
            diet_instructions: self.diet,
            wound_care: self.wound_care,
            red_flags: self.red_flags,
            follow_up: self.follow_up,
        };
        (condition, guide)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load every dataset file found in `dir` into the store.
pub fn load_dataset(store: &SqliteRecordStore, dir: &Path) -> Result<DatasetSummary, DatasetError> {
    let conn = store.connection()?;
    load_dataset_into(&conn, dir)
}

pub fn load_dataset_into(conn: &Connection, dir: &Path) -> Result<DatasetSummary, DatasetError> {
    tracing::info!(dir = %dir.display(), "Loading pediatric dataset");
    let mut summary = DatasetSummary::default();

    if let Some(path) = existing(dir, MEDICATION_GUIDES_FILE, &mut summary) {
        let records: Vec<MedicationGuideRecord> = read_json_lines(&path)?;
        let tx = conn.unchecked_transaction()?;
        for record in records {
            if record.drug.trim().is_empty() {
                summary.skipped_records += 1;
                continue;
            }
            db::upsert_medication_reference(&tx, &record.into())?;
            summary.medication_guides += 1;
        }
        tx.commit()?;
        tracing::info!(count = summary.medication_guides, "Loaded medication guides");
    }

    if let Some(path) = existing(dir, SYMPTOM_RULES_FILE, &mut summary) {
        let records: Vec<SymptomRuleRecord> = read_json_array(&path)?;
        let tx = conn.unchecked_transaction()?;
        for record in records {
            if record.symptom.trim().is_empty() {
                summary.skipped_records += 1;
                continue;
            }
            db::upsert_symptom_rule(&tx, &record.into())?;
            summary.symptom_rules += 1;
        }
        tx.commit()?;
        tracing::info!(count = summary.symptom_rules, "Loaded symptom rules");
    }

    if let Some(path) = existing(dir, AFTERCARE_FILE, &mut summary) {
        let records: Vec<AftercareRecord> = read_json_lines(&path)?;
        let tx = conn.unchecked_transaction()?;
        for record in records {
            if record.condition.trim().is_empty() {
                summary.skipped_records += 1;
                continue;
            }
            let (condition, guide) = record.split();
            db::upsert_condition(&tx, &condition)?;
            db::upsert_aftercare_guide(&tx, &guide)?;
            summary.aftercare_guides += 1;
        }
        tx.commit()?;
        tracing::info!(count = summary.aftercare_guides, "Loaded aftercare guides");
    }

    if let Some(path) = existing(dir, DIALOGUES_FILE, &mut summary) {
        let records: Vec<SampleDialogue> = read_json_lines(&path)?;
        let tx = conn.unchecked_transaction()?;
        for dialogue in &records {
            db::upsert_sample_dialogue(&tx, dialogue)?;
            summary.dialogues += 1;
        }
        tx.commit()?;
        tracing::info!(count = summary.dialogues, "Loaded sample dialogues");
    }

    if let Some(path) = existing(dir, CHECK_INS_FILE, &mut summary) {
        let records = read_check_ins(&path)?;
        let tx = conn.unchecked_transaction()?;
        for check_in in &records {
            db::upsert_check_in(&tx, check_in)?;
            summary.check_ins += 1;
        }
        tx.commit()?;
        tracing::info!(count = summary.check_ins, "Loaded check-ins");
    }

    summary.condition_links = link_symptoms_to_conditions(conn)?;
    tracing::info!(
        new_links = summary.condition_links,
        skipped = summary.skipped_records,
        "Dataset load complete"
    );
    Ok(summary)
}

/// Create the symptom → condition "may cause" links. Returns new links.
pub fn link_symptoms_to_conditions(conn: &Connection) -> Result<usize, DatabaseError> {
    let mut linked = 0;
    for (symptom, fragments) in CONDITION_LINKS {
        linked += db::link_conditions_to_symptom(conn, symptom, fragments)?;
    }
    Ok(linked)
}

fn existing(dir: &Path, file: &str, summary: &mut DatasetSummary) -> Option<PathBuf> {
    let path = dir.join(file);
    if path.is_file() {
        Some(path)
    } else {
        tracing::warn!(path = %path.display(), "Dataset file not found, skipping");
        summary.missing_files.push(file.to_string());
        None
    }
}

fn open(path: &Path) -> Result<File, DatasetError> {
    File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// One JSON object per non-blank line.
fn read_json_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DatasetError> {
    let reader = BufReader::new(open(path)?);
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| DatasetError::Json {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DatasetError> {
    serde_json::from_reader(BufReader::new(open(path)?)).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        line: source.line(),
        source,
    })
}

fn read_check_ins(path: &Path) -> Result<Vec<CheckIn>, DatasetError> {
    let mut reader = csv::Reader::from_reader(open(path)?);
    let mut rows = Vec::new();
    for row in reader.deserialize::<CheckIn>() {
        let row = row.map_err(|source| DatasetError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(row);
    }
    Ok(rows)
}
