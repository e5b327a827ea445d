//! Record store seam.
//!
//! The evaluator and assistant only talk to `RecordStore`; `SqliteRecordStore`
//! is the production implementation over one long-lived connection.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::enums::AppointmentStatus;
use crate::models::*;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Connectivity or authorization failure. Fatal for the caller, never retried here.
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(DatabaseError),
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::StoreUnavailable(reason) => Self::Unavailable(reason),
            other => Self::Database(other),
        }
    }
}

/// Semantic operations over the child health records.
///
/// Absent entities come back as `None` or empty collections; only
/// connectivity problems and malformed writes are errors.
pub trait RecordStore {
    fn verify_connection(&self) -> Result<bool, StoreError>;

    fn upsert_child(&self, child: &Child) -> Result<Child, StoreError>;
    fn get_child(&self, child_id: &str) -> Result<Option<Child>, StoreError>;

    fn add_medication(&self, new: &NewMedication) -> Result<MedicationAssignment, StoreError>;
    fn stop_medication(&self, child_id: &str, medication: &str) -> Result<usize, StoreError>;
    fn active_medications(&self, child_id: &str) -> Result<Vec<ActiveMedication>, StoreError>;

    fn log_symptom(
        &self,
        child_id: &str,
        symptom: &str,
        severity: u8,
        notes: Option<&str>,
        reported_at: DateTime<Utc>,
    ) -> Result<SymptomReport, StoreError>;
    /// Reports strictly after `since`.
    fn recent_symptoms(
        &self,
        child_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<SymptomReport>, StoreError>;

    fn upsert_interaction(&self, fact: &InteractionFact) -> Result<(), StoreError>;
    /// Interaction facts between `candidate` and each of `current`, either direction.
    fn interactions_with(
        &self,
        current: &[String],
        candidate: &str,
    ) -> Result<Vec<InteractionMatch>, StoreError>;

    fn create_appointment(&self, new: &NewAppointment) -> Result<Appointment, StoreError>;
    fn set_appointment_status(
        &self,
        appointment_id: &Uuid,
        status: AppointmentStatus,
    ) -> Result<(), StoreError>;
    fn upcoming_appointments(
        &self,
        child_id: &str,
        today: NaiveDate,
        limit: usize,
    ) -> Result<Vec<Appointment>, StoreError>;

    fn upsert_pharmacy(&self, pharmacy: &Pharmacy) -> Result<(), StoreError>;
    fn find_pharmacies(&self, location: Option<&str>) -> Result<Vec<Pharmacy>, StoreError>;
}

/// SQLite-backed record store. The connection is reused across calls and
/// carries no cached data.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = db::open_database(path)?;
        tracing::info!(path = %path.display(), "Record store opened");
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::from_connection(db::open_memory_database()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Run `f` against the underlying connection (bulk loaders, maintenance).
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, DatabaseError>,
    ) -> Result<T, StoreError> {
        let conn = self.connection()?;
        Ok(f(&conn)?)
    }

    /// Exclusive access to the connection for multi-statement jobs.
    pub fn connection(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))
    }
}

impl RecordStore for SqliteRecordStore {
    fn verify_connection(&self) -> Result<bool, StoreError> {
        let conn = self.connection()?;
        match db::ping(&conn) {
            Ok(ok) => Ok(ok),
            Err(e) => {
                tracing::error!(error = %e, "Record store connection check failed");
                Err(e.into())
            }
        }
    }

    fn upsert_child(&self, child: &Child) -> Result<Child, StoreError> {
        let conn = self.connection()?;
        Ok(db::upsert_child(&conn, child)?)
    }

    fn get_child(&self, child_id: &str) -> Result<Option<Child>, StoreError> {
        let conn = self.connection()?;
        Ok(db::get_child(&conn, child_id)?)
    }

    fn add_medication(&self, new: &NewMedication) -> Result<MedicationAssignment, StoreError> {
        let conn = self.connection()?;
        Ok(db::add_medication(&conn, new)?)
    }

    fn stop_medication(&self, child_id: &str, medication: &str) -> Result<usize, StoreError> {
        let conn = self.connection()?;
        Ok(db::stop_medication(&conn, child_id, medication)?)
    }

    fn active_medications(&self, child_id: &str) -> Result<Vec<ActiveMedication>, StoreError> {
        let conn = self.connection()?;
        Ok(db::get_active_medications(&conn, child_id)?)
    }

    fn log_symptom(
        &self,
        child_id: &str,
        symptom: &str,
        severity: u8,
        notes: Option<&str>,
        reported_at: DateTime<Utc>,
    ) -> Result<SymptomReport, StoreError> {
        let conn = self.connection()?;
        Ok(db::log_symptom(&conn, child_id, symptom, severity, notes, reported_at)?)
    }

    fn recent_symptoms(
        &self,
        child_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<SymptomReport>, StoreError> {
        let conn = self.connection()?;
        Ok(db::get_symptoms_since(&conn, child_id, &since)?)
    }

    fn upsert_interaction(&self, fact: &InteractionFact) -> Result<(), StoreError> {
        let conn = self.connection()?;
        Ok(db::upsert_interaction(&conn, fact)?)
    }

    fn interactions_with(
        &self,
        current: &[String],
        candidate: &str,
    ) -> Result<Vec<InteractionMatch>, StoreError> {
        let conn = self.connection()?;
        Ok(db::find_interactions(&conn, current, candidate)?)
    }

    fn create_appointment(&self, new: &NewAppointment) -> Result<Appointment, StoreError> {
        let conn = self.connection()?;
        Ok(db::create_appointment(&conn, new)?)
    }

    fn set_appointment_status(
        &self,
        appointment_id: &Uuid,
        status: AppointmentStatus,
    ) -> Result<(), StoreError> {
        let conn = self.connection()?;
        Ok(db::update_appointment_status(&conn, appointment_id, status)?)
    }

    fn upcoming_appointments(
        &self,
        child_id: &str,
        today: NaiveDate,
        limit: usize,
    ) -> Result<Vec<Appointment>, StoreError> {
        let conn = self.connection()?;
        Ok(db::get_upcoming_appointments(&conn, child_id, today, limit)?)
    }

    fn upsert_pharmacy(&self, pharmacy: &Pharmacy) -> Result<(), StoreError> {
        let conn = self.connection()?;
        Ok(db::upsert_pharmacy(&conn, pharmacy)?)
    }

    fn find_pharmacies(&self, location: Option<&str>) -> Result<Vec<Pharmacy>, StoreError> {
        let conn = self.connection()?;
        Ok(db::find_pharmacies(&conn, location)?)
    }
}
