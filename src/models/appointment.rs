use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::AppointmentStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub child_id: String,
    pub appointment_type: String,
    pub date: NaiveDate,
    /// Free-form display time, e.g. "10:00 AM".
    pub time: String,
    pub doctor: String,
    pub location: String,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub child_id: String,
    pub appointment_type: String,
    pub date: NaiveDate,
    pub time: String,
    pub doctor: String,
    pub location: String,
    pub notes: Option<String>,
}
