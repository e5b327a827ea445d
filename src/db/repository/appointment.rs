use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::child::require_child;
use super::{format_timestamp, parse_date, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::enums::AppointmentStatus;
use crate::models::*;

pub fn create_appointment(
    conn: &Connection,
    new: &NewAppointment,
) -> Result<Appointment, DatabaseError> {
    require_child(conn, &new.child_id)?;

    let appointment = Appointment {
        id: Uuid::new_v4(),
        child_id: new.child_id.clone(),
        appointment_type: new.appointment_type.clone(),
        date: new.date,
        time: new.time.clone(),
        doctor: new.doctor.clone(),
        location: new.location.clone(),
        notes: new.notes.clone().filter(|n| !n.is_empty()),
        status: AppointmentStatus::Scheduled,
        created_at: Utc::now(),
    };

    conn.execute(
        "INSERT INTO appointments (id, child_id, appointment_type, date, time, doctor,
         location, notes, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            appointment.id.to_string(),
            appointment.child_id,
            appointment.appointment_type,
            appointment.date.to_string(),
            appointment.time,
            appointment.doctor,
            appointment.location,
            appointment.notes,
            appointment.status.as_str(),
            format_timestamp(&appointment.created_at),
        ],
    )?;

    Ok(appointment)
}

pub fn update_appointment_status(
    conn: &Connection,
    appointment_id: &Uuid,
    status: AppointmentStatus,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE appointments SET status = ?1 WHERE id = ?2",
        params![status.as_str(), appointment_id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: appointment_id.to_string(),
        });
    }
    Ok(())
}

/// Scheduled appointments on or after `today`, soonest first.
pub fn get_upcoming_appointments(
    conn: &Connection,
    child_id: &str,
    today: NaiveDate,
    limit: usize,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, child_id, appointment_type, date, time, doctor, location, notes,
                status, created_at
         FROM appointments
         WHERE child_id = ?1 AND date >= ?2 AND status = 'scheduled'
         ORDER BY date ASC, time ASC
         LIMIT ?3",
    )?;

    let rows = stmt.query_map(
        params![child_id, today.to_string(), limit as i64],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, String>(8)?,
                row.get::<_, String>(9)?,
            ))
        },
    )?;

    let mut appointments = Vec::new();
    for row in rows {
        let (id, child_id, appointment_type, date, time, doctor, location, notes, status, created_at) =
            row?;
        appointments.push(Appointment {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            child_id,
            appointment_type,
            date: parse_date(&date)?,
            time,
            doctor,
            location,
            notes,
            status: AppointmentStatus::from_str(&status)?,
            created_at: parse_timestamp(&created_at)?,
        });
    }
    Ok(appointments)
}
