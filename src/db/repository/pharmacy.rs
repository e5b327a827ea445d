use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::Pharmacy;

/// Listing cap when no location filter is given.
pub const UNFILTERED_PHARMACY_LIMIT: i64 = 10;

pub fn upsert_pharmacy(conn: &Connection, pharmacy: &Pharmacy) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO pharmacies (name, location, phone, hours) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(name) DO UPDATE SET
            location = excluded.location,
            phone = excluded.phone,
            hours = excluded.hours",
        params![pharmacy.name, pharmacy.location, pharmacy.phone, pharmacy.hours],
    )?;
    Ok(())
}

/// Pharmacies whose location contains `location` (case-insensitive),
/// or the first few pharmacies when no location is given.
pub fn find_pharmacies(
    conn: &Connection,
    location: Option<&str>,
) -> Result<Vec<Pharmacy>, DatabaseError> {
    let pharmacies = match location.filter(|l| !l.trim().is_empty()) {
        Some(loc) => {
            let mut stmt = conn.prepare(
                "SELECT name, location, phone, hours FROM pharmacies
                 WHERE instr(LOWER(location), LOWER(?1)) > 0
                 ORDER BY name",
            )?;
            let rows = stmt.query_map(params![loc], pharmacy_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT name, location, phone, hours FROM pharmacies ORDER BY name LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![UNFILTERED_PHARMACY_LIMIT], pharmacy_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(pharmacies)
}

fn pharmacy_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Pharmacy> {
    Ok(Pharmacy {
        name: row.get(0)?,
        location: row.get(1)?,
        phone: row.get(2)?,
        hours: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn pharmacy(name: &str, location: &str) -> Pharmacy {
        Pharmacy {
            name: name.into(),
            location: location.into(),
            phone: "555-0100".into(),
            hours: "9-5".into(),
        }
    }

    #[test]
    fn location_filter_is_case_insensitive_substring() {
        let conn = open_memory_database().unwrap();
        upsert_pharmacy(&conn, &pharmacy("CareRx", "Downtown Springfield")).unwrap();
        upsert_pharmacy(&conn, &pharmacy("KidsMeds", "Shelbyville")).unwrap();

        let found = find_pharmacies(&conn, Some("springfield")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "CareRx");
    }

    #[test]
    fn no_filter_lists_capped() {
        let conn = open_memory_database().unwrap();
        for i in 0..12 {
            upsert_pharmacy(&conn, &pharmacy(&format!("Pharmacy {i:02}"), "Town")).unwrap();
        }
        assert_eq!(find_pharmacies(&conn, None).unwrap().len(), 10);
        assert_eq!(find_pharmacies(&conn, Some("  ")).unwrap().len(), 10);
    }

    #[test]
    fn upsert_updates_by_name() {
        let conn = open_memory_database().unwrap();
        upsert_pharmacy(&conn, &pharmacy("CareRx", "Old Town")).unwrap();
        upsert_pharmacy(&conn, &pharmacy("CareRx", "New Town")).unwrap();
        let all = find_pharmacies(&conn, None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].location, "New Town");
    }
}
