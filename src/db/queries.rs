use rusqlite::{params, Connection, Row};

use crate::catalog::{Service, Slot};
use crate::models::Booking;

/// Insert unless `(date, slot)` is taken. The primary key makes the
/// check-then-insert a single atomic statement; the return value says
/// whether a row landed.
pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<bool> {
    let count = conn.execute(
        "INSERT INTO bookings (date, slot, customer_id, service)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(date, slot) DO NOTHING",
        params![
            booking.date,
            booking.slot.as_str(),
            booking.customer_id,
            booking.service.as_str(),
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_booking(conn: &Connection, date: &str, slot: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "DELETE FROM bookings WHERE date = ?1 AND slot = ?2",
        params![date, slot],
    )?;
    Ok(count > 0)
}

pub fn booked_slots_for_date(conn: &Connection, date: &str) -> anyhow::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT slot FROM bookings WHERE date = ?1")?;
    let rows = stmt.query_map(params![date], |row| row.get::<_, String>(0))?;

    let mut slots = vec![];
    for row in rows {
        slots.push(row?);
    }
    Ok(slots)
}

pub fn bookings_for_customer(conn: &Connection, customer_id: &str) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT date, slot, customer_id, service FROM bookings WHERE customer_id = ?1",
    )?;
    let rows = stmt.query_map(params![customer_id], parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

pub fn all_bookings(conn: &Connection) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT date, slot, customer_id, service FROM bookings ORDER BY date, slot",
    )?;
    let rows = stmt.query_map([], parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

fn parse_booking_row(row: &Row<'_>) -> rusqlite::Result<Booking> {
    Ok(Booking {
        date: row.get(0)?,
        slot: Slot(row.get(1)?),
        customer_id: row.get(2)?,
        service: Service(row.get(3)?),
    })
}
