use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::catalog::{Catalog, Slot};
use crate::db::queries;
use crate::models::Booking;

use super::{AppointmentStore, StoreError};

/// Durable ledger on SQLite. The `(date, slot)` primary key makes the
/// book operation an atomic unique-constraint insert; the connection
/// mutex matches how the rest of the app drives rusqlite.
pub struct SqliteStore {
    catalog: Arc<Catalog>,
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(conn: Arc<Mutex<Connection>>, catalog: Arc<Catalog>) -> Self {
        Self { catalog, conn }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> anyhow::Result<T>,
    ) -> Result<T, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
        f(&conn).map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

impl AppointmentStore for SqliteStore {
    fn list_available_slots(&self, date: &str) -> Result<Vec<Slot>, StoreError> {
        let booked = self.with_conn(|conn| queries::booked_slots_for_date(conn, date))?;
        Ok(self
            .catalog
            .slots()
            .iter()
            .filter(|slot| !booked.iter().any(|b| b == slot.as_str()))
            .cloned()
            .collect())
    }

    fn book(&self, booking: Booking) -> Result<bool, StoreError> {
        self.with_conn(|conn| queries::insert_booking(conn, &booking))
    }

    fn cancel(&self, date: &str, slot: &str) -> Result<bool, StoreError> {
        self.with_conn(|conn| queries::delete_booking(conn, date, slot))
    }

    fn bookings_for_customer(&self, customer_id: &str) -> Result<Vec<Booking>, StoreError> {
        self.with_conn(|conn| queries::bookings_for_customer(conn, customer_id))
    }

    fn all_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        self.with_conn(queries::all_bookings)
    }
}
