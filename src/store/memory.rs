use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::catalog::{Catalog, Slot};
use crate::models::Booking;

use super::{AppointmentStore, StoreError};

/// Map-backed ledger. The mutex around the map is the atomicity
/// boundary for the check-then-insert in [`book`](Self::book).
pub struct MemoryStore {
    catalog: Arc<Catalog>,
    ledger: Mutex<HashMap<(String, String), Booking>>,
}

impl MemoryStore {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            ledger: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<(String, String), Booking>>, StoreError> {
        self.ledger
            .lock()
            .map_err(|_| StoreError::Unavailable("ledger lock poisoned".to_string()))
    }
}

impl AppointmentStore for MemoryStore {
    fn list_available_slots(&self, date: &str) -> Result<Vec<Slot>, StoreError> {
        let ledger = self.lock()?;
        Ok(self
            .catalog
            .slots()
            .iter()
            .filter(|slot| !ledger.contains_key(&(date.to_string(), slot.0.clone())))
            .cloned()
            .collect())
    }

    fn book(&self, booking: Booking) -> Result<bool, StoreError> {
        let mut ledger = self.lock()?;
        let key = (booking.date.clone(), booking.slot.0.clone());
        if ledger.contains_key(&key) {
            return Ok(false);
        }
        ledger.insert(key, booking);
        Ok(true)
    }

    fn cancel(&self, date: &str, slot: &str) -> Result<bool, StoreError> {
        let mut ledger = self.lock()?;
        Ok(ledger.remove(&(date.to_string(), slot.to_string())).is_some())
    }

    fn bookings_for_customer(&self, customer_id: &str) -> Result<Vec<Booking>, StoreError> {
        let ledger = self.lock()?;
        Ok(ledger
            .values()
            .filter(|b| b.customer_id == customer_id)
            .cloned()
            .collect())
    }

    fn all_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        let ledger = self.lock()?;
        Ok(ledger.values().cloned().collect())
    }
}
