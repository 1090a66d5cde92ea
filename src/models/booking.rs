use serde::{Deserialize, Serialize};

use crate::catalog::{Service, Slot};

/// One confirmed reservation. `(date, slot)` is the identity key:
/// the store never holds two bookings for the same pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub customer_id: String,
    pub service: Service,
    pub date: String,
    pub slot: Slot,
}

impl Booking {
    pub fn new(date: &str, slot: Slot, customer_id: &str, service: Service) -> Self {
        Self {
            customer_id: customer_id.to_string(),
            service,
            date: date.to_string(),
            slot,
        }
    }
}
