pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::catalog::Slot;
use crate::models::Booking;

/// The store boundary never distinguishes failure causes for the
/// caller: any outage, timeout or corruption surfaces as
/// `Unavailable` and the current turn ends with a generic apology.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("appointment store unavailable: {0}")]
    Unavailable(String),
}

/// Shared booking ledger. One correctness-critical guarantee:
/// [`book`](AppointmentStore::book) is an atomic check-then-insert,
/// so concurrent attempts on the same `(date, slot)` resolve to
/// exactly one winner.
pub trait AppointmentStore: Send + Sync {
    /// Catalog slots with no booking for `date`, in catalog order.
    /// Empty is a valid answer (fully booked day).
    fn list_available_slots(&self, date: &str) -> Result<Vec<Slot>, StoreError>;

    /// Insert the booking unless `(date, slot)` is already taken.
    /// Returns whether the insert happened.
    fn book(&self, booking: Booking) -> Result<bool, StoreError>;

    /// Remove the booking for `(date, slot)` if present. Idempotent:
    /// cancelling a missing booking returns `false`, not an error.
    fn cancel(&self, date: &str, slot: &str) -> Result<bool, StoreError>;

    /// Every booking held by this customer, unsorted.
    fn bookings_for_customer(&self, customer_id: &str) -> Result<Vec<Booking>, StoreError>;

    /// Full ledger scan, for the admin surface.
    fn all_bookings(&self) -> Result<Vec<Booking>, StoreError>;
}
