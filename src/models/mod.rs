pub mod booking;
pub mod event;
pub mod payload;
pub mod prompt;

pub use booking::Booking;
pub use event::{EventKind, InboundEvent};
pub use payload::{BookingVerb, MalformedPayload, MenuItem, ReplyPayload};
pub use prompt::{Action, ChoiceOption, ListRow, PromptUnit, MAX_CHOICES, MAX_ROWS};
