//! Typed codec for the reply ids threaded through interactive
//! prompts. The conversation keeps no session state between turns:
//! everything the next turn needs travels inside the id of the
//! button/list row the customer tapped.
//!
//! Wire scheme (underscore-delimited, slot strings carry none):
//!   `ver_horarios` | `ver_servicios` | `agendar` | `gestionar_cita`
//!   `reagendar_cita` | `cancelar_cita`
//!   `horario_<catalog-index>`
//!   `servicio_<catalog-index>_<slot>`
//!   `cancelar_cita_<date>_<slot>` | `reagendar_cita_<date>_<slot>`

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    ViewSlots,
    ViewServices,
    Book,
    Manage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingVerb {
    Cancel,
    Reschedule,
}

impl BookingVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingVerb::Cancel => "cancelar",
            BookingVerb::Reschedule => "reagendar",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplyPayload {
    Menu(MenuItem),
    /// A slot button was tapped; index is into the slot catalog, not
    /// the availability listing, so it survives availability changes
    /// between turns.
    SlotChoice { index: usize },
    /// A service row was tapped. `slot` is the slot chosen on the
    /// previous turn; `None` when the id carried no slot segment,
    /// which the interpreter treats as "go pick a slot first".
    ServiceChoice { index: usize, slot: Option<String> },
    /// Reagendar/Cancelar tapped on the manage menu.
    ManageAction(BookingVerb),
    /// A concrete booking picked for cancel or reschedule.
    BookingAction {
        verb: BookingVerb,
        date: String,
        slot: String,
    },
}

#[derive(Debug, thiserror::Error)]
#[error("malformed reply payload: {0}")]
pub struct MalformedPayload(pub String);

impl ReplyPayload {
    pub fn encode(&self) -> String {
        match self {
            ReplyPayload::Menu(MenuItem::ViewSlots) => "ver_horarios".to_string(),
            ReplyPayload::Menu(MenuItem::ViewServices) => "ver_servicios".to_string(),
            ReplyPayload::Menu(MenuItem::Book) => "agendar".to_string(),
            ReplyPayload::Menu(MenuItem::Manage) => "gestionar_cita".to_string(),
            ReplyPayload::SlotChoice { index } => format!("horario_{index}"),
            ReplyPayload::ServiceChoice { index, slot } => match slot {
                Some(slot) => format!("servicio_{index}_{slot}"),
                None => format!("servicio_{index}"),
            },
            ReplyPayload::ManageAction(verb) => format!("{}_cita", verb.as_str()),
            ReplyPayload::BookingAction { verb, date, slot } => {
                format!("{}_cita_{}_{}", verb.as_str(), date, slot)
            }
        }
    }

    pub fn parse(id: &str) -> Result<Self, MalformedPayload> {
        match id {
            "ver_horarios" => return Ok(ReplyPayload::Menu(MenuItem::ViewSlots)),
            "ver_servicios" => return Ok(ReplyPayload::Menu(MenuItem::ViewServices)),
            "agendar" => return Ok(ReplyPayload::Menu(MenuItem::Book)),
            "gestionar_cita" => return Ok(ReplyPayload::Menu(MenuItem::Manage)),
            "cancelar_cita" => return Ok(ReplyPayload::ManageAction(BookingVerb::Cancel)),
            "reagendar_cita" => {
                return Ok(ReplyPayload::ManageAction(BookingVerb::Reschedule))
            }
            _ => {}
        }

        if let Some(rest) = id.strip_prefix("horario_") {
            let index = rest
                .parse::<usize>()
                .map_err(|_| MalformedPayload(id.to_string()))?;
            return Ok(ReplyPayload::SlotChoice { index });
        }

        if let Some(rest) = id.strip_prefix("servicio_") {
            let mut parts = rest.splitn(2, '_');
            let index = parts
                .next()
                .and_then(|p| p.parse::<usize>().ok())
                .ok_or_else(|| MalformedPayload(id.to_string()))?;
            let slot = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
            return Ok(ReplyPayload::ServiceChoice { index, slot });
        }

        for verb in [BookingVerb::Cancel, BookingVerb::Reschedule] {
            let prefix = format!("{}_cita_", verb.as_str());
            if let Some(rest) = id.strip_prefix(prefix.as_str()) {
                // date is ISO (no underscores); everything after the
                // next separator is the slot verbatim.
                let mut parts = rest.splitn(2, '_');
                let date = parts.next().unwrap_or_default();
                let slot = parts.next().unwrap_or_default();
                if date.is_empty() || slot.is_empty() {
                    return Err(MalformedPayload(id.to_string()));
                }
                return Ok(ReplyPayload::BookingAction {
                    verb,
                    date: date.to_string(),
                    slot: slot.to_string(),
                });
            }
        }

        Err(MalformedPayload(id.to_string()))
    }
}
