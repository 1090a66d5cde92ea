use serde::{Deserialize, Serialize};

/// A bookable time range out of the fixed daily catalog, e.g.
/// "9:00 AM - 10:00 AM". Slot strings never contain underscores;
/// the reply-id codec depends on that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot(pub String);

impl Slot {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One offered service out of the fixed catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service(pub String);

impl Service {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The static catalogs the business offers. Built once at startup and
/// never mutated; all ordering in prompts follows catalog order.
#[derive(Debug, Clone)]
pub struct Catalog {
    slots: Vec<Slot>,
    services: Vec<Service>,
}

impl Catalog {
    pub fn new(slots: Vec<String>, services: Vec<String>) -> Self {
        Self {
            slots: slots.into_iter().map(Slot).collect(),
            services: services.into_iter().map(Service).collect(),
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn service(&self, index: usize) -> Option<&Service> {
        self.services.get(index)
    }

    /// Position of a slot in the catalog. Used to keep management
    /// menus in a deterministic order regardless of store scan order.
    pub fn slot_index(&self, slot: &Slot) -> Option<usize> {
        self.slots.iter().position(|s| s == slot)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(
            vec![
                "9:00 AM - 10:00 AM".to_string(),
                "10:00 AM - 11:00 AM".to_string(),
                "11:00 AM - 12:00 PM".to_string(),
                "2:00 PM - 3:00 PM".to_string(),
                "3:00 PM - 4:00 PM".to_string(),
                "4:00 PM - 5:00 PM".to_string(),
            ],
            vec![
                "Corte de cabello".to_string(),
                "Tinte".to_string(),
                "Peinado".to_string(),
                "Tratamiento capilar".to_string(),
                "Manicure".to_string(),
                "Pedicure".to_string(),
            ],
        )
    }
}

/// The only day the bot books against: the current calendar day,
/// ISO-formatted.
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}
