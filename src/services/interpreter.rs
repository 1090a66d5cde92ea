//! The conversation state machine. There is no session table: the
//! state a turn needs arrives inside the event (keyword or decoded
//! reply payload), the rest is reconstructed from the store. Given
//! the same event and ledger, `interpret` always produces the same
//! actions.

use std::collections::BTreeMap;

use crate::catalog::{Catalog, Slot};
use crate::models::payload::{BookingVerb, MenuItem, ReplyPayload};
use crate::models::{Action, Booking, ChoiceOption, EventKind, InboundEvent, ListRow};
use crate::store::{AppointmentStore, StoreError};

/// Sent when the store is unavailable; the turn ends here.
pub const STORE_APOLOGY: &str =
    "Lo sentimos, estamos teniendo problemas técnicos. Por favor, intenta de nuevo más tarde.";

const GREETINGS: &[&str] = &["hola", "buenos días", "buenas tardes", "buenas noches"];

pub fn interpret(
    event: &InboundEvent,
    store: &dyn AppointmentStore,
    catalog: &Catalog,
) -> Result<Vec<Action>, StoreError> {
    match &event.kind {
        EventKind::Text(body) => interpret_text(body, store, catalog),
        EventKind::Reply { payload, .. } => {
            interpret_reply(payload, &event.sender, store, catalog)
        }
        EventKind::Unrecognized => Ok(vec![main_menu(true)]),
    }
}

fn interpret_text(
    body: &str,
    store: &dyn AppointmentStore,
    catalog: &Catalog,
) -> Result<Vec<Action>, StoreError> {
    let keyword = body.trim().to_lowercase();

    if GREETINGS.contains(&keyword.as_str()) {
        return Ok(vec![main_menu(false)]);
    }

    match keyword.as_str() {
        "horarios" => available_slots_text(store),
        "servicios" => Ok(vec![services_text(catalog)]),
        "agendar" => slot_selection(store, catalog, "🗓️ Horarios disponibles para hoy:"),
        "gestionar cita" | "modificar cita" => Ok(vec![manage_menu()]),
        _ => Ok(vec![main_menu(true)]),
    }
}

fn interpret_reply(
    payload: &ReplyPayload,
    sender: &str,
    store: &dyn AppointmentStore,
    catalog: &Catalog,
) -> Result<Vec<Action>, StoreError> {
    match payload {
        ReplyPayload::Menu(MenuItem::ViewSlots) => available_slots_text(store),
        ReplyPayload::Menu(MenuItem::ViewServices) => Ok(vec![services_text(catalog)]),
        ReplyPayload::Menu(MenuItem::Book) => {
            slot_selection(store, catalog, "🗓️ Horarios disponibles para hoy:")
        }
        ReplyPayload::Menu(MenuItem::Manage) => Ok(vec![manage_menu()]),

        ReplyPayload::SlotChoice { index } => match catalog.slot(*index) {
            Some(slot) => Ok(vec![service_selection(catalog, slot)]),
            None => Ok(vec![main_menu(true)]),
        },

        ReplyPayload::ServiceChoice { index, slot } => {
            // Reachable without having picked a slot first; re-prompt
            // instead of booking against nothing.
            let Some(slot) = slot else {
                return slot_selection(
                    store,
                    catalog,
                    "Primero necesitas elegir un horario:",
                );
            };
            let Some(service) = catalog.service(*index) else {
                return Ok(vec![main_menu(true)]);
            };
            confirm_booking(sender, slot, service.clone(), store)
        }

        ReplyPayload::ManageAction(verb) => pick_booking(sender, *verb, store, catalog),

        ReplyPayload::BookingAction {
            verb: BookingVerb::Cancel,
            date,
            slot,
        } => {
            let removed = store.cancel(date, slot)?;
            let body = if removed {
                "✅ Tu cita ha sido cancelada exitosamente.\n\nSi deseas agendar una nueva cita, escribe 'agendar'."
            } else {
                "No encontramos esa cita. Puede que ya haya sido cancelada."
            };
            Ok(vec![Action::SendText {
                body: body.to_string(),
            }])
        }

        ReplyPayload::BookingAction {
            verb: BookingVerb::Reschedule,
            date,
            slot,
        } => {
            // The old slot is freed before the new booking exists. If
            // the customer abandons the flow here they end up with no
            // booking at all; kept as-is on purpose.
            let removed = store.cancel(date, slot)?;
            if !removed {
                tracing::warn!(date, slot, "reschedule of a booking that no longer exists");
            }
            slot_selection(store, catalog, "Elige un nuevo horario para tu cita:")
        }
    }
}

// ── Prompt builders ──

fn main_menu(apologize: bool) -> Action {
    let body = if apologize {
        "No entiendo ese mensaje. 🤔 Elige una de las opciones:".to_string()
    } else {
        "¡Hola! 👋 Bienvenido a nuestro servicio. ¿En qué puedo ayudarte?".to_string()
    };

    Action::SendChoice {
        body,
        options: vec![
            option(ReplyPayload::Menu(MenuItem::ViewSlots), "Ver horarios"),
            option(ReplyPayload::Menu(MenuItem::ViewServices), "Ver servicios"),
            option(ReplyPayload::Menu(MenuItem::Book), "Agendar cita"),
            option(ReplyPayload::Menu(MenuItem::Manage), "Gestionar cita"),
        ],
    }
}

fn manage_menu() -> Action {
    Action::SendChoice {
        body: "¿Qué deseas hacer con tu cita?".to_string(),
        options: vec![
            option(
                ReplyPayload::ManageAction(BookingVerb::Reschedule),
                "Reagendar",
            ),
            option(ReplyPayload::ManageAction(BookingVerb::Cancel), "Cancelar"),
        ],
    }
}

fn available_slots_text(store: &dyn AppointmentStore) -> Result<Vec<Action>, StoreError> {
    let available = store.list_available_slots(&crate::catalog::today())?;
    let body = if available.is_empty() {
        "Lo siento, no hay horarios disponibles para hoy.".to_string()
    } else {
        let listing: Vec<_> = available.iter().map(Slot::as_str).collect();
        format!(
            "📅 Horarios disponibles para hoy:\n\n{}",
            listing.join("\n")
        )
    };
    Ok(vec![Action::SendText { body }])
}

fn services_text(catalog: &Catalog) -> Action {
    let listing: Vec<_> = catalog
        .services()
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {}", i + 1, s))
        .collect();
    Action::SendText {
        body: format!("✨ Nuestros servicios:\n\n{}", listing.join("\n")),
    }
}

fn slot_selection(
    store: &dyn AppointmentStore,
    catalog: &Catalog,
    heading: &str,
) -> Result<Vec<Action>, StoreError> {
    let available = store.list_available_slots(&crate::catalog::today())?;
    if available.is_empty() {
        return Ok(vec![Action::SendText {
            body: "Lo siento, no hay horarios disponibles para hoy.".to_string(),
        }]);
    }

    let options = available
        .iter()
        .map(|slot| {
            // Catalog index, so the id stays meaningful even if
            // availability shifts before the customer answers.
            let index = catalog.slot_index(slot).unwrap_or_default();
            option(ReplyPayload::SlotChoice { index }, slot.as_str())
        })
        .collect();

    Ok(vec![Action::SendChoice {
        body: format!("{heading}\n\nSelecciona un horario:"),
        options,
    }])
}

fn service_selection(catalog: &Catalog, slot: &Slot) -> Action {
    let rows = catalog
        .services()
        .iter()
        .enumerate()
        .map(|(index, service)| ListRow {
            id: ReplyPayload::ServiceChoice {
                index,
                slot: Some(slot.0.clone()),
            }
            .encode(),
            title: service.as_str().to_string(),
            description: String::new(),
        })
        .collect();

    Action::SendList {
        header: "Nuestros servicios".to_string(),
        body: format!("Has seleccionado el horario: {slot}\n\nAhora elige el servicio:"),
        footer: String::new(),
        button: "Ver servicios".to_string(),
        rows,
    }
}

fn confirm_booking(
    sender: &str,
    slot: &str,
    service: crate::catalog::Service,
    store: &dyn AppointmentStore,
) -> Result<Vec<Action>, StoreError> {
    let date = crate::catalog::today();
    let booking = Booking::new(&date, Slot(slot.to_string()), sender, service.clone());

    if store.book(booking)? {
        tracing::info!(customer = sender, date, slot, service = %service, "booking confirmed");
        Ok(vec![
            Action::SendText {
                body: format!(
                    "✅ ¡Cita agendada con éxito!\n\n📅 Fecha: {date}\n⏰ Hora: {slot}\n💇 Servicio: {service}\n\n¡Te esperamos!"
                ),
            },
            Action::SendChoice {
                body: "Si necesitas modificar o cancelar tu cita:".to_string(),
                options: vec![
                    option(
                        ReplyPayload::ManageAction(BookingVerb::Reschedule),
                        "Reagendar",
                    ),
                    option(ReplyPayload::ManageAction(BookingVerb::Cancel), "Cancelar"),
                ],
            },
        ])
    } else {
        // Someone else took the slot between the prompt and the tap.
        tracing::info!(customer = sender, date, slot, "slot taken, booking rejected");
        Ok(vec![
            Action::SendText {
                body: "❌ Lo siento, este horario ya no está disponible.".to_string(),
            },
            Action::SendChoice {
                body: "¿Quieres intentar con otro horario?".to_string(),
                options: vec![option(ReplyPayload::Menu(MenuItem::Book), "Agendar cita")],
            },
        ])
    }
}

fn pick_booking(
    sender: &str,
    verb: BookingVerb,
    store: &dyn AppointmentStore,
    catalog: &Catalog,
) -> Result<Vec<Action>, StoreError> {
    let mut bookings = store.bookings_for_customer(sender)?;
    if bookings.is_empty() {
        return Ok(vec![
            Action::SendText {
                body: "No tienes citas programadas.".to_string(),
            },
            Action::SendChoice {
                body: "¿Deseas agendar una nueva cita?".to_string(),
                options: vec![option(ReplyPayload::Menu(MenuItem::Book), "Agendar cita")],
            },
        ]);
    }

    // Deterministic menus: date order, then catalog slot order.
    bookings.sort_by_key(|b| {
        (
            b.date.clone(),
            catalog.slot_index(&b.slot).unwrap_or(usize::MAX),
        )
    });

    let mut by_date: BTreeMap<String, Vec<Booking>> = BTreeMap::new();
    for booking in bookings {
        by_date.entry(booking.date.clone()).or_default().push(booking);
    }

    let action_word = match verb {
        BookingVerb::Cancel => "cancelar",
        BookingVerb::Reschedule => "reagendar",
    };

    let actions = by_date
        .into_iter()
        .map(|(date, group)| Action::SendChoice {
            body: format!("Citas del {date}. Selecciona la que deseas {action_word}:"),
            options: group
                .iter()
                .map(|b| {
                    option(
                        ReplyPayload::BookingAction {
                            verb,
                            date: b.date.clone(),
                            slot: b.slot.0.clone(),
                        },
                        b.slot.as_str(),
                    )
                })
                .collect(),
        })
        .collect();

    Ok(actions)
}

fn option(payload: ReplyPayload, title: &str) -> ChoiceOption {
    ChoiceOption {
        id: payload.encode(),
        title: title.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::catalog::Service;
    use crate::store::MemoryStore;

    fn setup() -> (Arc<Catalog>, MemoryStore) {
        let catalog = Arc::new(Catalog::default());
        let store = MemoryStore::new(Arc::clone(&catalog));
        (catalog, store)
    }

    fn run(event: InboundEvent, store: &MemoryStore, catalog: &Catalog) -> Vec<Action> {
        interpret(&event, store, catalog).unwrap()
    }

    #[test]
    fn test_greeting_emits_main_menu() {
        let (catalog, store) = setup();
        let actions = run(InboundEvent::text("555", "hola"), &store, &catalog);

        let [Action::SendChoice { options, body }] = actions.as_slice() else {
            panic!("expected one choice action, got {actions:?}");
        };
        assert!(!body.starts_with("No entiendo"));
        let ids: Vec<_> = options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["ver_horarios", "ver_servicios", "agendar", "gestionar_cita"]
        );
    }

    #[test]
    fn test_greeting_is_case_insensitive() {
        let (catalog, store) = setup();
        let actions = run(InboundEvent::text("555", "  HOLA  "), &store, &catalog);
        assert!(matches!(actions.as_slice(), [Action::SendChoice { .. }]));
    }

    #[test]
    fn test_unknown_text_reprompts_menu_with_apology() {
        let (catalog, store) = setup();
        let actions = run(InboundEvent::text("555", "qué onda"), &store, &catalog);

        let [Action::SendChoice { body, options }] = actions.as_slice() else {
            panic!("expected one choice action");
        };
        assert!(body.starts_with("No entiendo"));
        assert_eq!(options.len(), 4);
    }

    #[test]
    fn test_agendar_lists_available_slots_in_catalog_order() {
        let (catalog, store) = setup();
        store
            .book(Booking::new(
                &crate::catalog::today(),
                catalog.slot(0).unwrap().clone(),
                "666",
                Service("Tinte".to_string()),
            ))
            .unwrap();

        let actions = run(InboundEvent::text("555", "agendar"), &store, &catalog);
        let [Action::SendChoice { options, .. }] = actions.as_slice() else {
            panic!("expected one choice action");
        };
        assert_eq!(options.len(), catalog.slots().len() - 1);
        // First available is now catalog index 1.
        assert_eq!(options[0].id, "horario_1");
        assert_eq!(options[0].title, catalog.slot(1).unwrap().as_str());
    }

    #[test]
    fn test_agendar_with_full_day_apologizes() {
        let (catalog, store) = setup();
        let date = crate::catalog::today();
        for slot in catalog.slots() {
            store
                .book(Booking::new(&date, slot.clone(), "666", Service("Tinte".into())))
                .unwrap();
        }

        let actions = run(InboundEvent::text("555", "agendar"), &store, &catalog);
        let [Action::SendText { body }] = actions.as_slice() else {
            panic!("expected one text action");
        };
        assert!(body.contains("no hay horarios disponibles"));
    }

    #[test]
    fn test_slot_choice_prompts_service_list() {
        let (catalog, store) = setup();
        let event = InboundEvent::reply(
            "555",
            ReplyPayload::SlotChoice { index: 2 },
            catalog.slot(2).unwrap().as_str(),
        );

        let actions = run(event, &store, &catalog);
        let [Action::SendList { rows, body, .. }] = actions.as_slice() else {
            panic!("expected one list action");
        };
        assert!(body.contains(catalog.slot(2).unwrap().as_str()));
        assert_eq!(rows.len(), catalog.services().len());
        assert_eq!(rows[0].id, format!("servicio_0_{}", catalog.slot(2).unwrap()));
    }

    #[test]
    fn test_service_choice_books_and_offers_management() {
        let (catalog, store) = setup();
        let slot = catalog.slot(1).unwrap().clone();
        let event = InboundEvent::reply(
            "555",
            ReplyPayload::ServiceChoice {
                index: 0,
                slot: Some(slot.0.clone()),
            },
            "Corte de cabello",
        );

        let actions = run(event, &store, &catalog);
        assert!(matches!(
            actions.as_slice(),
            [Action::SendText { .. }, Action::SendChoice { .. }]
        ));
        let Action::SendText { body } = &actions[0] else {
            unreachable!()
        };
        assert!(body.contains("¡Cita agendada con éxito!"));

        let mine = store.bookings_for_customer("555").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].slot, slot);
        assert_eq!(mine[0].service, Service("Corte de cabello".to_string()));
    }

    #[test]
    fn test_service_choice_on_taken_slot_apologizes() {
        let (catalog, store) = setup();
        let slot = catalog.slot(1).unwrap().clone();
        store
            .book(Booking::new(
                &crate::catalog::today(),
                slot.clone(),
                "666",
                Service("Tinte".into()),
            ))
            .unwrap();

        let event = InboundEvent::reply(
            "555",
            ReplyPayload::ServiceChoice {
                index: 0,
                slot: Some(slot.0.clone()),
            },
            "Corte de cabello",
        );

        let actions = run(event, &store, &catalog);
        let [Action::SendText { body }, Action::SendChoice { options, .. }] = actions.as_slice()
        else {
            panic!("expected text + retry choice");
        };
        assert!(body.contains("ya no está disponible"));
        assert_eq!(options[0].id, "agendar");
        // The loser's booking never landed.
        assert!(store.bookings_for_customer("555").unwrap().is_empty());
    }

    #[test]
    fn test_service_choice_without_slot_reprompts_slots() {
        let (catalog, store) = setup();
        let event = InboundEvent::reply(
            "555",
            ReplyPayload::ServiceChoice {
                index: 0,
                slot: None,
            },
            "Corte de cabello",
        );

        let actions = run(event, &store, &catalog);
        let [Action::SendChoice { body, options }] = actions.as_slice() else {
            panic!("expected slot re-prompt");
        };
        assert!(body.contains("Primero necesitas elegir un horario"));
        assert!(options.iter().all(|o| o.id.starts_with("horario_")));
        assert!(store.bookings_for_customer("555").unwrap().is_empty());
    }

    #[test]
    fn test_manage_with_no_bookings_redirects_to_booking() {
        let (catalog, store) = setup();
        let event = InboundEvent::reply(
            "555",
            ReplyPayload::ManageAction(BookingVerb::Cancel),
            "Cancelar",
        );

        let actions = run(event, &store, &catalog);
        let [Action::SendText { body }, Action::SendChoice { options, .. }] = actions.as_slice()
        else {
            panic!("expected apology + booking redirect");
        };
        assert!(body.contains("No tienes citas"));
        assert_eq!(options[0].id, "agendar");
    }

    #[test]
    fn test_manage_groups_by_date_sorted() {
        let (catalog, store) = setup();
        // Inserted out of order on purpose.
        for (date, idx) in [("2025-08-26", 3), ("2025-08-25", 4), ("2025-08-25", 0)] {
            store
                .book(Booking::new(
                    date,
                    catalog.slot(idx).unwrap().clone(),
                    "555",
                    Service("Tinte".into()),
                ))
                .unwrap();
        }

        let event = InboundEvent::reply(
            "555",
            ReplyPayload::ManageAction(BookingVerb::Reschedule),
            "Reagendar",
        );
        let actions = run(event, &store, &catalog);

        // One choice set per date, dates ascending, slots in catalog order.
        assert_eq!(actions.len(), 2);
        let Action::SendChoice { body, options } = &actions[0] else {
            panic!("expected choice")
        };
        assert!(body.contains("2025-08-25"));
        assert_eq!(
            options[0].id,
            format!("reagendar_cita_2025-08-25_{}", catalog.slot(0).unwrap())
        );
        assert_eq!(
            options[1].id,
            format!("reagendar_cita_2025-08-25_{}", catalog.slot(4).unwrap())
        );
        let Action::SendChoice { body, .. } = &actions[1] else {
            panic!("expected choice")
        };
        assert!(body.contains("2025-08-26"));
    }

    #[test]
    fn test_cancel_booking_action() {
        let (catalog, store) = setup();
        let slot = catalog.slot(0).unwrap().clone();
        store
            .book(Booking::new("2025-08-25", slot.clone(), "555", Service("Tinte".into())))
            .unwrap();

        let event = InboundEvent::reply(
            "555",
            ReplyPayload::BookingAction {
                verb: BookingVerb::Cancel,
                date: "2025-08-25".to_string(),
                slot: slot.0.clone(),
            },
            "9:00 AM - 10:00 AM",
        );
        let actions = run(event, &store, &catalog);
        let [Action::SendText { body }] = actions.as_slice() else {
            panic!("expected one text action");
        };
        assert!(body.contains("cancelada exitosamente"));
        assert!(store.bookings_for_customer("555").unwrap().is_empty());

        // Second tap on the same button: friendly miss, no error.
        let event = InboundEvent::reply(
            "555",
            ReplyPayload::BookingAction {
                verb: BookingVerb::Cancel,
                date: "2025-08-25".to_string(),
                slot: slot.0.clone(),
            },
            "9:00 AM - 10:00 AM",
        );
        let actions = run(event, &store, &catalog);
        let [Action::SendText { body }] = actions.as_slice() else {
            panic!("expected one text action");
        };
        assert!(body.contains("No encontramos esa cita"));
    }

    #[test]
    fn test_reschedule_frees_slot_before_rebooking() {
        let (catalog, store) = setup();
        let date = crate::catalog::today();
        let slot = catalog.slot(0).unwrap().clone();
        store
            .book(Booking::new(&date, slot.clone(), "555", Service("Tinte".into())))
            .unwrap();

        let event = InboundEvent::reply(
            "555",
            ReplyPayload::BookingAction {
                verb: BookingVerb::Reschedule,
                date: date.clone(),
                slot: slot.0.clone(),
            },
            "9:00 AM - 10:00 AM",
        );
        let actions = run(event, &store, &catalog);

        // Old booking already gone, new slot prompt offered.
        assert!(store.bookings_for_customer("555").unwrap().is_empty());
        let [Action::SendChoice { options, .. }] = actions.as_slice() else {
            panic!("expected slot selection");
        };
        assert_eq!(options.len(), catalog.slots().len());

        // If the customer never completes the rebook (e.g. the new
        // slot gets taken), they are left with zero bookings. Known
        // gap, verified here.
        let steal = Booking::new(&date, catalog.slot(1).unwrap().clone(), "666", Service("Tinte".into()));
        store.book(steal).unwrap();
        let rebook = InboundEvent::reply(
            "555",
            ReplyPayload::ServiceChoice {
                index: 0,
                slot: Some(catalog.slot(1).unwrap().0.clone()),
            },
            "Corte de cabello",
        );
        let actions = run(rebook, &store, &catalog);
        let Action::SendText { body } = &actions[0] else {
            panic!("expected apology text")
        };
        assert!(body.contains("ya no está disponible"));
        assert!(store.bookings_for_customer("555").unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range_indices_fall_back_to_menu() {
        let (catalog, store) = setup();
        for payload in [
            ReplyPayload::SlotChoice { index: 99 },
            ReplyPayload::ServiceChoice {
                index: 99,
                slot: Some(catalog.slot(0).unwrap().0.clone()),
            },
        ] {
            let actions = run(InboundEvent::reply("555", payload, "?"), &store, &catalog);
            let [Action::SendChoice { body, .. }] = actions.as_slice() else {
                panic!("expected menu re-prompt");
            };
            assert!(body.starts_with("No entiendo"));
        }
    }

    #[test]
    fn test_unrecognized_event_reprompts_menu() {
        let (catalog, store) = setup();
        let event = InboundEvent {
            sender: "555".to_string(),
            kind: EventKind::Unrecognized,
        };
        let actions = run(event, &store, &catalog);
        assert!(matches!(actions.as_slice(), [Action::SendChoice { .. }]));
    }
}
