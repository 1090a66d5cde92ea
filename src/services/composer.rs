//! Splits interpreter actions into transport-sized prompt units.
//! Every unit is independently renderable; continuation units carry a
//! short connective body instead of repeating the full text and are
//! flagged so the sender can throttle between them.

use crate::models::{Action, PromptUnit, MAX_CHOICES, MAX_ROWS};

const CONTINUATION_BODY: &str = "Más opciones:";

pub fn compose(actions: &[Action]) -> Vec<PromptUnit> {
    let mut units = vec![];
    for action in actions {
        match action {
            Action::SendText { body } => units.push(PromptUnit::Text { body: body.clone() }),
            Action::SendChoice { body, options } => {
                for (i, chunk) in options.chunks(MAX_CHOICES).enumerate() {
                    units.push(PromptUnit::Choice {
                        body: if i == 0 {
                            body.clone()
                        } else {
                            CONTINUATION_BODY.to_string()
                        },
                        options: chunk.to_vec(),
                        continuation: i > 0,
                    });
                }
            }
            Action::SendList {
                header,
                body,
                footer,
                button,
                rows,
            } => {
                for (i, chunk) in rows.chunks(MAX_ROWS).enumerate() {
                    units.push(PromptUnit::List {
                        header: header.clone(),
                        body: if i == 0 {
                            body.clone()
                        } else {
                            CONTINUATION_BODY.to_string()
                        },
                        footer: footer.clone(),
                        button: button.clone(),
                        rows: chunk.to_vec(),
                        continuation: i > 0,
                    });
                }
            }
            Action::NoOp => {}
        }
    }
    units
}
