use serde::Serialize;

/// One tappable option inside a choice (button) prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceOption {
    pub id: String,
    pub title: String,
}

/// One row inside a list prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    pub description: String,
}

/// What the interpreter decided to say next. Logical content only;
/// the composer splits these into transport-sized units.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SendText {
        body: String,
    },
    SendChoice {
        body: String,
        options: Vec<ChoiceOption>,
    },
    SendList {
        header: String,
        body: String,
        footer: String,
        button: String,
        rows: Vec<ListRow>,
    },
    NoOp,
}

/// One independently renderable outbound message. Choice units carry
/// at most [`MAX_CHOICES`] options, list units at most [`MAX_ROWS`]
/// rows; continuations are flagged so the transport can throttle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromptUnit {
    Text {
        body: String,
    },
    Choice {
        body: String,
        options: Vec<ChoiceOption>,
        continuation: bool,
    },
    List {
        header: String,
        body: String,
        footer: String,
        button: String,
        rows: Vec<ListRow>,
        continuation: bool,
    },
}

/// WhatsApp caps interactive button messages at 3 reply buttons.
pub const MAX_CHOICES: usize = 3;

/// WhatsApp caps interactive list messages at 10 rows.
pub const MAX_ROWS: usize = 10;
