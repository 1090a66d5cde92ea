use crate::models::payload::ReplyPayload;

/// A normalized inbound chat event. Built once at the webhook
/// boundary; the interpreter never sees raw transport JSON or raw
/// reply-id strings.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    /// Channel-provided customer identifier (phone number).
    pub sender: String,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Free-form text message.
    Text(String),
    /// Button or list reply with its decoded payload.
    Reply { payload: ReplyPayload, title: String },
    /// A reply whose id failed to decode. Handled like unknown text.
    Unrecognized,
}

impl InboundEvent {
    pub fn text(sender: &str, body: &str) -> Self {
        Self {
            sender: sender.to_string(),
            kind: EventKind::Text(body.to_string()),
        }
    }

    pub fn reply(sender: &str, payload: ReplyPayload, title: &str) -> Self {
        Self {
            sender: sender.to_string(),
            kind: EventKind::Reply {
                payload,
                title: title.to_string(),
            },
        }
    }
}
