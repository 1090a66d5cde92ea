use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::models::{EventKind, InboundEvent, ReplyPayload};
use crate::services::{composer, interpreter};
use crate::state::AppState;

// ── Verification handshake (GET /webhook) ──

#[derive(Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

pub async fn verify_webhook(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> Response {
    let subscribe = params.mode.as_deref() == Some("subscribe");
    let token_ok = params.verify_token.as_deref() == Some(state.config.verify_token.as_str());

    if subscribe && token_ok && !state.config.verify_token.is_empty() {
        tracing::info!("webhook verified");
        (StatusCode::OK, params.challenge.unwrap_or_default()).into_response()
    } else {
        tracing::warn!("webhook verification rejected");
        StatusCode::FORBIDDEN.into_response()
    }
}

// ── Inbound payload (POST /webhook) ──

#[derive(Deserialize)]
pub struct WebhookPayload {
    pub object: Option<String>,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Deserialize)]
pub struct Change {
    pub value: ChangeValue,
}

#[derive(Deserialize, Default)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Deserialize)]
pub struct Message {
    pub from: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<TextBody>,
    pub interactive: Option<Interactive>,
}

#[derive(Deserialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Deserialize)]
pub struct Interactive {
    pub button_reply: Option<InteractiveReply>,
    pub list_reply: Option<InteractiveReply>,
}

#[derive(Deserialize)]
pub struct InteractiveReply {
    pub id: String,
    pub title: String,
}

fn validate_signature(app_secret: &str, signature: &str, body: &[u8]) -> bool {
    let Some(hex_sig) = signature.strip_prefix("sha256=") else {
        return false;
    };

    let mut mac = match Hmac::<Sha256>::new_from_slice(app_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(body);
    let expected: String = mac
        .finalize()
        .into_bytes()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();

    expected == hex_sig
}

/// Turn the raw Cloud API payload into a normalized event. Status
/// updates and unsupported message kinds normalize to `None` and are
/// acknowledged without a reply. A reply id that fails to decode
/// becomes an `Unrecognized` event, never an error.
pub fn normalize(payload: &WebhookPayload) -> Option<InboundEvent> {
    let message = payload
        .entry
        .first()?
        .changes
        .first()?
        .value
        .messages
        .first()?;

    match message.kind.as_str() {
        "text" => {
            let body = message.text.as_ref()?.body.clone();
            Some(InboundEvent::text(&message.from, &body))
        }
        "interactive" => {
            let interactive = message.interactive.as_ref()?;
            let reply = interactive
                .button_reply
                .as_ref()
                .or(interactive.list_reply.as_ref())?;

            match ReplyPayload::parse(&reply.id) {
                Ok(decoded) => Some(InboundEvent::reply(&message.from, decoded, &reply.title)),
                Err(e) => {
                    tracing::warn!(error = %e, from = %message.from, "undecodable reply id");
                    Some(InboundEvent {
                        sender: message.from.clone(),
                        kind: EventKind::Unrecognized,
                    })
                }
            }
        }
        other => {
            tracing::debug!(kind = other, "ignoring unsupported message kind");
            None
        }
    }
}

pub async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    // Validate signature over the raw body (skip if no app secret — dev mode)
    if !state.config.app_secret.is_empty() {
        let signature = headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !validate_signature(&state.config.app_secret, signature, body.as_bytes()) {
            tracing::warn!("invalid webhook signature");
            return (StatusCode::FORBIDDEN, "Invalid signature").into_response();
        }
    }

    let payload: WebhookPayload = match serde_json::from_str(&body) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "undecodable webhook body");
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    if payload.object.is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }

    if let Some(event) = normalize(&payload) {
        process_turn(&state, &event).await;
    }

    StatusCode::OK.into_response()
}

/// One inbound-event → outbound-prompt cycle: interpret, compose,
/// deliver in order with the configured inter-unit delay. A send
/// failure ends the turn; already-sent units stand, nothing retries.
pub async fn process_turn(state: &Arc<AppState>, event: &InboundEvent) {
    tracing::info!(sender = %event.sender, kind = ?event.kind, "processing turn");

    let actions = match interpreter::interpret(event, state.store.as_ref(), &state.catalog) {
        Ok(actions) => actions,
        Err(e) => {
            tracing::error!(error = %e, sender = %event.sender, "store unavailable, aborting turn");
            vec![crate::models::Action::SendText {
                body: interpreter::STORE_APOLOGY.to_string(),
            }]
        }
    };

    let units = composer::compose(&actions);
    for (i, unit) in units.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(state.config.send_delay_ms)).await;
        }
        if let Err(e) = state.messaging.send(&event.sender, unit).await {
            tracing::error!(error = %e, sender = %event.sender, unit = i, "failed to send prompt unit");
            break;
        }
    }
}
