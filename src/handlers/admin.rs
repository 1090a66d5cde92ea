use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /api/admin/bookings
#[derive(Serialize)]
pub struct BookingResponse {
    date: String,
    slot: String,
    customer_id: String,
    service: String,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let bookings = state.store.all_bookings()?;
    let response = bookings
        .into_iter()
        .map(|b| BookingResponse {
            date: b.date,
            slot: b.slot.0,
            customer_id: b.customer_id,
            service: b.service.0,
        })
        .collect();

    Ok(Json(response))
}

// POST /api/admin/bookings/cancel
#[derive(Deserialize)]
pub struct CancelRequest {
    pub date: String,
    pub slot: String,
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CancelRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let removed = state.store.cancel(&req.date, &req.slot)?;
    if !removed {
        return Err(AppError::NotFound(format!("{} {}", req.date, req.slot)));
    }

    tracing::info!(date = %req.date, slot = %req.slot, "booking cancelled by admin");
    Ok(Json(serde_json::json!({ "cancelled": true })))
}
