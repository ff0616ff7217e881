//! Event check-in handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use pointbank_core::EventId;

use crate::auth::AuthActor;
use crate::error::ApiError;
use crate::handlers::{blocking, parse_id, TransactionResponse};
use crate::state::AppState;

/// Check-in request, sent by the scanning device.
#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    /// Identifier read from the user's QR code.
    pub scan_id: String,
    /// Event being attended.
    pub event_id: String,
}

/// Check-in response.
#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    /// Checked-in user.
    pub user_id: String,
    /// Attended event.
    pub event_id: String,
    /// Points credited.
    pub points_awarded: i64,
    /// Balance after the top-up.
    pub new_balance: i64,
    /// Check-in timestamp.
    pub attended_at: String,
    /// The recorded ledger row.
    pub transaction: TransactionResponse,
}

/// Check a scanned user into an event (admin or facilitator).
pub async fn check_in(
    State(state): State<Arc<AppState>>,
    auth: AuthActor,
    Json(body): Json<CheckInRequest>,
) -> Result<Json<CheckInResponse>, ApiError> {
    let scanner = auth.require_granter()?;
    let event_id: EventId = parse_id(&body.event_id, "event ID")?;

    let check_ins = state.check_ins.clone();
    let scan_id = body.scan_id;
    let result = blocking(move || check_ins.check_in(&scan_id, &event_id)).await?;

    tracing::debug!(
        scanner = %scanner,
        user_id = %result.attendance.user_id,
        event_id = %event_id,
        "Scan accepted"
    );

    Ok(Json(CheckInResponse {
        user_id: result.attendance.user_id.to_string(),
        event_id: result.attendance.event_id.to_string(),
        points_awarded: result.points_awarded,
        new_balance: result.new_balance,
        attended_at: result.attendance.attended_at.to_rfc3339(),
        transaction: TransactionResponse::from(&result.transaction),
    }))
}
