//! Redemption handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use pointbank_core::points;

use crate::auth::AuthActor;
use crate::error::ApiError;
use crate::handlers::{blocking, TransactionResponse};
use crate::state::AppState;

/// Redemption request.
#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    /// Points to spend. Must be a positive integer.
    pub amount: serde_json::Value,
    /// What the points were spent on.
    pub description: Option<String>,
}

/// Redemption response.
#[derive(Debug, Serialize)]
pub struct RedeemResponse {
    /// Balance after the redemption.
    pub new_balance: i64,
    /// The recorded ledger row.
    pub transaction: TransactionResponse,
}

/// Spend the caller's own points.
pub async fn redeem(
    State(state): State<Arc<AppState>>,
    auth: AuthActor,
    Json(body): Json<RedeemRequest>,
) -> Result<Json<RedeemResponse>, ApiError> {
    let user_id = auth.require_user()?;
    let amount = points::from_json(&body.amount)?;

    let engine = state.engine.clone();
    let redemption =
        blocking(move || engine.redeem(&user_id, amount, body.description.as_deref())).await?;

    Ok(Json(RedeemResponse {
        new_balance: redemption.new_balance,
        transaction: TransactionResponse::from(&redemption.transaction),
    }))
}
