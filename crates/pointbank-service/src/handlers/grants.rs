//! Grant and balance-edit handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use pointbank_core::{points, UserId};
use pointbank_ledger::{BalanceEdit, GrantReceipt};

use crate::auth::AuthActor;
use crate::error::ApiError;
use crate::handlers::{blocking, parse_id, TransactionResponse};
use crate::state::AppState;

/// Grant request.
#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    /// Receiving user ID.
    pub recipient_id: String,
    /// Points to grant. Must be a positive integer.
    pub amount: serde_json::Value,
    /// Optional description shown in the recipient's history.
    pub description: Option<String>,
}

/// Grant response.
#[derive(Debug, Serialize)]
pub struct GrantResponse {
    /// Recipient balance after the grant.
    pub new_balance: i64,
    /// Points left in the caller's pool.
    pub pool_remaining: i64,
    /// The recorded ledger row.
    pub transaction: TransactionResponse,
}

impl From<&GrantReceipt> for GrantResponse {
    fn from(receipt: &GrantReceipt) -> Self {
        Self {
            new_balance: receipt.new_balance,
            pool_remaining: receipt.pool_remaining,
            transaction: TransactionResponse::from(&receipt.transaction),
        }
    }
}

/// Grant points from the caller's pool.
pub async fn grant(
    State(state): State<Arc<AppState>>,
    auth: AuthActor,
    Json(body): Json<GrantRequest>,
) -> Result<Json<GrantResponse>, ApiError> {
    let amount = points::from_json(&body.amount)?;
    let recipient: UserId = parse_id(&body.recipient_id, "recipient ID")?;

    let engine = state.engine.clone();
    let granter = auth.actor;
    let receipt = blocking(move || {
        engine.grant(&granter, &recipient, amount, body.description.as_deref())
    })
    .await?;

    Ok(Json(GrantResponse::from(&receipt)))
}

/// Balance edit request.
#[derive(Debug, Deserialize)]
pub struct SetBalanceRequest {
    /// Target balance. Must be a non-negative integer.
    pub balance: serde_json::Value,
    /// Optional reason recorded on the ledger row.
    pub reason: Option<String>,
}

/// Balance edit response.
#[derive(Debug, Serialize)]
pub struct SetBalanceResponse {
    /// User ID.
    pub user_id: String,
    /// Balance after the edit.
    pub new_balance: i64,
    /// The recorded row, absent when the balance was already at the target.
    pub transaction: Option<TransactionResponse>,
}

impl SetBalanceResponse {
    fn new(user_id: &UserId, edit: &BalanceEdit) -> Self {
        Self {
            user_id: user_id.to_string(),
            new_balance: edit.new_balance,
            transaction: edit.transaction.as_ref().map(TransactionResponse::from),
        }
    }
}

/// Overwrite a user's balance (admin only).
pub async fn set_balance(
    State(state): State<Arc<AppState>>,
    auth: AuthActor,
    Path(user_id): Path<String>,
    Json(body): Json<SetBalanceRequest>,
) -> Result<Json<SetBalanceResponse>, ApiError> {
    let user_id: UserId = parse_id(&user_id, "user ID")?;
    let balance = points::from_json(&body.balance)?;

    let engine = state.engine.clone();
    let admin = auth.actor;
    let edit = blocking(move || {
        engine.set_balance(&admin, &user_id, balance, body.reason.as_deref())
    })
    .await?;

    Ok(Json(SetBalanceResponse::new(&user_id, &edit)))
}
