//! API handlers.

pub mod check_ins;
pub mod grants;
pub mod health;
pub mod history;
pub mod provisioning;
pub mod redemptions;

use std::str::FromStr;

use serde::Serialize;

use pointbank_core::PointTransaction;

use crate::error::ApiError;

/// Run a ledger or store call on the blocking pool.
///
/// Row-lock waits and disk reads happen inside `f`, so they never stall the async runtime.
pub(crate) async fn blocking<T, E, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("ledger task failed: {e}")))?
        .map_err(Into::into)
}

/// Parse an identifier from a path or body field.
pub(crate) fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {what}")))
}

/// Ledger row as returned by the API.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: String,
    /// Receiving user.
    pub recipient_id: String,
    /// Who caused the change, if anyone.
    pub actor: Option<pointbank_core::Actor>,
    /// Transaction kind.
    pub kind: pointbank_core::TransactionKind,
    /// Signed amount.
    pub amount: i64,
    /// Balance after the row was applied.
    pub balance_after: i64,
    /// Description.
    pub description: String,
    /// Structured context.
    pub metadata: serde_json::Value,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&PointTransaction> for TransactionResponse {
    fn from(tx: &PointTransaction) -> Self {
        Self {
            id: tx.id.to_string(),
            recipient_id: tx.recipient.to_string(),
            actor: tx.actor,
            kind: tx.kind,
            amount: tx.amount,
            balance_after: tx.balance_after,
            description: tx.description.clone(),
            metadata: tx.metadata.clone(),
            created_at: tx.created_at.to_rfc3339(),
        }
    }
}
