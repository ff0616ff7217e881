//! Read-only ledger handlers: history, audits and grant-pool summaries.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use pointbank_core::{TransactionKind, UserId};
use pointbank_ledger::{GrantPoolSummary, LedgerAudit};
use pointbank_store::TransactionQuery;

use crate::auth::AuthActor;
use crate::error::ApiError;
use crate::handlers::{blocking, parse_id, TransactionResponse};
use crate::state::AppState;

/// Default page size.
const DEFAULT_LIMIT: usize = 50;

/// Largest page a client may request.
const MAX_LIMIT: usize = 200;

/// Pagination parameters.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    /// Maximum number of items to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Number of items to skip.
    #[serde(default)]
    pub offset: usize,
}

const fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// History query parameters.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Only return rows of this kind (`GRANT`, `EVENT_TOPUP`, `REDEEM`).
    pub kind: Option<String>,
    /// Maximum number of rows to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Number of rows to skip.
    #[serde(default)]
    pub offset: usize,
}

/// Transaction history response.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Rows, newest first.
    pub transactions: Vec<TransactionResponse>,
    /// Applied page size.
    pub limit: usize,
    /// Applied offset.
    pub offset: usize,
}

/// List a user's transactions (admin, or the user themselves).
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    auth: AuthActor,
    Path(user_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let user_id: UserId = parse_id(&user_id, "user ID")?;
    if !auth.can_read_user(&user_id) {
        return Err(ApiError::Forbidden(
            "cannot read another user's history".into(),
        ));
    }

    let limit = params.limit.min(MAX_LIMIT);
    let mut query = TransactionQuery::page(limit, params.offset);
    if let Some(kind) = params.kind.as_deref() {
        query = query.with_kind(kind.parse::<TransactionKind>()?);
    }

    let reader = state.reader.clone();
    let transactions = blocking(move || reader.transaction_history(&user_id, &query)).await?;

    Ok(Json(HistoryResponse {
        transactions: transactions.iter().map(TransactionResponse::from).collect(),
        limit,
        offset: params.offset,
    }))
}

/// Audit response.
#[derive(Debug, Serialize)]
pub struct AuditResponse {
    /// Audit figures.
    #[serde(flatten)]
    pub audit: LedgerAudit,
    /// Whether the balance equals the ledger sum.
    pub consistent: bool,
}

/// Check one user's balance against their ledger (admin only).
pub async fn audit_user(
    State(state): State<Arc<AppState>>,
    auth: AuthActor,
    Path(user_id): Path<String>,
) -> Result<Json<AuditResponse>, ApiError> {
    auth.require_admin()?;
    let user_id: UserId = parse_id(&user_id, "user ID")?;

    let reader = state.reader.clone();
    let audit = blocking(move || reader.audit_user(&user_id)).await?;

    Ok(Json(AuditResponse {
        consistent: audit.is_consistent(),
        audit,
    }))
}

/// Grant-pool summaries response.
#[derive(Debug, Serialize)]
pub struct GrantPoolsResponse {
    /// One entry per active granter, administrators first.
    pub pools: Vec<GrantPoolSummary>,
    /// Applied page size.
    pub limit: usize,
    /// Applied offset.
    pub offset: usize,
}

/// List every active granter's pool (admin only).
pub async fn list_grant_pools(
    State(state): State<Arc<AppState>>,
    auth: AuthActor,
    Query(params): Query<PageParams>,
) -> Result<Json<GrantPoolsResponse>, ApiError> {
    auth.require_admin()?;

    let limit = params.limit.min(MAX_LIMIT);
    let reader = state.reader.clone();
    let offset = params.offset;
    let pools = blocking(move || reader.grant_pool_summaries(limit, offset)).await?;

    Ok(Json(GrantPoolsResponse {
        pools,
        limit,
        offset: params.offset,
    }))
}

/// The caller's own pool (admin or facilitator).
pub async fn my_grant_pool(
    State(state): State<Arc<AppState>>,
    auth: AuthActor,
) -> Result<Json<GrantPoolSummary>, ApiError> {
    let granter = auth.require_granter()?;
    let reader = state.reader.clone();
    let summary = blocking(move || reader.grant_pool_summary(&granter)).await?;
    Ok(Json(summary))
}
