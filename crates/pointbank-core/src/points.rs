//! Ledger transaction types and point arithmetic.
//!
//! Every change to a user's balance is recorded as a [`PointTransaction`].
//! Rows are appended once and never updated or deleted.
//!
//! Points are whole numbers held in `i64`, bounded to the range a JSON client
//! can represent exactly (`±(2^53 - 1)`). Arithmetic that would leave that
//! range fails with [`LedgerError::InvalidAmount`] instead of wrapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::{Actor, EventId, TransactionId, UserId};

/// Largest point value accepted anywhere in the ledger.
pub const MAX_SAFE_POINTS: i64 = 9_007_199_254_740_991;

/// Fail with `InvalidAmount` unless `value` lies in `±MAX_SAFE_POINTS`.
///
/// # Errors
///
/// Returns `LedgerError::InvalidAmount` when out of range.
pub fn ensure_in_range(value: i64) -> Result<i64> {
    if (-MAX_SAFE_POINTS..=MAX_SAFE_POINTS).contains(&value) {
        Ok(value)
    } else {
        Err(LedgerError::InvalidAmount(format!(
            "{value} is outside the safe points range"
        )))
    }
}

/// Validate an amount that must be strictly positive (grants, redemptions).
///
/// # Errors
///
/// Returns `LedgerError::InvalidAmount` for zero, negative or out-of-range input.
pub fn positive_amount(amount: i64) -> Result<i64> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount(format!(
            "amount must be a positive integer, got {amount}"
        )));
    }
    ensure_in_range(amount)
}

/// Add `delta` to `balance`, failing closed on overflow.
///
/// # Errors
///
/// Returns `LedgerError::InvalidAmount` if the result leaves the safe range.
pub fn apply_delta(balance: i64, delta: i64) -> Result<i64> {
    balance
        .checked_add(delta)
        .ok_or_else(|| LedgerError::InvalidAmount(format!("{balance} + {delta} overflows")))
        .and_then(ensure_in_range)
}

/// Parse a JSON number into a point amount.
///
/// Fractional values, non-numbers and numbers beyond `i64` are rejected.
///
/// # Errors
///
/// Returns `LedgerError::InvalidAmount` for anything that is not a whole number.
pub fn from_json(value: &serde_json::Value) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| LedgerError::InvalidAmount(format!("{value} is not an integer")))
        .and_then(ensure_in_range)
}

/// Cause of a balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Points handed out by an admin or facilitator, or a direct balance edit.
    Grant,

    /// Points awarded for attending an event.
    EventTopup,

    /// Points spent on a prize.
    Redeem,
}

impl std::str::FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GRANT" => Ok(Self::Grant),
            "EVENT_TOPUP" => Ok(Self::EventTopup),
            "REDEEM" => Ok(Self::Redeem),
            _ => Err(LedgerError::InvalidInput(format!(
                "unknown transaction kind: {s}"
            ))),
        }
    }
}

/// An immutable ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointTransaction {
    /// Unique transaction ID (ULID for time-ordering).
    pub id: TransactionId,

    /// The user whose balance changed.
    pub recipient: UserId,

    /// Who caused the change. `None` for system-caused rows (event top-ups).
    pub actor: Option<Actor>,

    /// Signed amount. Positive = credit, negative = debit.
    pub amount: i64,

    /// Cause of the change.
    pub kind: TransactionKind,

    /// Recipient balance after this row was applied.
    pub balance_after: i64,

    /// Human-readable description.
    pub description: String,

    /// Structured context (origin, event, previous balance).
    pub metadata: serde_json::Value,

    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

impl PointTransaction {
    fn build(
        recipient: UserId,
        actor: Option<Actor>,
        amount: i64,
        kind: TransactionKind,
        balance_after: i64,
        description: String,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            recipient,
            actor,
            amount,
            kind,
            balance_after,
            description,
            metadata,
            created_at: Utc::now(),
        }
    }

    /// A manual grant from an admin or facilitator pool.
    #[must_use]
    pub fn grant(
        recipient: UserId,
        granter: Actor,
        amount: i64,
        balance_after: i64,
        description: String,
    ) -> Self {
        Self::build(
            recipient,
            Some(granter),
            amount,
            TransactionKind::Grant,
            balance_after,
            description,
            serde_json::json!({ "origin": "grant" }),
        )
    }

    /// A direct balance overwrite by an administrator.
    ///
    /// Recorded with kind `Grant`; `metadata.origin` tells it apart.
    #[must_use]
    pub fn balance_edit(
        recipient: UserId,
        admin: Actor,
        delta: i64,
        previous_balance: i64,
        reason: String,
    ) -> Self {
        Self::build(
            recipient,
            Some(admin),
            delta,
            TransactionKind::Grant,
            previous_balance + delta,
            reason,
            serde_json::json!({
                "origin": "balance_edit",
                "previous_balance": previous_balance,
            }),
        )
    }

    /// A system-caused top-up for attending an event.
    #[must_use]
    pub fn event_topup(
        recipient: UserId,
        event_id: EventId,
        event_title: &str,
        amount: i64,
        balance_after: i64,
    ) -> Self {
        Self::build(
            recipient,
            None,
            amount,
            TransactionKind::EventTopup,
            balance_after,
            format!("Attended {event_title}"),
            serde_json::json!({ "origin": "event", "event_id": event_id }),
        )
    }

    /// Whether this row drew on a grant pool (as opposed to a balance edit).
    #[must_use]
    pub fn is_pool_grant(&self) -> bool {
        self.kind == TransactionKind::Grant
            && self.metadata.get("origin").and_then(serde_json::Value::as_str) == Some("grant")
    }

    /// Points spent by the user.
    #[must_use]
    pub fn redeem(recipient: UserId, amount: i64, balance_after: i64, description: String) -> Self {
        Self::build(
            recipient,
            Some(Actor::User(recipient)),
            -amount.abs(),
            TransactionKind::Redeem,
            balance_after,
            description,
            serde_json::json!({ "origin": "redeem" }),
        )
    }
}
