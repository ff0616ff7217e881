//! Error types for pointbank.

use crate::ids::IdError;

/// Result type for pointbank ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in ledger operations.
///
/// Every variant except [`LedgerError::Storage`] is an expected, user-facing
/// outcome detected before anything was written. `Storage` means the atomic
/// unit could not complete and was rolled back in full.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Amount is zero, negative, fractional or outside the safe range.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Malformed input other than an amount.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The granter's pool cannot cover the grant.
    #[error("insufficient grant pool: available={available}, requested={requested}")]
    InsufficientPool {
        /// Points left in the pool.
        available: i64,
        /// Points asked for.
        requested: i64,
    },

    /// The user's balance cannot cover a redemption.
    #[error("insufficient points: balance={balance}, required={required}")]
    InsufficientBalance {
        /// Current balance.
        balance: i64,
        /// Points asked for.
        required: i64,
    },

    /// No active account with this ID.
    #[error("account not found: {id}")]
    AccountNotFound {
        /// The identifier that was looked up.
        id: String,
    },

    /// No active user carries this scan identifier.
    #[error("no user for scan identifier: {scan_id}")]
    UserNotFound {
        /// The scanned identifier.
        scan_id: String,
    },

    /// No active event with this ID.
    #[error("event not found: {event_id}")]
    EventNotFound {
        /// The event identifier.
        event_id: String,
    },

    /// The user already checked into this event.
    #[error("user {user_id} already attended event {event_id}")]
    AlreadyAttended {
        /// The user.
        user_id: String,
        /// The event.
        event_id: String,
    },

    /// The actor's role does not allow this operation.
    #[error("not permitted: {0}")]
    NotPermitted(String),

    /// Storage failed during the atomic unit; nothing was applied.
    #[error("storage error: {0}")]
    Storage(String),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}

impl LedgerError {
    /// Whether this is an expected business outcome rather than a fault.
    #[must_use]
    pub const fn is_business(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }

    /// Shorthand for [`LedgerError::AccountNotFound`].
    #[must_use]
    pub fn account_not_found(id: impl ToString) -> Self {
        Self::AccountNotFound { id: id.to_string() }
    }
}
