//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Administrator records, keyed by `admin_id`.
    pub const ADMINS: &str = "admins";

    /// Facilitator records, keyed by `facilitator_id`.
    pub const FACILITATORS: &str = "facilitators";

    /// Index: facilitator linked to a user, keyed by `user_id`.
    /// Value is the `facilitator_id` bytes.
    pub const FACILITATORS_BY_USER: &str = "facilitators_by_user";

    /// User records, keyed by `user_id`.
    pub const USERS: &str = "users";

    /// Index: user by QR scan identifier, keyed by the identifier's UTF-8 bytes.
    /// Value is the `user_id` bytes.
    pub const USERS_BY_SCAN_ID: &str = "users_by_scan_id";

    /// Event records, keyed by `event_id`.
    pub const EVENTS: &str = "events";

    /// Attendance records, keyed by `user_id || event_id`.
    pub const ATTENDANCE: &str = "attendance";

    /// Ledger rows, keyed by `transaction_id` (ULID).
    pub const TRANSACTIONS: &str = "transactions";

    /// Index: ledger rows by recipient, keyed by `user_id || transaction_id`.
    /// Value is empty (index only).
    pub const TRANSACTIONS_BY_USER: &str = "transactions_by_user";

    /// Index: ledger rows by actor, keyed by `role || actor_id || transaction_id`.
    /// Value is empty (index only).
    pub const TRANSACTIONS_BY_ACTOR: &str = "transactions_by_actor";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::ADMINS,
        cf::FACILITATORS,
        cf::FACILITATORS_BY_USER,
        cf::USERS,
        cf::USERS_BY_SCAN_ID,
        cf::EVENTS,
        cf::ATTENDANCE,
        cf::TRANSACTIONS,
        cf::TRANSACTIONS_BY_USER,
        cf::TRANSACTIONS_BY_ACTOR,
    ]
}
