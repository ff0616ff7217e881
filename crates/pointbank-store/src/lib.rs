//! `RocksDB` storage layer for pointbank.
//!
//! This crate provides persistent storage for accounts, events, attendance and
//! the append-only points ledger, using a `RocksDB` `TransactionDB` with
//! column families for efficient indexing.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `admins`, `facilitators`, `users`, `events`: primary records keyed by ID
//! - `facilitators_by_user`, `users_by_scan_id`: unique indexes
//! - `attendance`: one row per `(user, event)` pair
//! - `transactions`: ledger rows keyed by `transaction_id` (ULID)
//! - `transactions_by_user`, `transactions_by_actor`: history indexes
//!
//! Ledger mutations run inside [`Transactional::with_transaction`]. The
//! closure receives a [`LedgerTxn`] whose `*_for_update` reads take an
//! exclusive row lock, so concurrent check-then-write sequences on the same
//! row serialize. Returning `Ok` commits every write at once; returning
//! `Err` discards all of them.
//!
//! # Example
//!
//! ```no_run
//! use pointbank_store::{RocksStore, Store};
//! use pointbank_core::{UserAccount, UserId};
//!
//! let store = RocksStore::open("/tmp/pointbank-db").unwrap();
//!
//! let user = UserAccount::new(UserId::generate(), "qr-0001", "Ada");
//! store.insert_user(&user).unwrap();
//!
//! let found = store.find_user_by_scan_id("qr-0001").unwrap();
//! assert!(found.is_some());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::{RocksStore, StoreConfig};

use pointbank_core::{
    Actor, AdminAccount, AdminId, Attendance, Event, EventId, FacilitatorAccount, FacilitatorId,
    PointTransaction, TransactionId, TransactionKind, UserAccount, UserId,
};

/// Filter and page for transaction history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionQuery {
    /// Only return rows of this kind.
    pub kind: Option<TransactionKind>,
    /// Maximum number of rows to return.
    pub limit: usize,
    /// Number of matching rows to skip (newest first).
    pub offset: usize,
}

impl TransactionQuery {
    /// Every row, newest first.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            kind: None,
            limit: usize::MAX,
            offset: 0,
        }
    }

    /// One page of rows, newest first.
    #[must_use]
    pub const fn page(limit: usize, offset: usize) -> Self {
        Self {
            kind: None,
            limit,
            offset,
        }
    }

    /// Restrict the query to one transaction kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    fn matches(&self, tx: &PointTransaction) -> bool {
        self.kind.map_or(true, |kind| tx.kind == kind)
    }
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self::all()
    }
}

/// Read access and account provisioning.
///
/// Nothing here changes a balance or a grant pool after creation; those
/// fields are only written through [`LedgerTxn`].
pub trait Store: Send + Sync {
    // =========================================================================
    // Account Operations
    // =========================================================================

    /// Insert a new administrator.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the ID is taken.
    fn insert_admin(&self, admin: &AdminAccount) -> Result<()>;

    /// Get an administrator by ID, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_admin(&self, id: &AdminId) -> Result<Option<AdminAccount>>;

    /// List all administrators.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_admins(&self) -> Result<Vec<AdminAccount>>;

    /// Soft-delete an administrator.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn delete_admin(&self, id: &AdminId) -> Result<()>;

    /// Insert a new facilitator and link it to its user account.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the linked user doesn't exist or is deleted.
    /// - `StoreError::Conflict` if the ID is taken or the user already has a facilitator.
    fn insert_facilitator(&self, facilitator: &FacilitatorAccount) -> Result<()>;

    /// Get a facilitator by ID, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_facilitator(&self, id: &FacilitatorId) -> Result<Option<FacilitatorAccount>>;

    /// Get the facilitator linked to a user account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_facilitator_for_user(&self, user_id: &UserId) -> Result<Option<FacilitatorAccount>>;

    /// List all facilitators.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_facilitators(&self) -> Result<Vec<FacilitatorAccount>>;

    /// Soft-delete a facilitator.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn delete_facilitator(&self, id: &FacilitatorId) -> Result<()>;

    /// Insert a new user and claim its scan identifier.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the ID or the scan identifier is taken.
    fn insert_user(&self, user: &UserAccount) -> Result<()>;

    /// Get a user by ID, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_user(&self, id: &UserId) -> Result<Option<UserAccount>>;

    /// Resolve a QR scan identifier to the user carrying it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_user_by_scan_id(&self, scan_id: &str) -> Result<Option<UserAccount>>;

    /// Soft-delete a user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn delete_user(&self, id: &UserId) -> Result<()>;

    // =========================================================================
    // Event Operations
    // =========================================================================

    /// Insert a new event.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the ID is taken.
    fn insert_event(&self, event: &Event) -> Result<()>;

    /// Get an event by ID, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_event(&self, id: &EventId) -> Result<Option<Event>>;

    /// Soft-delete an event.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the event doesn't exist.
    fn delete_event(&self, id: &EventId) -> Result<()>;

    /// Get the attendance record for a pair, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_attendance(&self, user_id: &UserId, event_id: &EventId) -> Result<Option<Attendance>>;

    // =========================================================================
    // Ledger Queries
    // =========================================================================

    /// Get a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_transaction(&self, id: &TransactionId) -> Result<Option<PointTransaction>>;

    /// List transactions received by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        query: &TransactionQuery,
    ) -> Result<Vec<PointTransaction>>;

    /// List transactions caused by an actor, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_transactions_by_actor(
        &self,
        actor: &Actor,
        query: &TransactionQuery,
    ) -> Result<Vec<PointTransaction>>;
}

/// Scoped atomic units over the ledger.
pub trait Transactional: Send + Sync {
    /// Run `f` as one atomic unit.
    ///
    /// All writes made through the handle become visible together when `f`
    /// returns `Ok`. If `f` returns `Err`, or the commit itself fails, none of
    /// them are applied.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a `StoreError` converted into `E` if the
    /// commit fails.
    fn with_transaction<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut dyn LedgerTxn) -> std::result::Result<T, E>,
        E: From<StoreError>;
}

/// Reads and writes inside one atomic unit.
///
/// Methods ending in `_for_update` lock the row until the unit ends; the
/// value they return is the latest committed one.
pub trait LedgerTxn {
    /// Lock and read an administrator.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock or read fails.
    fn admin_for_update(&mut self, id: &AdminId) -> Result<Option<AdminAccount>>;

    /// Lock and read a facilitator.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock or read fails.
    fn facilitator_for_update(&mut self, id: &FacilitatorId) -> Result<Option<FacilitatorAccount>>;

    /// Lock and read a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock or read fails.
    fn user_for_update(&mut self, id: &UserId) -> Result<Option<UserAccount>>;

    /// Resolve a scan identifier to a user ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn user_id_by_scan_id(&mut self, scan_id: &str) -> Result<Option<UserId>>;

    /// Read an event.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn event(&mut self, id: &EventId) -> Result<Option<Event>>;

    /// Write back an administrator.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn put_admin(&mut self, admin: &AdminAccount) -> Result<()>;

    /// Write back a facilitator.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn put_facilitator(&mut self, facilitator: &FacilitatorAccount) -> Result<()>;

    /// Write back a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn put_user(&mut self, user: &UserAccount) -> Result<()>;

    /// Create an attendance row unless one exists for the pair.
    ///
    /// Returns `false`, writing nothing, when the pair already attended.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock, read or write fails.
    fn insert_attendance(&mut self, attendance: &Attendance) -> Result<bool>;

    /// Append a ledger row and its history index entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn append_transaction(&mut self, transaction: &PointTransaction) -> Result<()>;
}
