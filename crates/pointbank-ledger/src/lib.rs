//! Points ledger engine for pointbank.
//!
//! This crate is the only writer of user balances and grant pools. It is
//! built from four parts that all run inside one storage transaction per
//! operation:
//!
//! - [`GrantPoolManager`] checks and decrements an admin's or facilitator's pool
//! - [`TransactionRecorder`] appends the ledger row for every balance change
//! - [`PointEngine`] orchestrates grants, direct balance edits, redemptions
//!   and event top-ups
//! - [`AttendanceDeduplicator`] turns a QR scan at an event into at most one
//!   top-up per user and event
//!
//! [`LedgerReader`] offers the read side: transaction history, grant-pool
//! summaries and per-user conservation audits.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pointbank_core::{Actor, AdminAccount, AdminId, GrantPool, UserAccount, UserId};
//! use pointbank_ledger::PointEngine;
//! use pointbank_store::{RocksStore, Store};
//!
//! let store = Arc::new(RocksStore::open("/tmp/pointbank-db").unwrap());
//! let admin = AdminAccount::new(AdminId::generate(), "Root", GrantPool::new(500).unwrap());
//! let user = UserAccount::new(UserId::generate(), "qr-0001", "Ada");
//! store.insert_admin(&admin).unwrap();
//! store.insert_user(&user).unwrap();
//!
//! let engine = PointEngine::new(store);
//! let receipt = engine
//!     .grant(&Actor::Admin(admin.id), &user.id, 200, Some("bonus"))
//!     .unwrap();
//! assert_eq!(receipt.new_balance, 200);
//! assert_eq!(receipt.pool_remaining, 300);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod attendance;
pub mod engine;
pub mod pool;
pub mod queries;
pub mod recorder;

#[cfg(test)]
mod testing;

pub use attendance::{AttendanceDeduplicator, CheckIn};
pub use engine::{BalanceEdit, GrantReceipt, PointEngine, Redemption, TopUp};
pub use pool::GrantPoolManager;
pub use queries::{GrantPoolSummary, LedgerAudit, LedgerReader};
pub use recorder::TransactionRecorder;
