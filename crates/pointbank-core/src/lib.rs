//! Core types for the pointbank loyalty ledger.
//!
//! This crate provides the foundational types shared by the store, the ledger
//! engine and the HTTP service:
//!
//! - **Identifiers**: `AdminId`, `FacilitatorId`, `UserId`, `EventId`, `TransactionId`
//! - **Accounts**: `AdminAccount`, `FacilitatorAccount`, `UserAccount`, `GrantPool`, `Actor`
//! - **Ledger**: `PointTransaction`, `TransactionKind`
//! - **Events**: `Event`, `Attendance`
//!
//! # Points
//!
//! Points are whole numbers stored as `i64`. A user's balance always equals
//! the sum of the ledger rows addressed to them; administrators and
//! facilitators draw grants from a separate, non-negative grant pool.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod error;
pub mod event;
pub mod ids;
pub mod points;

pub use account::{
    Actor, AdminAccount, FacilitatorAccount, GrantPool, Role, Status, UserAccount,
};
pub use error::{LedgerError, Result};
pub use event::{Attendance, Event};
pub use ids::{AdminId, EventId, FacilitatorId, IdError, TransactionId, UserId};
pub use points::{PointTransaction, TransactionKind, MAX_SAFE_POINTS};
