//! Pointbank HTTP API Service.
//!
//! This crate exposes the points ledger over HTTP:
//!
//! - Manual grants from admin and facilitator pools
//! - Direct balance edits by administrators
//! - Event check-ins via QR scan identifiers
//! - Redemptions by users
//! - Transaction history, grant-pool summaries and ledger audits
//! - Account and event provisioning
//!
//! # Authentication
//!
//! The service supports two authentication methods:
//!
//! 1. **HS256 JWT bearer tokens** - For admins, facilitators and users. The
//!    `role` and `sub` claims resolve to an [`pointbank_core::Actor`].
//! 2. **Service API key** - For provisioning accounts and events.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Read handlers need async for the router

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
