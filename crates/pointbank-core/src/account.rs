//! Account types for pointbank.
//!
//! Three kinds of account exist. Administrators and facilitators hold a
//! [`GrantPool`] they hand points out from; users hold the spendable balance
//! and are found by the scan identifier printed in their QR code.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::points;
use crate::{AdminId, FacilitatorId, UserId};

/// Lifecycle status shared by accounts and events.
///
/// Records are never physically removed so that historical transactions stay
/// attributable; deletion only flips the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Status {
    /// The record takes part in ledger operations.
    Active,

    /// The record was logically deleted.
    Deleted {
        /// When the record was deleted.
        at: DateTime<Utc>,
    },
}

impl Status {
    /// Check if the record is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// The finite allowance an administrator or facilitator may still hand out.
///
/// Grants only ever decrease it; replenishment happens outside the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantPool {
    /// Points that can still be granted. Never negative.
    pub available_to_grant: i64,
}

impl GrantPool {
    /// Create a pool holding `available_to_grant` points.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidAmount` for negative or out-of-range sizes.
    pub fn new(available_to_grant: i64) -> Result<Self> {
        if available_to_grant < 0 {
            return Err(LedgerError::InvalidAmount(format!(
                "grant pool cannot be negative: {available_to_grant}"
            )));
        }
        points::ensure_in_range(available_to_grant)?;
        Ok(Self { available_to_grant })
    }

    /// Check if the pool can cover a grant of `amount` points.
    #[must_use]
    pub const fn can_cover(&self, amount: i64) -> bool {
        self.available_to_grant >= amount
    }

    /// Take `amount` points out of the pool.
    ///
    /// On failure the pool is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InsufficientPool` if the pool would go negative.
    pub fn withdraw(&mut self, amount: i64) -> Result<i64> {
        if !self.can_cover(amount) {
            return Err(LedgerError::InsufficientPool {
                available: self.available_to_grant,
                requested: amount,
            });
        }
        self.available_to_grant -= amount;
        Ok(self.available_to_grant)
    }
}

/// An administrator: a global grantor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAccount {
    /// Account ID.
    pub id: AdminId,

    /// Display name.
    pub name: String,

    /// Remaining grantable points.
    pub pool: GrantPool,

    /// Lifecycle status.
    pub status: Status,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl AdminAccount {
    /// Create a new active administrator.
    #[must_use]
    pub fn new(id: AdminId, name: impl Into<String>, pool: GrantPool) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            pool,
            status: Status::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A facilitator: a limited grantor tied to one user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilitatorAccount {
    /// Account ID.
    pub id: FacilitatorId,

    /// The user account this facilitator acts for (1:1).
    pub user_id: UserId,

    /// Display name.
    pub name: String,

    /// Remaining grantable points.
    pub pool: GrantPool,

    /// Lifecycle status.
    pub status: Status,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl FacilitatorAccount {
    /// Create a new active facilitator linked to `user_id`.
    #[must_use]
    pub fn new(
        id: FacilitatorId,
        user_id: UserId,
        name: impl Into<String>,
        pool: GrantPool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            name: name.into(),
            pool,
            status: Status::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An end user holding a spendable points balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    /// Account ID.
    pub id: UserId,

    /// Opaque identifier encoded in the user's QR code. Unique across users.
    pub scan_id: String,

    /// Display name.
    pub name: String,

    /// Spendable points. Equals the sum of this user's ledger rows.
    pub points: i64,

    /// Lifecycle status.
    pub status: Status,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    /// Create a new active user with a zero balance.
    #[must_use]
    pub fn new(id: UserId, scan_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            scan_id: scan_id.into(),
            name: name.into(),
            points: 0,
            status: Status::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the balance covers spending `amount` points.
    #[must_use]
    pub const fn has_sufficient_points(&self, amount: i64) -> bool {
        self.points >= amount
    }
}

/// Role of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Global grantor.
    Admin,
    /// Limited grantor.
    Facilitator,
    /// Point holder.
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Admin => "admin",
            Self::Facilitator => "facilitator",
            Self::User => "user",
        })
    }
}

/// An authenticated party acting on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum Actor {
    /// An administrator.
    Admin(AdminId),
    /// A facilitator.
    Facilitator(FacilitatorId),
    /// An end user.
    User(UserId),
}

impl Actor {
    /// The role this actor plays.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Admin(_) => Role::Admin,
            Self::Facilitator(_) => Role::Facilitator,
            Self::User(_) => Role::User,
        }
    }

    /// Whether this actor is allowed to hand out points.
    #[must_use]
    pub const fn is_granter(&self) -> bool {
        matches!(self, Self::Admin(_) | Self::Facilitator(_))
    }

    /// Raw identifier bytes, regardless of role.
    #[must_use]
    pub fn id_bytes(&self) -> &[u8; 16] {
        match self {
            Self::Admin(id) => id.as_bytes(),
            Self::Facilitator(id) => id.as_bytes(),
            Self::User(id) => id.as_bytes(),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin(id) => write!(f, "admin:{id}"),
            Self::Facilitator(id) => write!(f, "facilitator:{id}"),
            Self::User(id) => write!(f, "user:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_has_zero_balance() {
        let user = UserAccount::new(UserId::generate(), "qr-1", "Ada");
        assert_eq!(user.points, 0);
        assert!(user.status.is_active());
    }

    #[test]
    fn user_sufficient_points() {
        let mut user = UserAccount::new(UserId::generate(), "qr-1", "Ada");
        user.points = 100;

        assert!(user.has_sufficient_points(99));
        assert!(user.has_sufficient_points(100));
        assert!(!user.has_sufficient_points(101));
    }

    #[test]
    fn pool_withdraw_decrements() {
        let mut pool = GrantPool::new(500).unwrap();
        assert_eq!(pool.withdraw(200).unwrap(), 300);
        assert_eq!(pool.available_to_grant, 300);
    }

    #[test]
    fn pool_overdraw_leaves_pool_untouched() {
        let mut pool = GrantPool::new(500).unwrap();
        let err = pool.withdraw(600).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientPool {
                available: 500,
                requested: 600
            }
        ));
        assert_eq!(pool.available_to_grant, 500);
    }

    #[test]
    fn pool_can_be_drained_exactly() {
        let mut pool = GrantPool::new(50).unwrap();
        assert_eq!(pool.withdraw(50).unwrap(), 0);
        assert!(!pool.can_cover(1));
    }

    #[test]
    fn negative_pool_is_rejected() {
        assert!(matches!(
            GrantPool::new(-1),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn actor_roles() {
        assert_eq!(Actor::Admin(AdminId::generate()).role(), Role::Admin);
        assert!(Actor::Facilitator(FacilitatorId::generate()).is_granter());
        assert!(!Actor::User(UserId::generate()).is_granter());
    }

    #[test]
    fn actor_serializes_tagged() {
        let id = AdminId::generate();
        let json = serde_json::to_value(Actor::Admin(id)).unwrap();
        assert_eq!(json["role"], "admin");
        assert_eq!(json["id"], id.to_string());
    }

    #[test]
    fn deleted_status_is_inactive() {
        let status = Status::Deleted { at: Utc::now() };
        assert!(!status.is_active());
    }
}
