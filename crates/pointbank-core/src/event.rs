//! Events and attendance records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::Status;
use crate::error::Result;
use crate::points;
use crate::{EventId, UserId};

/// An event users can check into for a fixed point award.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Event ID.
    pub id: EventId,

    /// Title shown to users and used in ledger descriptions.
    pub title: String,

    /// Points awarded per attendance.
    pub point_amount: i64,

    /// Lifecycle status.
    pub status: Status,

    /// When the event was created.
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Create a new active event.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidAmount` unless `point_amount` is positive.
    pub fn new(id: EventId, title: impl Into<String>, point_amount: i64) -> Result<Self> {
        Ok(Self {
            id,
            title: title.into(),
            point_amount: points::positive_amount(point_amount)?,
            status: Status::Active,
            created_at: Utc::now(),
        })
    }
}

/// Proof that a user attended an event. At most one exists per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    /// The attending user.
    pub user_id: UserId,

    /// The attended event.
    pub event_id: EventId,

    /// When the check-in happened.
    pub attended_at: DateTime<Utc>,
}

impl Attendance {
    /// Record attendance at the current time.
    #[must_use]
    pub fn now(user_id: UserId, event_id: EventId) -> Self {
        Self {
            user_id,
            event_id,
            attended_at: Utc::now(),
        }
    }
}
