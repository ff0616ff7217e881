//! Event check-ins.
//!
//! Each `(user, event)` pair moves from not attended to attended exactly
//! once. The attendance row and the top-up it triggers are written in the
//! same unit, so a user is never marked attended without being paid, and is
//! never paid twice for one event.

use serde::Serialize;

use pointbank_core::{Attendance, EventId, LedgerError, PointTransaction, Result};
use pointbank_store::Transactional;

use crate::engine::{aborted, PointEngine};

/// Outcome of a successful check-in.
#[derive(Debug, Clone, Serialize)]
pub struct CheckIn {
    /// The new attendance row.
    pub attendance: Attendance,
    /// The `EVENT_TOPUP` ledger row.
    pub transaction: PointTransaction,
    /// Points credited for this event.
    pub points_awarded: i64,
    /// User balance after the top-up.
    pub new_balance: i64,
}

/// Turns QR scans at events into at most one top-up per user and event.
pub struct AttendanceDeduplicator<S> {
    engine: PointEngine<S>,
}

impl<S> Clone for AttendanceDeduplicator<S> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

impl<S: Transactional> AttendanceDeduplicator<S> {
    /// Create a deduplicator that pays out through `engine`.
    #[must_use]
    pub const fn new(engine: PointEngine<S>) -> Self {
        Self { engine }
    }

    /// Check the user carrying `scan_id` into `event_id`.
    ///
    /// # Errors
    ///
    /// - `LedgerError::EventNotFound` if the event is missing or deleted.
    /// - `LedgerError::UserNotFound` if no active user carries `scan_id`.
    /// - `LedgerError::AlreadyAttended` if the pair already checked in. Nothing
    ///   is written in that case.
    /// - `LedgerError::Storage` if the unit could not commit. The attendance
    ///   row is discarded along with the top-up.
    pub fn check_in(&self, scan_id: &str, event_id: &EventId) -> Result<CheckIn> {
        let check_in = self
            .engine
            .store()
            .with_transaction(|txn| -> Result<CheckIn> {
                let event = txn
                    .event(event_id)?
                    .filter(|event| event.status.is_active())
                    .ok_or_else(|| LedgerError::EventNotFound {
                        event_id: event_id.to_string(),
                    })?;

                let user_not_found = || LedgerError::UserNotFound {
                    scan_id: scan_id.to_owned(),
                };
                let user_id = txn.user_id_by_scan_id(scan_id)?.ok_or_else(user_not_found)?;
                let user = txn
                    .user_for_update(&user_id)?
                    .filter(|user| user.status.is_active())
                    .ok_or_else(user_not_found)?;

                let attendance = Attendance::now(user.id, event.id);
                if !txn.insert_attendance(&attendance)? {
                    return Err(LedgerError::AlreadyAttended {
                        user_id: user.id.to_string(),
                        event_id: event.id.to_string(),
                    });
                }

                let top_up = self.engine.top_up_for_event(txn, user, &event)?;

                Ok(CheckIn {
                    attendance,
                    points_awarded: event.point_amount,
                    new_balance: top_up.new_balance,
                    transaction: top_up.transaction,
                })
            })
            .map_err(|e| aborted("check_in", e))?;

        tracing::info!(
            user_id = %check_in.attendance.user_id,
            event_id = %event_id,
            points_awarded = check_in.points_awarded,
            new_balance = check_in.new_balance,
            transaction_id = %check_in.transaction.id,
            "Checked in"
        );

        Ok(check_in)
    }
}
