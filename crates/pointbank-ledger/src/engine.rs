//! Point transfer engine.
//!
//! [`PointEngine`] is the only code path that changes a user's `points`.
//! Each operation runs as one atomic unit: validation happens before any
//! I/O, then the pool, balance and ledger row are written together or not at
//! all. No operation retries on its own; an aborted call is safe to repeat.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use pointbank_core::points::{apply_delta, ensure_in_range, positive_amount};
use pointbank_core::{Actor, Event, LedgerError, PointTransaction, Result, UserAccount, UserId};
use pointbank_store::{LedgerTxn, Transactional};

use crate::pool::GrantPoolManager;
use crate::recorder::TransactionRecorder;

/// Outcome of a committed grant.
#[derive(Debug, Clone, Serialize)]
pub struct GrantReceipt {
    /// The recorded ledger row.
    pub transaction: PointTransaction,
    /// Recipient balance after the grant.
    pub new_balance: i64,
    /// Points left in the granter's pool.
    pub pool_remaining: i64,
}

/// Outcome of a direct balance edit.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceEdit {
    /// Balance after the edit.
    pub new_balance: i64,
    /// The recorded row, or `None` if the balance was already at the target.
    pub transaction: Option<PointTransaction>,
}

/// Outcome of a committed redemption.
#[derive(Debug, Clone, Serialize)]
pub struct Redemption {
    /// The recorded ledger row.
    pub transaction: PointTransaction,
    /// Balance after the redemption.
    pub new_balance: i64,
}

/// Outcome of an event top-up.
#[derive(Debug, Clone, Serialize)]
pub struct TopUp {
    /// The recorded ledger row.
    pub transaction: PointTransaction,
    /// Balance after the top-up.
    pub new_balance: i64,
}

/// Orchestrates every balance-changing operation.
pub struct PointEngine<S> {
    store: Arc<S>,
    pools: GrantPoolManager,
    recorder: TransactionRecorder,
}

impl<S> Clone for PointEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            pools: self.pools,
            recorder: self.recorder,
        }
    }
}

impl<S: Transactional> PointEngine<S> {
    /// Create an engine writing through `store`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            pools: GrantPoolManager,
            recorder: TransactionRecorder,
        }
    }

    /// The storage handle this engine writes through.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Move `amount` points from `granter`'s pool to `recipient`.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidAmount` for non-positive or out-of-range amounts.
    /// - `LedgerError::NotPermitted` if `granter` is a user.
    /// - `LedgerError::InsufficientPool` if the pool cannot cover `amount`.
    /// - `LedgerError::AccountNotFound` for a missing or deleted granter or recipient.
    /// - `LedgerError::Storage` if the unit could not commit.
    pub fn grant(
        &self,
        granter: &Actor,
        recipient: &UserId,
        amount: i64,
        description: Option<&str>,
    ) -> Result<GrantReceipt> {
        let amount = positive_amount(amount)?;
        if !granter.is_granter() {
            return Err(LedgerError::NotPermitted("users cannot grant points".into()));
        }
        let description = description.unwrap_or("Points granted").to_owned();

        let receipt = self
            .store
            .with_transaction(|txn| -> Result<GrantReceipt> {
                let pool_remaining = self.pools.reserve(txn, granter, amount)?;

                let mut user = active_user(txn, recipient)?;
                let new_balance = apply_delta(user.points, amount)?;
                user.points = new_balance;
                user.updated_at = Utc::now();
                txn.put_user(&user)?;

                let transaction = self.recorder.record(
                    txn,
                    PointTransaction::grant(*recipient, *granter, amount, new_balance, description),
                )?;

                Ok(GrantReceipt {
                    transaction,
                    new_balance,
                    pool_remaining,
                })
            })
            .map_err(|e| aborted("grant", e))?;

        tracing::info!(
            granter = %granter,
            recipient = %recipient,
            amount,
            new_balance = receipt.new_balance,
            pool_remaining = receipt.pool_remaining,
            transaction_id = %receipt.transaction.id,
            "Points granted"
        );

        Ok(receipt)
    }

    /// Overwrite `recipient`'s balance with `new_balance`.
    ///
    /// The difference is recorded as one `GRANT` row tagged as a balance
    /// edit. No grant pool is involved. When the balance already equals
    /// `new_balance` nothing is written.
    ///
    /// # Errors
    ///
    /// - `LedgerError::NotPermitted` unless `admin` is an administrator.
    /// - `LedgerError::InvalidAmount` for a negative or out-of-range balance.
    /// - `LedgerError::AccountNotFound` for a missing or deleted admin or recipient.
    /// - `LedgerError::Storage` if the unit could not commit.
    pub fn set_balance(
        &self,
        admin: &Actor,
        recipient: &UserId,
        new_balance: i64,
        reason: Option<&str>,
    ) -> Result<BalanceEdit> {
        let Actor::Admin(admin_id) = admin else {
            return Err(LedgerError::NotPermitted(
                "only administrators can set balances".into(),
            ));
        };
        if new_balance < 0 {
            return Err(LedgerError::InvalidAmount(format!(
                "balance cannot be negative: {new_balance}"
            )));
        }
        let new_balance = ensure_in_range(new_balance)?;
        let reason = reason.unwrap_or("Balance adjusted").to_owned();

        let edit = self
            .store
            .with_transaction(|txn| -> Result<BalanceEdit> {
                txn.admin_for_update(admin_id)?
                    .filter(|account| account.status.is_active())
                    .ok_or_else(|| LedgerError::account_not_found(admin_id))?;

                let mut user = active_user(txn, recipient)?;
                let previous = user.points;
                let delta = new_balance - previous;
                if delta == 0 {
                    return Ok(BalanceEdit {
                        new_balance,
                        transaction: None,
                    });
                }

                user.points = new_balance;
                user.updated_at = Utc::now();
                txn.put_user(&user)?;

                let transaction = self.recorder.record(
                    txn,
                    PointTransaction::balance_edit(*recipient, *admin, delta, previous, reason),
                )?;

                Ok(BalanceEdit {
                    new_balance,
                    transaction: Some(transaction),
                })
            })
            .map_err(|e| aborted("set_balance", e))?;

        match &edit.transaction {
            Some(tx) => tracing::info!(
                admin = %admin,
                recipient = %recipient,
                delta = tx.amount,
                new_balance,
                transaction_id = %tx.id,
                "Balance set"
            ),
            None => tracing::debug!(
                admin = %admin,
                recipient = %recipient,
                new_balance,
                "Balance already at target; nothing recorded"
            ),
        }

        Ok(edit)
    }

    /// Spend `amount` of `user`'s points.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidAmount` for non-positive or out-of-range amounts.
    /// - `LedgerError::AccountNotFound` for a missing or deleted user.
    /// - `LedgerError::InsufficientBalance` if the balance cannot cover `amount`.
    /// - `LedgerError::Storage` if the unit could not commit.
    pub fn redeem(&self, user: &UserId, amount: i64, description: Option<&str>) -> Result<Redemption> {
        let amount = positive_amount(amount)?;
        let description = description.unwrap_or("Points redeemed").to_owned();

        let redemption = self
            .store
            .with_transaction(|txn| -> Result<Redemption> {
                let mut account = active_user(txn, user)?;
                if !account.has_sufficient_points(amount) {
                    return Err(LedgerError::InsufficientBalance {
                        balance: account.points,
                        required: amount,
                    });
                }

                let new_balance = apply_delta(account.points, -amount)?;
                account.points = new_balance;
                account.updated_at = Utc::now();
                txn.put_user(&account)?;

                let transaction = self.recorder.record(
                    txn,
                    PointTransaction::redeem(*user, amount, new_balance, description),
                )?;

                Ok(Redemption {
                    transaction,
                    new_balance,
                })
            })
            .map_err(|e| aborted("redeem", e))?;

        tracing::info!(
            user = %user,
            amount,
            new_balance = redemption.new_balance,
            transaction_id = %redemption.transaction.id,
            "Points redeemed"
        );

        Ok(redemption)
    }

    /// Credit `event.point_amount` to an already locked `user`.
    ///
    /// Only the attendance deduplicator calls this, inside the same unit that
    /// created the attendance row.
    pub(crate) fn top_up_for_event(
        &self,
        txn: &mut dyn LedgerTxn,
        mut user: UserAccount,
        event: &Event,
    ) -> Result<TopUp> {
        let new_balance = apply_delta(user.points, event.point_amount)?;
        user.points = new_balance;
        user.updated_at = Utc::now();
        txn.put_user(&user)?;

        let transaction = self.recorder.record(
            txn,
            PointTransaction::event_topup(
                user.id,
                event.id,
                &event.title,
                event.point_amount,
                new_balance,
            ),
        )?;

        Ok(TopUp {
            transaction,
            new_balance,
        })
    }
}

/// Lock `id` and require it to be an active user.
fn active_user(txn: &mut dyn LedgerTxn, id: &UserId) -> Result<UserAccount> {
    txn.user_for_update(id)?
        .filter(|user| user.status.is_active())
        .ok_or_else(|| LedgerError::account_not_found(id))
}

/// Log why a unit did not commit and pass the error on.
pub(crate) fn aborted(operation: &'static str, err: LedgerError) -> LedgerError {
    if err.is_business() {
        tracing::debug!(operation, error = %err, "Ledger operation rejected");
    } else {
        tracing::error!(operation, error = %err, "Ledger operation rolled back");
    }
    err
}
