//! Read-side queries over the ledger.
//!
//! Nothing here takes a lock or writes; results reflect the latest committed
//! state.

use std::sync::Arc;

use serde::Serialize;

use pointbank_core::{Actor, LedgerError, PointTransaction, Result, UserId};
use pointbank_store::{Store, TransactionQuery};

/// Grant activity of one admin or facilitator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantPoolSummary {
    /// Who owns the pool.
    pub granter: Actor,
    /// Display name of the granter.
    pub name: String,
    /// Points the granter can still hand out.
    pub available_to_grant: i64,
    /// Points handed out from the pool so far.
    pub granted_total: i64,
    /// Number of grants issued from the pool.
    pub grants_issued: usize,
}

/// Conservation check for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerAudit {
    /// The audited user.
    pub user_id: UserId,
    /// Stored balance.
    pub balance: i64,
    /// Sum of every ledger row received by the user.
    pub ledger_sum: i64,
    /// Number of ledger rows received by the user.
    pub transaction_count: usize,
}

impl LedgerAudit {
    /// Whether the stored balance equals the ledger sum.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.balance == self.ledger_sum
    }
}

/// Pure queries for history, pool summaries and audits.
pub struct LedgerReader<S> {
    store: Arc<S>,
}

impl<S> Clone for LedgerReader<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> LedgerReader<S> {
    /// Create a reader over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// A user's ledger rows, newest first.
    ///
    /// Deleted users keep their history.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` if the user never existed, or
    /// `LedgerError::Storage` if the read fails.
    pub fn transaction_history(
        &self,
        user_id: &UserId,
        query: &TransactionQuery,
    ) -> Result<Vec<PointTransaction>> {
        if self.store.get_user(user_id)?.is_none() {
            return Err(LedgerError::account_not_found(user_id));
        }
        Ok(self.store.list_transactions_by_user(user_id, query)?)
    }

    /// Pool state and grant totals for one active granter.
    ///
    /// # Errors
    ///
    /// - `LedgerError::NotPermitted` for user actors, who hold no pool.
    /// - `LedgerError::AccountNotFound` for a missing or deleted granter.
    /// - `LedgerError::Storage` if the read fails.
    pub fn grant_pool_summary(&self, granter: &Actor) -> Result<GrantPoolSummary> {
        let (name, available_to_grant) = match granter {
            Actor::Admin(id) => self
                .store
                .get_admin(id)?
                .filter(|admin| admin.status.is_active())
                .map(|admin| (admin.name, admin.pool.available_to_grant))
                .ok_or_else(|| LedgerError::account_not_found(id))?,
            Actor::Facilitator(id) => self
                .store
                .get_facilitator(id)?
                .filter(|facilitator| facilitator.status.is_active())
                .map(|facilitator| (facilitator.name, facilitator.pool.available_to_grant))
                .ok_or_else(|| LedgerError::account_not_found(id))?,
            Actor::User(_) => {
                return Err(LedgerError::NotPermitted("users have no grant pool".into()))
            }
        };
        self.summarize(*granter, name, available_to_grant)
    }

    /// Summaries for every active granter, administrators first.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Storage` if a read fails.
    pub fn grant_pool_summaries(&self, limit: usize, offset: usize) -> Result<Vec<GrantPoolSummary>> {
        let admins = self
            .store
            .list_admins()?
            .into_iter()
            .filter(|admin| admin.status.is_active())
            .map(|admin| (Actor::Admin(admin.id), admin.name, admin.pool.available_to_grant));
        let facilitators = self
            .store
            .list_facilitators()?
            .into_iter()
            .filter(|facilitator| facilitator.status.is_active())
            .map(|facilitator| {
                (
                    Actor::Facilitator(facilitator.id),
                    facilitator.name,
                    facilitator.pool.available_to_grant,
                )
            });

        admins
            .chain(facilitators)
            .skip(offset)
            .take(limit)
            .map(|(granter, name, available)| self.summarize(granter, name, available))
            .collect()
    }

    /// Compare a user's stored balance with the sum of their ledger rows.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` if the user never existed, or
    /// `LedgerError::Storage` if a read fails.
    pub fn audit_user(&self, user_id: &UserId) -> Result<LedgerAudit> {
        let user = self
            .store
            .get_user(user_id)?
            .ok_or_else(|| LedgerError::account_not_found(user_id))?;
        let rows = self
            .store
            .list_transactions_by_user(user_id, &TransactionQuery::all())?;

        let audit = LedgerAudit {
            user_id: user.id,
            balance: user.points,
            ledger_sum: rows.iter().map(|tx| tx.amount).sum(),
            transaction_count: rows.len(),
        };
        if !audit.is_consistent() {
            tracing::error!(
                user_id = %user_id,
                balance = audit.balance,
                ledger_sum = audit.ledger_sum,
                "Balance does not match ledger"
            );
        }
        Ok(audit)
    }

    fn summarize(&self, granter: Actor, name: String, available_to_grant: i64) -> Result<GrantPoolSummary> {
        let grants: Vec<_> = self
            .store
            .list_transactions_by_actor(&granter, &TransactionQuery::all())?
            .into_iter()
            .filter(PointTransaction::is_pool_grant)
            .collect();

        Ok(GrantPoolSummary {
            granter,
            name,
            available_to_grant,
            granted_total: grants.iter().map(|tx| tx.amount).sum(),
            grants_issued: grants.len(),
        })
    }
}
