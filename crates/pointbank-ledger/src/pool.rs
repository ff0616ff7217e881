//! Grant pool reservations.

use chrono::Utc;

use pointbank_core::{Actor, LedgerError, Result};
use pointbank_store::LedgerTxn;

/// Checks and decrements a granter's pool inside an open atomic unit.
///
/// The granter row is read with an exclusive lock, so two grants against the
/// same pool cannot both pass a check only one of them can satisfy. The pool
/// is never increased here.
#[derive(Debug, Default, Clone, Copy)]
pub struct GrantPoolManager;

impl GrantPoolManager {
    /// Reserve `amount` points from `granter`'s pool.
    ///
    /// Returns the points left in the pool. The decrement only becomes
    /// durable if the enclosing unit commits.
    ///
    /// # Errors
    ///
    /// - `LedgerError::NotPermitted` if `granter` is a user.
    /// - `LedgerError::AccountNotFound` if the granter is missing or deleted.
    /// - `LedgerError::InsufficientPool` if the pool cannot cover `amount`.
    /// - `LedgerError::Storage` if the lock, read or write fails.
    pub fn reserve(&self, txn: &mut dyn LedgerTxn, granter: &Actor, amount: i64) -> Result<i64> {
        let remaining = match granter {
            Actor::Admin(id) => {
                let mut admin = txn
                    .admin_for_update(id)?
                    .filter(|admin| admin.status.is_active())
                    .ok_or_else(|| LedgerError::account_not_found(id))?;
                let remaining = admin.pool.withdraw(amount).map_err(|e| rejected(granter, e))?;
                admin.updated_at = Utc::now();
                txn.put_admin(&admin)?;
                remaining
            }
            Actor::Facilitator(id) => {
                let mut facilitator = txn
                    .facilitator_for_update(id)?
                    .filter(|facilitator| facilitator.status.is_active())
                    .ok_or_else(|| LedgerError::account_not_found(id))?;
                let remaining = facilitator
                    .pool
                    .withdraw(amount)
                    .map_err(|e| rejected(granter, e))?;
                facilitator.updated_at = Utc::now();
                txn.put_facilitator(&facilitator)?;
                remaining
            }
            Actor::User(_) => {
                return Err(LedgerError::NotPermitted(
                    "users cannot grant points".into(),
                ))
            }
        };

        tracing::debug!(granter = %granter, amount, remaining, "Grant pool reserved");
        Ok(remaining)
    }
}

fn rejected(granter: &Actor, err: LedgerError) -> LedgerError {
    tracing::debug!(granter = %granter, error = %err, "Grant pool reservation rejected");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointbank_core::{
        AdminAccount, AdminId, FacilitatorAccount, FacilitatorId, GrantPool, UserAccount, UserId,
    };
    use pointbank_store::{RocksStore, Store, Transactional};
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn seeded_admin(store: &RocksStore, pool: i64) -> AdminAccount {
        let admin = AdminAccount::new(AdminId::generate(), "Admin", GrantPool::new(pool).unwrap());
        store.insert_admin(&admin).unwrap();
        admin
    }

    #[test]
    fn reserve_decrements_on_commit() {
        let (store, _dir) = create_test_store();
        let admin = seeded_admin(&store, 500);

        let remaining = store
            .with_transaction(|txn| GrantPoolManager.reserve(txn, &Actor::Admin(admin.id), 200))
            .unwrap();

        assert_eq!(remaining, 300);
        let stored = store.get_admin(&admin.id).unwrap().unwrap();
        assert_eq!(stored.pool.available_to_grant, 300);
    }

    #[test]
    fn insufficient_pool_has_no_side_effect() {
        let (store, _dir) = create_test_store();
        let admin = seeded_admin(&store, 500);

        let result =
            store.with_transaction(|txn| GrantPoolManager.reserve(txn, &Actor::Admin(admin.id), 600));

        assert!(matches!(
            result,
            Err(LedgerError::InsufficientPool {
                available: 500,
                requested: 600
            })
        ));
        let stored = store.get_admin(&admin.id).unwrap().unwrap();
        assert_eq!(stored.pool.available_to_grant, 500);
    }

    #[test]
    fn reservation_is_discarded_when_unit_fails_later() {
        let (store, _dir) = create_test_store();
        let admin = seeded_admin(&store, 500);

        let result: Result<()> = store.with_transaction(|txn| {
            GrantPoolManager.reserve(txn, &Actor::Admin(admin.id), 200)?;
            Err(LedgerError::Storage("later step failed".into()))
        });

        assert!(result.is_err());
        let stored = store.get_admin(&admin.id).unwrap().unwrap();
        assert_eq!(stored.pool.available_to_grant, 500);
    }

    #[test]
    fn facilitator_pool_is_separate_from_admin_pool() {
        let (store, _dir) = create_test_store();
        let user = UserAccount::new(UserId::generate(), "qr-fac", "Fac User");
        store.insert_user(&user).unwrap();
        let facilitator = FacilitatorAccount::new(
            FacilitatorId::generate(),
            user.id,
            "Fac",
            GrantPool::new(50).unwrap(),
        );
        store.insert_facilitator(&facilitator).unwrap();

        let remaining = store
            .with_transaction(|txn| {
                GrantPoolManager.reserve(txn, &Actor::Facilitator(facilitator.id), 50)
            })
            .unwrap();
        assert_eq!(remaining, 0);

        let result = store.with_transaction(|txn| {
            GrantPoolManager.reserve(txn, &Actor::Facilitator(facilitator.id), 1)
        });
        assert!(matches!(result, Err(LedgerError::InsufficientPool { .. })));
    }

    #[test]
    fn deleted_or_unknown_granters_are_not_found() {
        let (store, _dir) = create_test_store();
        let admin = seeded_admin(&store, 500);
        store.delete_admin(&admin.id).unwrap();

        let deleted =
            store.with_transaction(|txn| GrantPoolManager.reserve(txn, &Actor::Admin(admin.id), 10));
        assert!(matches!(deleted, Err(LedgerError::AccountNotFound { .. })));

        let unknown = store.with_transaction(|txn| {
            GrantPoolManager.reserve(txn, &Actor::Admin(AdminId::generate()), 10)
        });
        assert!(matches!(unknown, Err(LedgerError::AccountNotFound { .. })));
    }

    #[test]
    fn users_cannot_reserve() {
        let (store, _dir) = create_test_store();
        let result = store.with_transaction(|txn| {
            GrantPoolManager.reserve(txn, &Actor::User(UserId::generate()), 10)
        });
        assert!(matches!(result, Err(LedgerError::NotPermitted(_))));
    }
}
