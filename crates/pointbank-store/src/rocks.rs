//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` and
//! `Transactional` traits on top of a pessimistic `TransactionDB`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, MultiThreaded, Options,
    Transaction, TransactionDB, TransactionDBOptions,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use pointbank_core::{
    Actor, AdminAccount, AdminId, Attendance, Event, EventId, FacilitatorAccount, FacilitatorId,
    PointTransaction, Status, TransactionId, UserAccount, UserId,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{LedgerTxn, Store, Transactional, TransactionQuery};

/// Tuning for [`RocksStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// How long an atomic unit waits for a row lock before giving up.
    pub lock_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_millis(2000),
        }
    }
}

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<TransactionDB<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &StoreConfig::default())
    }

    /// Open or create a database with explicit tuning.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open_with<P: AsRef<Path>>(path: P, config: &StoreConfig) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let mut txn_opts = TransactionDBOptions::default();
        txn_opts.set_txn_lock_timeout(
            i64::try_from(config.lock_timeout.as_millis()).unwrap_or(i64::MAX),
        );

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = TransactionDB::open_cf_descriptors(&opts, &txn_opts, path, cf_descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn get_record<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        self.db
            .get_cf(&cf, key)?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn get_indexed_id(&self, cf_name: &str, key: &[u8]) -> Result<Option<[u8; 16]>> {
        let cf = self.cf(cf_name)?;
        self.db
            .get_cf(&cf, key)?
            .map(|value| {
                keys::decode_id(&value)
                    .ok_or_else(|| StoreError::Database(format!("malformed {cf_name} entry")))
            })
            .transpose()
    }

    fn scan_records<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item?;
            records.push(Self::deserialize(&value)?);
        }
        Ok(records)
    }

    /// Walk a transaction index under `prefix`, newest first.
    fn list_indexed(
        &self,
        index_cf: &str,
        prefix: &[u8],
        query: &TransactionQuery,
    ) -> Result<Vec<PointTransaction>> {
        let cf = self.cf(index_cf)?;

        // ULIDs are time-ordered, so forward iteration is oldest first.
        let mut index_keys: Vec<Vec<u8>> = Vec::new();
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(prefix, Direction::Forward));
        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            index_keys.push(key.to_vec());
        }
        index_keys.reverse();

        let mut transactions = Vec::new();
        let mut skipped = 0;

        for key in index_keys {
            if transactions.len() >= query.limit {
                break;
            }

            let tx_id = keys::trailing_transaction_id(&key)
                .ok_or_else(|| StoreError::Database(format!("malformed {index_cf} key")))?;
            let Some(tx) = self.get_transaction(&tx_id)? else {
                tracing::warn!(transaction_id = %tx_id, index = index_cf, "Dangling index entry");
                continue;
            };

            if !query.matches(&tx) {
                continue;
            }
            if skipped < query.offset {
                skipped += 1;
                continue;
            }

            transactions.push(tx);
        }

        Ok(transactions)
    }

    /// Run `f` inside a `RocksDB` transaction, committing on `Ok`.
    fn run_unit<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut RocksTxn<'_>) -> std::result::Result<T, E>,
        E: From<StoreError>,
    {
        let mut unit = RocksTxn {
            store: self,
            txn: self.db.transaction(),
        };

        match f(&mut unit) {
            Ok(value) => {
                unit.txn.commit().map_err(|e| E::from(StoreError::from(e)))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(e) = unit.txn.rollback() {
                    tracing::warn!(error = %e, "Rollback failed; discarding transaction");
                }
                Err(err)
            }
        }
    }

    /// Mark a record deleted, leaving already-deleted records untouched.
    fn soft_delete<T, F>(&self, cf_name: &str, key: &[u8], entity: &'static str, id: String, mark: F) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T) -> bool,
    {
        self.run_unit(|txn| {
            let mut record: T = txn
                .lock_record(cf_name, key)?
                .ok_or(StoreError::NotFound { entity, id })?;
            if mark(&mut record) {
                txn.write_record(cf_name, key, &record)?;
            }
            Ok(())
        })
    }
}

/// Flip `status` to deleted. Returns `false` if it already was.
fn mark_deleted(status: &mut Status) -> bool {
    if !status.is_active() {
        return false;
    }
    *status = Status::Deleted { at: Utc::now() };
    true
}

/// One open `RocksDB` transaction.
struct RocksTxn<'db> {
    store: &'db RocksStore,
    txn: Transaction<'db, TransactionDB<MultiThreaded>>,
}

impl RocksTxn<'_> {
    fn lock_raw(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf = self.store.cf(cf_name)?;
        Ok(self.txn.get_for_update_cf(&cf, key, true)?)
    }

    fn lock_record<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        self.lock_raw(cf_name, key)?
            .map(|data| RocksStore::deserialize(&data))
            .transpose()
    }

    fn read_raw(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf = self.store.cf(cf_name)?;
        Ok(self.txn.get_cf(&cf, key)?)
    }

    fn write_raw(&self, cf_name: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let cf = self.store.cf(cf_name)?;
        Ok(self.txn.put_cf(&cf, key, value)?)
    }

    fn write_record<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        self.write_raw(cf_name, key, &RocksStore::serialize(value)?)
    }

    /// Write `value` under `key` unless the key is already present.
    fn insert_new<T: Serialize>(
        &self,
        cf_name: &str,
        key: &[u8],
        value: &T,
        entity: &'static str,
        id: impl ToString,
    ) -> Result<()> {
        if self.lock_raw(cf_name, key)?.is_some() {
            return Err(StoreError::Conflict {
                entity,
                id: id.to_string(),
            });
        }
        self.write_record(cf_name, key, value)
    }
}

impl LedgerTxn for RocksTxn<'_> {
    fn admin_for_update(&mut self, id: &AdminId) -> Result<Option<AdminAccount>> {
        self.lock_record(cf::ADMINS, id.as_bytes())
    }

    fn facilitator_for_update(&mut self, id: &FacilitatorId) -> Result<Option<FacilitatorAccount>> {
        self.lock_record(cf::FACILITATORS, id.as_bytes())
    }

    fn user_for_update(&mut self, id: &UserId) -> Result<Option<UserAccount>> {
        self.lock_record(cf::USERS, id.as_bytes())
    }

    fn user_id_by_scan_id(&mut self, scan_id: &str) -> Result<Option<UserId>> {
        self.read_raw(cf::USERS_BY_SCAN_ID, &keys::scan_id_key(scan_id))?
            .map(|value| {
                keys::decode_id(&value)
                    .map(UserId::from_bytes)
                    .ok_or_else(|| StoreError::Database("malformed scan index entry".into()))
            })
            .transpose()
    }

    fn event(&mut self, id: &EventId) -> Result<Option<Event>> {
        self.read_raw(cf::EVENTS, id.as_bytes())?
            .map(|data| RocksStore::deserialize(&data))
            .transpose()
    }

    fn put_admin(&mut self, admin: &AdminAccount) -> Result<()> {
        self.write_record(cf::ADMINS, admin.id.as_bytes(), admin)
    }

    fn put_facilitator(&mut self, facilitator: &FacilitatorAccount) -> Result<()> {
        self.write_record(cf::FACILITATORS, facilitator.id.as_bytes(), facilitator)
    }

    fn put_user(&mut self, user: &UserAccount) -> Result<()> {
        self.write_record(cf::USERS, user.id.as_bytes(), user)
    }

    fn insert_attendance(&mut self, attendance: &Attendance) -> Result<bool> {
        let key = keys::attendance_key(&attendance.user_id, &attendance.event_id);
        if self.lock_raw(cf::ATTENDANCE, &key)?.is_some() {
            return Ok(false);
        }
        self.write_record(cf::ATTENDANCE, &key, attendance)?;
        Ok(true)
    }

    fn append_transaction(&mut self, transaction: &PointTransaction) -> Result<()> {
        let value = RocksStore::serialize(transaction)?;
        self.write_raw(cf::TRANSACTIONS, &transaction.id.to_bytes(), &value)?;
        self.write_raw(
            cf::TRANSACTIONS_BY_USER,
            &keys::user_transaction_key(&transaction.recipient, &transaction.id),
            &[],
        )?;
        if let Some(actor) = &transaction.actor {
            self.write_raw(
                cf::TRANSACTIONS_BY_ACTOR,
                &keys::actor_transaction_key(actor, &transaction.id),
                &[],
            )?;
        }
        Ok(())
    }
}

impl Transactional for RocksStore {
    fn with_transaction<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut dyn LedgerTxn) -> std::result::Result<T, E>,
        E: From<StoreError>,
    {
        self.run_unit(|txn| f(txn))
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Account Operations
    // =========================================================================

    fn insert_admin(&self, admin: &AdminAccount) -> Result<()> {
        self.run_unit(|txn| txn.insert_new(cf::ADMINS, admin.id.as_bytes(), admin, "admin", admin.id))
    }

    fn get_admin(&self, id: &AdminId) -> Result<Option<AdminAccount>> {
        self.get_record(cf::ADMINS, id.as_bytes())
    }

    fn list_admins(&self) -> Result<Vec<AdminAccount>> {
        self.scan_records(cf::ADMINS)
    }

    fn delete_admin(&self, id: &AdminId) -> Result<()> {
        self.soft_delete(cf::ADMINS, id.as_bytes(), "admin", id.to_string(), |admin: &mut AdminAccount| {
            admin.updated_at = Utc::now();
            mark_deleted(&mut admin.status)
        })
    }

    fn insert_facilitator(&self, facilitator: &FacilitatorAccount) -> Result<()> {
        self.run_unit(|txn| {
            let user_key = facilitator.user_id.as_bytes();
            let linked: Option<UserAccount> = txn.lock_record(cf::USERS, user_key)?;
            if !linked.is_some_and(|user| user.status.is_active()) {
                return Err(StoreError::NotFound {
                    entity: "user",
                    id: facilitator.user_id.to_string(),
                });
            }
            if txn.lock_raw(cf::FACILITATORS_BY_USER, user_key)?.is_some() {
                return Err(StoreError::Conflict {
                    entity: "facilitator for user",
                    id: facilitator.user_id.to_string(),
                });
            }
            txn.insert_new(
                cf::FACILITATORS,
                facilitator.id.as_bytes(),
                facilitator,
                "facilitator",
                facilitator.id,
            )?;
            txn.write_raw(cf::FACILITATORS_BY_USER, user_key, facilitator.id.as_bytes())
        })
    }

    fn get_facilitator(&self, id: &FacilitatorId) -> Result<Option<FacilitatorAccount>> {
        self.get_record(cf::FACILITATORS, id.as_bytes())
    }

    fn get_facilitator_for_user(&self, user_id: &UserId) -> Result<Option<FacilitatorAccount>> {
        match self.get_indexed_id(cf::FACILITATORS_BY_USER, user_id.as_bytes())? {
            Some(bytes) => self.get_facilitator(&FacilitatorId::from_bytes(bytes)),
            None => Ok(None),
        }
    }

    fn list_facilitators(&self) -> Result<Vec<FacilitatorAccount>> {
        self.scan_records(cf::FACILITATORS)
    }

    fn delete_facilitator(&self, id: &FacilitatorId) -> Result<()> {
        self.soft_delete(
            cf::FACILITATORS,
            id.as_bytes(),
            "facilitator",
            id.to_string(),
            |facilitator: &mut FacilitatorAccount| {
                facilitator.updated_at = Utc::now();
                mark_deleted(&mut facilitator.status)
            },
        )
    }

    fn insert_user(&self, user: &UserAccount) -> Result<()> {
        self.run_unit(|txn| {
            let scan_key = keys::scan_id_key(&user.scan_id);
            if txn.lock_raw(cf::USERS_BY_SCAN_ID, &scan_key)?.is_some() {
                return Err(StoreError::Conflict {
                    entity: "scan identifier",
                    id: user.scan_id.clone(),
                });
            }
            txn.insert_new(cf::USERS, user.id.as_bytes(), user, "user", user.id)?;
            txn.write_raw(cf::USERS_BY_SCAN_ID, &scan_key, user.id.as_bytes())
        })
    }

    fn get_user(&self, id: &UserId) -> Result<Option<UserAccount>> {
        self.get_record(cf::USERS, id.as_bytes())
    }

    fn find_user_by_scan_id(&self, scan_id: &str) -> Result<Option<UserAccount>> {
        match self.get_indexed_id(cf::USERS_BY_SCAN_ID, &keys::scan_id_key(scan_id))? {
            Some(bytes) => self.get_user(&UserId::from_bytes(bytes)),
            None => Ok(None),
        }
    }

    fn delete_user(&self, id: &UserId) -> Result<()> {
        self.soft_delete(cf::USERS, id.as_bytes(), "user", id.to_string(), |user: &mut UserAccount| {
            user.updated_at = Utc::now();
            mark_deleted(&mut user.status)
        })
    }

    // =========================================================================
    // Event Operations
    // =========================================================================

    fn insert_event(&self, event: &Event) -> Result<()> {
        self.run_unit(|txn| txn.insert_new(cf::EVENTS, event.id.as_bytes(), event, "event", event.id))
    }

    fn get_event(&self, id: &EventId) -> Result<Option<Event>> {
        self.get_record(cf::EVENTS, id.as_bytes())
    }

    fn delete_event(&self, id: &EventId) -> Result<()> {
        self.soft_delete(cf::EVENTS, id.as_bytes(), "event", id.to_string(), |event: &mut Event| {
            mark_deleted(&mut event.status)
        })
    }

    fn get_attendance(&self, user_id: &UserId, event_id: &EventId) -> Result<Option<Attendance>> {
        self.get_record(cf::ATTENDANCE, &keys::attendance_key(user_id, event_id))
    }

    // =========================================================================
    // Ledger Queries
    // =========================================================================

    fn get_transaction(&self, id: &TransactionId) -> Result<Option<PointTransaction>> {
        self.get_record(cf::TRANSACTIONS, &id.to_bytes())
    }

    fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        query: &TransactionQuery,
    ) -> Result<Vec<PointTransaction>> {
        self.list_indexed(
            cf::TRANSACTIONS_BY_USER,
            &keys::user_transactions_prefix(user_id),
            query,
        )
    }

    fn list_transactions_by_actor(
        &self,
        actor: &Actor,
        query: &TransactionQuery,
    ) -> Result<Vec<PointTransaction>> {
        self.list_indexed(
            cf::TRANSACTIONS_BY_ACTOR,
            &keys::actor_transactions_prefix(actor),
            query,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointbank_core::{GrantPool, TransactionKind};
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn seeded_user(store: &RocksStore, scan_id: &str) -> UserAccount {
        let user = UserAccount::new(UserId::generate(), scan_id, "Test User");
        store.insert_user(&user).unwrap();
        user
    }

    #[test]
    fn admin_insert_and_read() {
        let (store, _dir) = create_test_store();
        let admin = AdminAccount::new(AdminId::generate(), "Root", GrantPool::new(500).unwrap());

        store.insert_admin(&admin).unwrap();

        let retrieved = store.get_admin(&admin.id).unwrap().unwrap();
        assert_eq!(retrieved.pool.available_to_grant, 500);
        assert_eq!(store.list_admins().unwrap().len(), 1);

        let again = store.insert_admin(&admin);
        assert!(matches!(again, Err(StoreError::Conflict { entity: "admin", .. })));
    }

    #[test]
    fn scan_identifier_resolves_and_is_unique() {
        let (store, _dir) = create_test_store();
        let user = seeded_user(&store, "qr-0001");

        let found = store.find_user_by_scan_id("qr-0001").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(store.find_user_by_scan_id("qr-9999").unwrap().is_none());

        let clash = UserAccount::new(UserId::generate(), "qr-0001", "Impostor");
        assert!(matches!(
            store.insert_user(&clash),
            Err(StoreError::Conflict { entity: "scan identifier", .. })
        ));
        assert!(store.get_user(&clash.id).unwrap().is_none());
    }

    #[test]
    fn facilitator_links_one_user() {
        let (store, _dir) = create_test_store();
        let user = seeded_user(&store, "qr-fac");
        let pool = GrantPool::new(100).unwrap();

        let facilitator = FacilitatorAccount::new(FacilitatorId::generate(), user.id, "Fac", pool);
        store.insert_facilitator(&facilitator).unwrap();

        let linked = store.get_facilitator_for_user(&user.id).unwrap().unwrap();
        assert_eq!(linked.id, facilitator.id);

        let second = FacilitatorAccount::new(FacilitatorId::generate(), user.id, "Fac 2", pool);
        assert!(matches!(
            store.insert_facilitator(&second),
            Err(StoreError::Conflict { .. })
        ));

        let orphan = FacilitatorAccount::new(FacilitatorId::generate(), UserId::generate(), "Orphan", pool);
        assert!(matches!(
            store.insert_facilitator(&orphan),
            Err(StoreError::NotFound { entity: "user", .. })
        ));
    }

    #[test]
    fn facilitator_cannot_link_deleted_user() {
        let (store, _dir) = create_test_store();
        let user = seeded_user(&store, "qr-gone");
        store.delete_user(&user.id).unwrap();

        let facilitator = FacilitatorAccount::new(
            FacilitatorId::generate(),
            user.id,
            "Fac",
            GrantPool::new(100).unwrap(),
        );
        assert!(matches!(
            store.insert_facilitator(&facilitator),
            Err(StoreError::NotFound { entity: "user", .. })
        ));
        assert!(store.get_facilitator(&facilitator.id).unwrap().is_none());
        assert!(store.get_facilitator_for_user(&user.id).unwrap().is_none());
    }

    #[test]
    fn soft_delete_keeps_the_record() {
        let (store, _dir) = create_test_store();
        let user = seeded_user(&store, "qr-del");

        store.delete_user(&user.id).unwrap();

        let deleted = store.get_user(&user.id).unwrap().unwrap();
        let Status::Deleted { at } = deleted.status else {
            panic!("user should be deleted");
        };

        // Deleting twice keeps the original timestamp.
        store.delete_user(&user.id).unwrap();
        let again = store.get_user(&user.id).unwrap().unwrap();
        assert_eq!(again.status, Status::Deleted { at });

        assert!(matches!(
            store.delete_user(&UserId::generate()),
            Err(StoreError::NotFound { entity: "user", .. })
        ));
    }

    #[test]
    fn event_soft_delete() {
        let (store, _dir) = create_test_store();
        let event = Event::new(EventId::generate(), "Launch", 50).unwrap();
        store.insert_event(&event).unwrap();

        store.delete_event(&event.id).unwrap();
        assert!(!store.get_event(&event.id).unwrap().unwrap().status.is_active());
    }

    #[test]
    fn committed_unit_is_visible() {
        let (store, _dir) = create_test_store();
        let mut user = seeded_user(&store, "qr-commit");
        let admin = Actor::Admin(AdminId::generate());

        let tx = PointTransaction::grant(user.id, admin, 40, 40, "Welcome".into());
        store
            .with_transaction(|txn| -> Result<()> {
                user.points = 40;
                txn.put_user(&user)?;
                txn.append_transaction(&tx)
            })
            .unwrap();

        assert_eq!(store.get_user(&user.id).unwrap().unwrap().points, 40);
        assert_eq!(store.get_transaction(&tx.id).unwrap().unwrap(), tx);
        assert_eq!(
            store
                .list_transactions_by_actor(&admin, &TransactionQuery::all())
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn failed_unit_leaves_no_trace() {
        let (store, _dir) = create_test_store();
        let mut user = seeded_user(&store, "qr-rollback");
        let tx = PointTransaction::grant(user.id, Actor::Admin(AdminId::generate()), 40, 40, "Lost".into());

        let result = store.with_transaction(|txn| -> Result<()> {
            user.points = 40;
            txn.put_user(&user)?;
            txn.append_transaction(&tx)?;
            Err(StoreError::Database("injected".into()))
        });

        assert!(result.is_err());
        assert_eq!(store.get_user(&user.id).unwrap().unwrap().points, 0);
        assert!(store.get_transaction(&tx.id).unwrap().is_none());
        assert!(store
            .list_transactions_by_user(&user.id, &TransactionQuery::all())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn attendance_insert_is_once_per_pair() {
        let (store, _dir) = create_test_store();
        let attendance = Attendance::now(UserId::generate(), EventId::generate());

        let first = store
            .with_transaction(|txn| txn.insert_attendance(&attendance))
            .unwrap();
        let second = store
            .with_transaction(|txn| txn.insert_attendance(&attendance))
            .unwrap();

        assert!(first);
        assert!(!second);
        assert_eq!(
            store
                .get_attendance(&attendance.user_id, &attendance.event_id)
                .unwrap(),
            Some(attendance)
        );
    }

    #[test]
    fn history_is_newest_first_with_kind_filter_and_pages() {
        let (store, _dir) = create_test_store();
        let user = seeded_user(&store, "qr-history");
        let admin = Actor::Admin(AdminId::generate());

        let rows = [
            PointTransaction::grant(user.id, admin, 100, 100, "Grant 1".into()),
            PointTransaction::event_topup(user.id, EventId::generate(), "Meetup", 50, 150),
            PointTransaction::redeem(user.id, 30, 120, "Sticker".into()),
            PointTransaction::grant(user.id, admin, 10, 130, "Grant 2".into()),
        ];
        for row in &rows {
            store
                .with_transaction(|txn| txn.append_transaction(row))
                .unwrap();
            std::thread::sleep(Duration::from_millis(2));
        }

        let all = store
            .list_transactions_by_user(&user.id, &TransactionQuery::all())
            .unwrap();
        let descriptions: Vec<_> = all.iter().map(|tx| tx.description.as_str()).collect();
        assert_eq!(
            descriptions,
            ["Grant 2", "Sticker", "Attended Meetup", "Grant 1"]
        );

        let grants = store
            .list_transactions_by_user(&user.id, &TransactionQuery::all().with_kind(TransactionKind::Grant))
            .unwrap();
        assert_eq!(grants.len(), 2);

        let page2 = store
            .list_transactions_by_user(
                &user.id,
                &TransactionQuery::page(1, 1).with_kind(TransactionKind::Grant),
            )
            .unwrap();
        assert_eq!(page2.len(), 1);
        assert_eq!(page2[0].description, "Grant 1");

        // The event top-up has no actor, so the admin index holds only grants.
        let by_admin = store
            .list_transactions_by_actor(&admin, &TransactionQuery::all())
            .unwrap();
        assert_eq!(by_admin.len(), 2);
    }
}
