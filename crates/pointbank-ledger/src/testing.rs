//! Shared fixtures for ledger unit tests.

use std::sync::Arc;

use pointbank_core::{
    AdminAccount, AdminId, Attendance, Event, EventId, FacilitatorAccount, FacilitatorId,
    GrantPool, PointTransaction, UserAccount, UserId,
};
use pointbank_store::{LedgerTxn, RocksStore, Store, StoreError, Transactional};
use tempfile::TempDir;

pub fn create_test_store() -> (Arc<RocksStore>, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = RocksStore::open(dir.path()).unwrap();
    (Arc::new(store), dir)
}

pub fn seed_admin(store: &RocksStore, pool: i64) -> AdminAccount {
    let admin = AdminAccount::new(AdminId::generate(), "Admin", GrantPool::new(pool).unwrap());
    store.insert_admin(&admin).unwrap();
    admin
}

pub fn seed_user(store: &RocksStore, scan_id: &str) -> UserAccount {
    let user = UserAccount::new(UserId::generate(), scan_id, format!("User {scan_id}"));
    store.insert_user(&user).unwrap();
    user
}

pub fn seed_facilitator(store: &RocksStore, pool: i64) -> FacilitatorAccount {
    let user = seed_user(store, &format!("fac-{}", UserId::generate()));
    let facilitator = FacilitatorAccount::new(
        FacilitatorId::generate(),
        user.id,
        "Facilitator",
        GrantPool::new(pool).unwrap(),
    );
    store.insert_facilitator(&facilitator).unwrap();
    facilitator
}

pub fn seed_event(store: &RocksStore, title: &str, point_amount: i64) -> Event {
    let event = Event::new(EventId::generate(), title, point_amount).unwrap();
    store.insert_event(&event).unwrap();
    event
}

/// A store whose ledger appends always fail, to exercise rollback.
pub struct FaultyStore {
    pub inner: Arc<RocksStore>,
}

impl Transactional for FaultyStore {
    fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn LedgerTxn) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.inner.with_transaction(|txn| f(&mut FaultyTxn { inner: txn }))
    }
}

struct FaultyTxn<'a> {
    inner: &'a mut dyn LedgerTxn,
}

impl LedgerTxn for FaultyTxn<'_> {
    fn admin_for_update(&mut self, id: &AdminId) -> pointbank_store::Result<Option<AdminAccount>> {
        self.inner.admin_for_update(id)
    }

    fn facilitator_for_update(
        &mut self,
        id: &FacilitatorId,
    ) -> pointbank_store::Result<Option<FacilitatorAccount>> {
        self.inner.facilitator_for_update(id)
    }

    fn user_for_update(&mut self, id: &UserId) -> pointbank_store::Result<Option<UserAccount>> {
        self.inner.user_for_update(id)
    }

    fn user_id_by_scan_id(&mut self, scan_id: &str) -> pointbank_store::Result<Option<UserId>> {
        self.inner.user_id_by_scan_id(scan_id)
    }

    fn event(&mut self, id: &EventId) -> pointbank_store::Result<Option<Event>> {
        self.inner.event(id)
    }

    fn put_admin(&mut self, admin: &AdminAccount) -> pointbank_store::Result<()> {
        self.inner.put_admin(admin)
    }

    fn put_facilitator(&mut self, facilitator: &FacilitatorAccount) -> pointbank_store::Result<()> {
        self.inner.put_facilitator(facilitator)
    }

    fn put_user(&mut self, user: &UserAccount) -> pointbank_store::Result<()> {
        self.inner.put_user(user)
    }

    fn insert_attendance(&mut self, attendance: &Attendance) -> pointbank_store::Result<bool> {
        self.inner.insert_attendance(attendance)
    }

    fn append_transaction(&mut self, _transaction: &PointTransaction) -> pointbank_store::Result<()> {
        Err(StoreError::Database("injected fault".into()))
    }
}
