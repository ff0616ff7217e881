//! Common test utilities for pointbank integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use jsonwebtoken::{encode, EncodingKey, Header};
use tempfile::TempDir;

use pointbank_core::{
    Actor, AdminAccount, AdminId, Event, EventId, FacilitatorAccount, FacilitatorId, GrantPool,
    UserAccount, UserId,
};
use pointbank_service::auth::JwtClaims;
use pointbank_service::{create_router, AppState, ServiceConfig};
use pointbank_store::{RocksStore, Store};

/// Secret used to sign test bearer tokens.
pub const JWT_SECRET: &str = "test-jwt-secret";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct store access for seeding and assertions.
    pub store: Arc<RocksStore>,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// The service API key for provisioning requests.
    pub service_api_key: String,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Arc::new(RocksStore::open(temp_dir.path()).expect("Failed to open store"));

        let service_api_key = "test-service-key".to_string();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            auth_jwt_secret: Some(JWT_SECRET.into()),
            auth_issuer: "pointbank".into(),
            service_api_key: Some(service_api_key.clone()),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            lock_timeout_ms: 2000,
        };

        let state = AppState::new(Arc::clone(&store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            _temp_dir: temp_dir,
            service_api_key,
        }
    }

    /// Authorization header value for `actor`.
    pub fn auth_header(actor: &Actor) -> String {
        let claims = JwtClaims::for_actor(actor, "pointbank", chrono::Duration::minutes(10));
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
        )
        .expect("Failed to sign token");
        format!("Bearer {token}")
    }

    /// Seed an administrator with a grant pool.
    pub fn seed_admin(&self, pool: i64) -> AdminAccount {
        let admin = AdminAccount::new(AdminId::generate(), "Admin", GrantPool::new(pool).unwrap());
        self.store.insert_admin(&admin).unwrap();
        admin
    }

    /// Seed a user with a scan identifier.
    pub fn seed_user(&self, scan_id: &str) -> UserAccount {
        let user = UserAccount::new(UserId::generate(), scan_id, format!("User {scan_id}"));
        self.store.insert_user(&user).unwrap();
        user
    }

    /// Seed a facilitator (and its linked user) with a grant pool.
    pub fn seed_facilitator(&self, pool: i64) -> FacilitatorAccount {
        let user = self.seed_user(&format!("fac-{}", UserId::generate()));
        let facilitator = FacilitatorAccount::new(
            FacilitatorId::generate(),
            user.id,
            "Facilitator",
            GrantPool::new(pool).unwrap(),
        );
        self.store.insert_facilitator(&facilitator).unwrap();
        facilitator
    }

    /// Seed an event.
    pub fn seed_event(&self, title: &str, point_amount: i64) -> Event {
        let event = Event::new(EventId::generate(), title, point_amount).unwrap();
        self.store.insert_event(&event).unwrap();
        event
    }

    /// Current stored balance of a user.
    pub fn balance(&self, user: &UserId) -> i64 {
        self.store.get_user(user).unwrap().unwrap().points
    }

    /// Current pool of an administrator.
    pub fn admin_pool(&self, admin: &AdminId) -> i64 {
        self.store
            .get_admin(admin)
            .unwrap()
            .unwrap()
            .pool
            .available_to_grant
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
