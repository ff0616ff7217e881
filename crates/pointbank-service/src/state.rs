//! Application state.

use std::sync::Arc;

use pointbank_ledger::{AttendanceDeduplicator, LedgerReader, PointEngine};
use pointbank_store::RocksStore;

use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend, used directly for provisioning.
    pub store: Arc<RocksStore>,

    /// Grants, balance edits and redemptions.
    pub engine: PointEngine<RocksStore>,

    /// Event check-ins.
    pub check_ins: AttendanceDeduplicator<RocksStore>,

    /// History, summaries and audits.
    pub reader: LedgerReader<RocksStore>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        if config.auth_jwt_secret.is_none() {
            tracing::warn!("AUTH_JWT_SECRET not configured - bearer tokens will be rejected");
        }
        if config.service_api_key.is_none() {
            tracing::warn!("SERVICE_API_KEY not configured - provisioning is disabled");
        }

        let engine = PointEngine::new(Arc::clone(&store));

        Self {
            check_ins: AttendanceDeduplicator::new(engine.clone()),
            reader: LedgerReader::new(Arc::clone(&store)),
            engine,
            store,
            config,
        }
    }
}
