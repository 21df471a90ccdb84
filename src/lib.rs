pub mod adapters;
pub mod config;
pub mod domain;
pub mod infra;
pub mod services;
pub mod telemetry;

use {crate::domain::store::AuditStore, std::sync::Arc};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AuditStore>,
}
