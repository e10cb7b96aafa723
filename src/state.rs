use crate::config::AppConfig;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application context, constructed once at boot and cloned into
/// every handler via axum's `State` extractor — the teacher's own
/// `AppState` pattern (`State<AppState>` in `handlers::chat`), generalised
/// beyond a bare pool to also carry the settings bag.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}
