use sekolah_config::{CorsConfig, SessionConfig};
use sekolah_observability::MetricsHandle;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub session_config: SessionConfig,
    pub cors_config: CorsConfig,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<MetricsHandle>,
}

impl AppState {
    pub fn new(db: PgPool, session_config: SessionConfig, cors_config: CorsConfig) -> Self {
        Self {
            db,
            session_config,
            cors_config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Option<MetricsHandle>) -> Self {
        self.metrics = metrics;
        self
    }
}
