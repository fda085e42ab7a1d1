//! Sekolah Observability
//!
//! Structured logging via `tracing` and Prometheus metrics via `metrics`.
//!
//! The `observability` feature (default) compiles in rolling log files and
//! the Prometheus recorder. Without it only console logging is installed and
//! the middleware and tracking helpers are no-ops. At runtime
//! `OBSERVABILITY_ENABLED=false` has the same effect.
//!
//! ```no_run
//! use sekolah_observability::{init_metrics, init_tracing};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_tracing();
//!     let metrics = init_metrics();
//!     // ... build the router with `logging_middleware` and `metrics_middleware` ...
//! }
//! ```

mod basic_logging;

use axum::extract::{MatchedPath, Request};

pub use basic_logging::init_basic_console_logging;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The matched route template (`/api/classes/{id}`), or the raw path when
/// routing has not run yet.
pub fn route_of(req: &Request) -> String {
    req.extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned())
}

#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

#[cfg(feature = "observability")]
pub use logging::{init_tracing, is_observability_enabled, logging_middleware};
#[cfg(feature = "observability")]
pub use metrics::{
    MetricsHandle, init_metrics, metrics_middleware, track_account_registered, track_class_full,
    track_login, track_session_revoked,
};

// No-op stubs when observability is disabled
#[cfg(not(feature = "observability"))]
pub mod stubs {
    use axum::{extract::Request, middleware::Next, response::Response};

    /// Stand-in for the Prometheus handle; renders nothing.
    #[derive(Debug, Clone)]
    pub struct MetricsHandle;

    impl MetricsHandle {
        pub fn render(&self) -> String {
            String::new()
        }
    }

    pub fn is_observability_enabled() -> bool {
        false
    }

    pub fn init_tracing() {
        super::init_basic_console_logging();
    }

    pub fn init_metrics() -> Option<MetricsHandle> {
        None
    }

    pub async fn logging_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub fn track_account_registered(_role: &str) {}
    pub fn track_login(_success: bool) {}
    pub fn track_session_revoked() {}
    pub fn track_class_full() {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
