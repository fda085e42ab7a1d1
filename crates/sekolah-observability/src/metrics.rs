use axum::{extract::Request, middleware::Next, response::Response};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::error;

use crate::logging::is_observability_enabled;
use crate::route_of;

pub use metrics_exporter_prometheus::PrometheusHandle as MetricsHandle;

pub const HTTP_REQUESTS_TOTAL: &str = "sekolah_http_requests_total";
pub const HTTP_REQUESTS_ACTIVE: &str = "sekolah_http_requests_active";
pub const HTTP_REQUEST_DURATION: &str = "sekolah_http_request_duration_seconds";
pub const ACCOUNTS_REGISTERED_TOTAL: &str = "sekolah_accounts_registered_total";
pub const LOGINS_TOTAL: &str = "sekolah_logins_total";
pub const SESSIONS_REVOKED_TOTAL: &str = "sekolah_sessions_revoked_total";
pub const CLASS_FULL_REJECTIONS_TOTAL: &str = "sekolah_class_full_rejections_total";

static HANDLE: OnceLock<Option<MetricsHandle>> = OnceLock::new();

// Registry calls are mostly under 100ms; the tail covers slow list queries.
const DURATION_BUCKETS: &[f64] = &[
    0.002, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Installs the Prometheus recorder and spawns its upkeep task.
///
/// Returns `None` when observability is disabled or the recorder could not
/// be installed. Repeated calls return the first handle. Must run inside a
/// Tokio runtime.
pub fn init_metrics() -> Option<MetricsHandle> {
    if !is_observability_enabled() {
        return None;
    }

    HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .set_buckets_for_metric(
                    Matcher::Full(HTTP_REQUEST_DURATION.to_string()),
                    DURATION_BUCKETS,
                )
                .and_then(|builder| builder.install_recorder())
                .map_err(|e| error!(error = %e, "Failed to install Prometheus recorder"))
                .ok()?;

            let upkeep = handle.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(UPKEEP_INTERVAL);
                loop {
                    interval.tick().await;
                    upkeep.run_upkeep();
                }
            });

            Some(handle)
        })
        .clone()
}

/// Counts requests and records their latency, labelled by route template.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let route = route_of(&req);

    gauge!(HTTP_REQUESTS_ACTIVE).increment(1.0);
    let response = next.run(req).await;
    gauge!(HTTP_REQUESTS_ACTIVE).decrement(1.0);

    let status = response.status().as_u16().to_string();
    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status
    )
    .increment(1);
    histogram!(HTTP_REQUEST_DURATION, "method" => method, "route" => route)
        .record(start.elapsed().as_secs_f64());

    response
}

pub fn track_account_registered(role: &str) {
    if is_observability_enabled() {
        counter!(ACCOUNTS_REGISTERED_TOTAL, "role" => role.to_string()).increment(1);
    }
}

pub fn track_login(success: bool) {
    if is_observability_enabled() {
        let outcome = if success { "success" } else { "failure" };
        counter!(LOGINS_TOTAL, "outcome" => outcome).increment(1);
    }
}

pub fn track_session_revoked() {
    if is_observability_enabled() {
        counter!(SESSIONS_REVOKED_TOTAL).increment(1);
    }
}

/// A student placement refused because the class had no free seat.
pub fn track_class_full() {
    if is_observability_enabled() {
        counter!(CLASS_FULL_REJECTIONS_TOTAL).increment(1);
    }
}
