use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{Instrument, error, info, info_span, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use uuid::Uuid;

use crate::{REQUEST_ID_HEADER, route_of};

const DEFAULT_LOG_DIR: &str = "storage/logs";

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Reads `OBSERVABILITY_ENABLED` once; anything but `false`/`0` enables it.
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| parse_enabled(&v))
            .unwrap_or(true)
    })
}

fn parse_enabled(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value != "false" && value != "0"
}

/// Logs one line per request and echoes the request id back in
/// `x-request-id`. An id supplied by the caller is kept.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let route = route_of(&req);
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty() && value.len() <= 64)
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

    let span = info_span!("request", request_id = %request_id, method = %method, route = %route);
    let mut response = next.run(req).instrument(span.clone()).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let status = response.status();
    let latency_ms = start.elapsed().as_millis() as u64;
    let _entered = span.enter();
    if status.is_server_error() {
        error!(status = status.as_u16(), latency_ms, "Server error");
    } else if status.is_client_error() {
        warn!(status = status.as_u16(), latency_ms, "Client error");
    } else {
        info!(status = status.as_u16(), latency_ms, "Request completed");
    }

    response
}

/// Installs the global subscriber.
///
/// Console output is filtered by `RUST_LOG` (default `sekolah=info`). When
/// `LOG_DIR` (default `storage/logs`) can be created, errors also go to a
/// daily `sekolah.log` and everything at info and above to a daily
/// `sekolah.json` for log shippers.
pub fn init_tracing() {
    if !is_observability_enabled() {
        crate::init_basic_console_logging();
        return;
    }

    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("sekolah=info,sekolah_cli=info,tower_http=warn,hyper=info,sqlx=warn")
    });

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(console_filter);

    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        let _ = tracing_subscriber::registry().with(console_layer).try_init();
        warn!(log_dir = %log_dir, error = %e, "Log directory unavailable; logging to console only");
        return;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "sekolah.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("error"));

    let json_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "sekolah.json");
    let json_layer = fmt::layer()
        .json()
        .with_writer(json_appender)
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new("info"));

    if tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(json_layer)
        .try_init()
        .is_ok()
    {
        info!(log_dir = %log_dir, "Tracing initialized with file logging");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enabled() {
        assert!(parse_enabled("true"));
        assert!(parse_enabled("1"));
        assert!(parse_enabled("yes"));
        assert!(!parse_enabled("false"));
        assert!(!parse_enabled(" FALSE "));
        assert!(!parse_enabled("0"));
    }
}
