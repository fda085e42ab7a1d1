use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router, middleware};
use serde_json::json;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use sekolah_config::CorsConfig;
use sekolah_core::AppError;
use sekolah_observability::{REQUEST_ID_HEADER, logging_middleware, metrics_middleware};

use crate::docs::ApiDoc;
use crate::modules::academic_years::init_academic_years_router;
use crate::modules::auth::init_auth_router;
use crate::modules::classes::init_classes_router;
use crate::modules::majors::init_majors_router;
use crate::modules::students::init_students_router;
use crate::modules::subjects::init_subjects_router;
use crate::modules::teachers::init_teachers_router;
use crate::state::AppState;

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router())
                .nest("/academic-years", init_academic_years_router())
                .nest("/majors", init_majors_router())
                .nest("/subjects", init_subjects_router())
                .nest("/classes", init_classes_router())
                .nest("/students", init_students_router())
                .nest("/teachers", init_teachers_router()),
        )
        .layer(cors_layer(&state.cors_config))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}

/// Browser access for the configured front-end origins. The request id is
/// exposed so clients can quote it when reporting a failure.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = config
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(true)
}

/// Liveness plus a round trip to the database.
async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    sqlx::query("SELECT 1").execute(&state.db).await?;
    Ok(Json(json!({ "status": "ok" })))
}

async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "Metrics are disabled").into_response(),
    }
}
