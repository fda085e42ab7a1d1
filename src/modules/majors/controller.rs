use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use sekolah_core::AppError;
use sekolah_models::auth::MessageResponse;
use sekolah_models::ids::MajorId;

use crate::middleware::role::RequireAdmin;
use crate::modules::majors::model::{
    CreateMajorDto, MajorFilterParams, MajorResponse, PaginatedMajorsResponse, UpdateMajorDto,
};
use crate::modules::majors::service::MajorService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/majors",
    params(MajorFilterParams),
    responses(
        (status = 200, description = "Paginated list of majors", body = PaginatedMajorsResponse)
    ),
    tag = "Majors"
)]
#[instrument(skip(state))]
pub async fn get_majors(
    State(state): State<AppState>,
    Query(filters): Query<MajorFilterParams>,
) -> Result<Json<PaginatedMajorsResponse>, AppError> {
    let majors = MajorService::get_majors(&state.db, filters).await?;
    Ok(Json(majors))
}

#[utoipa::path(
    get,
    path = "/api/majors/{id}",
    params(("id" = MajorId, Path, description = "Major ID")),
    responses(
        (status = 200, description = "Major with dependent counts", body = MajorResponse),
        (status = 404, description = "Major not found")
    ),
    tag = "Majors"
)]
#[instrument(skip(state))]
pub async fn get_major(
    State(state): State<AppState>,
    Path(id): Path<MajorId>,
) -> Result<Json<MajorResponse>, AppError> {
    let major = MajorService::get_major(&state.db, id).await?;
    Ok(Json(major))
}

#[utoipa::path(
    post,
    path = "/api/majors",
    request_body = CreateMajorDto,
    responses(
        (status = 201, description = "Major created", body = MajorResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN"),
        (status = 409, description = "Major code already in use")
    ),
    tag = "Majors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn create_major(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateMajorDto>,
) -> Result<(StatusCode, Json<MajorResponse>), AppError> {
    let major = MajorService::create_major(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(major)))
}

#[utoipa::path(
    patch,
    path = "/api/majors/{id}",
    params(("id" = MajorId, Path, description = "Major ID")),
    request_body = UpdateMajorDto,
    responses(
        (status = 200, description = "Major updated", body = MajorResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN"),
        (status = 404, description = "Major not found"),
        (status = 409, description = "Major code already in use")
    ),
    tag = "Majors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn update_major(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<MajorId>,
    ValidatedJson(dto): ValidatedJson<UpdateMajorDto>,
) -> Result<Json<MajorResponse>, AppError> {
    let major = MajorService::update_major(&state.db, id, dto).await?;
    Ok(Json(major))
}

#[utoipa::path(
    delete,
    path = "/api/majors/{id}",
    params(("id" = MajorId, Path, description = "Major ID")),
    responses(
        (status = 200, description = "Major deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN"),
        (status = 404, description = "Major not found"),
        (status = 409, description = "Students or classes still reference the major")
    ),
    tag = "Majors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn delete_major(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<MajorId>,
) -> Result<Json<MessageResponse>, AppError> {
    MajorService::delete_major(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Major deleted successfully")))
}
