use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use sekolah_core::AppError;
use sekolah_models::auth::MessageResponse;
use sekolah_models::ids::SubjectId;

use crate::middleware::role::RequireAdmin;
use crate::modules::subjects::model::{
    CreateSubjectDto, PaginatedSubjectsResponse, SubjectFilterParams, SubjectResponse,
    UpdateSubjectDto,
};
use crate::modules::subjects::service::SubjectService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/subjects",
    params(SubjectFilterParams),
    responses(
        (status = 200, description = "Paginated list of subjects", body = PaginatedSubjectsResponse)
    ),
    tag = "Subjects"
)]
#[instrument(skip(state))]
pub async fn get_subjects(
    State(state): State<AppState>,
    Query(filters): Query<SubjectFilterParams>,
) -> Result<Json<PaginatedSubjectsResponse>, AppError> {
    let subjects = SubjectService::get_subjects(&state.db, filters).await?;
    Ok(Json(subjects))
}

#[utoipa::path(
    get,
    path = "/api/subjects/{id}",
    params(("id" = SubjectId, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject with its major and dependent counts", body = SubjectResponse),
        (status = 404, description = "Subject not found")
    ),
    tag = "Subjects"
)]
#[instrument(skip(state))]
pub async fn get_subject(
    State(state): State<AppState>,
    Path(id): Path<SubjectId>,
) -> Result<Json<SubjectResponse>, AppError> {
    let subject = SubjectService::get_subject(&state.db, id).await?;
    Ok(Json(subject))
}

#[utoipa::path(
    post,
    path = "/api/subjects",
    request_body = CreateSubjectDto,
    responses(
        (status = 201, description = "Subject created", body = SubjectResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN"),
        (status = 404, description = "Major not found"),
        (status = 409, description = "Subject code already in use")
    ),
    tag = "Subjects",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn create_subject(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateSubjectDto>,
) -> Result<(StatusCode, Json<SubjectResponse>), AppError> {
    let subject = SubjectService::create_subject(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

#[utoipa::path(
    patch,
    path = "/api/subjects/{id}",
    params(("id" = SubjectId, Path, description = "Subject ID")),
    request_body = UpdateSubjectDto,
    responses(
        (status = 200, description = "Subject updated", body = SubjectResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN"),
        (status = 404, description = "Subject or major not found"),
        (status = 409, description = "Subject code already in use")
    ),
    tag = "Subjects",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn update_subject(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<SubjectId>,
    ValidatedJson(dto): ValidatedJson<UpdateSubjectDto>,
) -> Result<Json<SubjectResponse>, AppError> {
    let subject = SubjectService::update_subject(&state.db, id, dto).await?;
    Ok(Json(subject))
}

#[utoipa::path(
    delete,
    path = "/api/subjects/{id}",
    params(("id" = SubjectId, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN"),
        (status = 404, description = "Subject not found"),
        (status = 409, description = "Schedules, assignments or grades still reference the subject")
    ),
    tag = "Subjects",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn delete_subject(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<SubjectId>,
) -> Result<Json<MessageResponse>, AppError> {
    SubjectService::delete_subject(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Subject deleted successfully")))
}
