use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use sekolah_core::AppError;
use sekolah_models::auth::MessageResponse;
use sekolah_models::ids::AcademicYearId;

use crate::middleware::role::RequireAdmin;
use crate::modules::academic_years::model::{
    AcademicYearFilterParams, AcademicYearResponse, CreateAcademicYearDto, CreateSemesterDto,
    PaginatedAcademicYearsResponse, SemesterResponse,
};
use crate::modules::academic_years::service::AcademicYearService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/academic-years",
    params(AcademicYearFilterParams),
    responses(
        (status = 200, description = "Academic years, newest first", body = PaginatedAcademicYearsResponse)
    ),
    tag = "Academic Years"
)]
#[instrument(skip(state))]
pub async fn get_academic_years(
    State(state): State<AppState>,
    Query(filters): Query<AcademicYearFilterParams>,
) -> Result<Json<PaginatedAcademicYearsResponse>, AppError> {
    let years = AcademicYearService::get_academic_years(&state.db, filters).await?;
    Ok(Json(years))
}

#[utoipa::path(
    get,
    path = "/api/academic-years/{id}",
    params(("id" = AcademicYearId, Path, description = "Academic year ID")),
    responses(
        (status = 200, description = "Academic year with its semesters", body = AcademicYearResponse),
        (status = 404, description = "Academic year not found")
    ),
    tag = "Academic Years"
)]
#[instrument(skip(state))]
pub async fn get_academic_year(
    State(state): State<AppState>,
    Path(id): Path<AcademicYearId>,
) -> Result<Json<AcademicYearResponse>, AppError> {
    let year = AcademicYearService::get_academic_year(&state.db, id).await?;
    Ok(Json(year))
}

#[utoipa::path(
    post,
    path = "/api/academic-years",
    request_body = CreateAcademicYearDto,
    responses(
        (status = 201, description = "Academic year created", body = AcademicYearResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN"),
        (status = 409, description = "Academic year already exists")
    ),
    tag = "Academic Years",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn create_academic_year(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateAcademicYearDto>,
) -> Result<(StatusCode, Json<AcademicYearResponse>), AppError> {
    let year = AcademicYearService::create_academic_year(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(year)))
}

#[utoipa::path(
    post,
    path = "/api/academic-years/{id}/activate",
    params(("id" = AcademicYearId, Path, description = "Academic year ID")),
    responses(
        (status = 200, description = "Academic year is now the only active year", body = AcademicYearResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN"),
        (status = 404, description = "Academic year not found")
    ),
    tag = "Academic Years",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn activate_academic_year(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<AcademicYearId>,
) -> Result<Json<AcademicYearResponse>, AppError> {
    let year = AcademicYearService::activate_academic_year(&state.db, id).await?;
    Ok(Json(year))
}

#[utoipa::path(
    delete,
    path = "/api/academic-years/{id}",
    params(("id" = AcademicYearId, Path, description = "Academic year ID")),
    responses(
        (status = 200, description = "Academic year deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN"),
        (status = 404, description = "Academic year not found"),
        (status = 409, description = "Classes or grades still reference the year")
    ),
    tag = "Academic Years",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn delete_academic_year(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<AcademicYearId>,
) -> Result<Json<MessageResponse>, AppError> {
    AcademicYearService::delete_academic_year(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Academic year deleted successfully")))
}

#[utoipa::path(
    post,
    path = "/api/academic-years/{id}/semesters",
    params(("id" = AcademicYearId, Path, description = "Academic year ID")),
    request_body = CreateSemesterDto,
    responses(
        (status = 201, description = "Semester created", body = SemesterResponse),
        (status = 400, description = "Dates outside the academic year"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN"),
        (status = 404, description = "Academic year not found"),
        (status = 409, description = "The year already has a semester of this type")
    ),
    tag = "Academic Years",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn create_semester(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<AcademicYearId>,
    ValidatedJson(dto): ValidatedJson<CreateSemesterDto>,
) -> Result<(StatusCode, Json<SemesterResponse>), AppError> {
    let semester = AcademicYearService::create_semester(&state.db, id, dto).await?;
    Ok((StatusCode::CREATED, Json(semester)))
}
