use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use sekolah_core::AppError;
use sekolah_models::auth::MessageResponse;
use sekolah_models::ids::ClassId;

use crate::middleware::role::{RequireAdmin, RequireStaff};
use crate::modules::classes::model::{
    ClassFilterParams, ClassResponse, CreateClassDto, PaginatedClassesResponse, RosterEntry,
    UpdateClassDto,
};
use crate::modules::classes::service::ClassService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/classes",
    params(ClassFilterParams),
    responses(
        (status = 200, description = "Paginated list of classes", body = PaginatedClassesResponse)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_classes(
    State(state): State<AppState>,
    Query(filters): Query<ClassFilterParams>,
) -> Result<Json<PaginatedClassesResponse>, AppError> {
    let classes = ClassService::get_classes(&state.db, filters).await?;
    Ok(Json(classes))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}",
    params(("id" = ClassId, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class with related entities", body = ClassResponse),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
) -> Result<Json<ClassResponse>, AppError> {
    let class = ClassService::get_class(&state.db, id).await?;
    Ok(Json(class))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}/students",
    params(("id" = ClassId, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Active students in the class", body = Vec<RosterEntry>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN or TEACHER"),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _staff))]
pub async fn get_class_students(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<ClassId>,
) -> Result<Json<Vec<RosterEntry>>, AppError> {
    let roster = ClassService::get_class_students(&state.db, id).await?;
    Ok(Json(roster))
}

#[utoipa::path(
    post,
    path = "/api/classes",
    request_body = CreateClassDto,
    responses(
        (status = 201, description = "Class created", body = ClassResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN"),
        (status = 404, description = "Academic year, major or teacher not found"),
        (status = 409, description = "Class already exists for this year, major, grade and section")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn create_class(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateClassDto>,
) -> Result<(StatusCode, Json<ClassResponse>), AppError> {
    let class = ClassService::create_class(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

#[utoipa::path(
    patch,
    path = "/api/classes/{id}",
    params(("id" = ClassId, Path, description = "Class ID")),
    request_body = UpdateClassDto,
    responses(
        (status = 200, description = "Class updated", body = ClassResponse),
        (status = 400, description = "Validation failed or capacity below enrolment"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN"),
        (status = 404, description = "Class or referenced entity not found"),
        (status = 409, description = "Class already exists for this year, major, grade and section")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn update_class(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ClassId>,
    ValidatedJson(dto): ValidatedJson<UpdateClassDto>,
) -> Result<Json<ClassResponse>, AppError> {
    let class = ClassService::update_class(&state.db, id, dto).await?;
    Ok(Json(class))
}

#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    params(("id" = ClassId, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN"),
        (status = 404, description = "Class not found"),
        (status = 409, description = "Students, schedules, assignments or attendance still reference the class")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn delete_class(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ClassId>,
) -> Result<Json<MessageResponse>, AppError> {
    let name = ClassService::delete_class(&state.db, id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Class {} deleted successfully",
        name
    ))))
}
