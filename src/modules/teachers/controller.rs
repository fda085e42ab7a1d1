use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use sekolah_core::AppError;
use sekolah_models::auth::MessageResponse;
use sekolah_models::ids::TeacherId;

use crate::middleware::role::{RequireAdmin, RequireStaff, RequireTeacher, is_admin};
use crate::modules::teachers::model::{
    PaginatedTeachersResponse, TeacherFilterParams, TeacherResponse, UpdateTeacherDto,
};
use crate::modules::teachers::service::TeacherService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/teachers",
    params(TeacherFilterParams),
    responses(
        (status = 200, description = "Paginated list of teachers", body = PaginatedTeachersResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN or TEACHER")
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _staff))]
pub async fn get_teachers(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Query(filters): Query<TeacherFilterParams>,
) -> Result<Json<PaginatedTeachersResponse>, AppError> {
    let teachers = TeacherService::get_teachers(&state.db, filters).await?;
    Ok(Json(teachers))
}

#[utoipa::path(
    get,
    path = "/api/teachers/me",
    responses(
        (status = 200, description = "Teacher profile of the current session", body = TeacherResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires TEACHER"),
        (status = 404, description = "Teacher profile not found")
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, teacher))]
pub async fn get_my_teacher_profile(
    State(state): State<AppState>,
    RequireTeacher(teacher): RequireTeacher,
) -> Result<Json<TeacherResponse>, AppError> {
    let profile = TeacherService::get_teacher_by_user_id(&state.db, teacher.user_id()).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}",
    params(("id" = TeacherId, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher with teaching counts", body = TeacherResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN or TEACHER"),
        (status = 404, description = "Teacher not found")
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _staff))]
pub async fn get_teacher(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<TeacherId>,
) -> Result<Json<TeacherResponse>, AppError> {
    let teacher = TeacherService::get_teacher(&state.db, id).await?;
    Ok(Json(teacher))
}

/// Admins may update any teacher. A teacher may update only their own
/// profile and cannot change its active flag.
#[utoipa::path(
    patch,
    path = "/api/teachers/{id}",
    params(("id" = TeacherId, Path, description = "Teacher ID")),
    request_body = UpdateTeacherDto,
    responses(
        (status = 200, description = "Teacher updated", body = TeacherResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - not an admin and not the profile owner"),
        (status = 404, description = "Teacher not found")
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, staff))]
pub async fn update_teacher(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<TeacherId>,
    ValidatedJson(dto): ValidatedJson<UpdateTeacherDto>,
) -> Result<Json<TeacherResponse>, AppError> {
    if !is_admin(&staff) {
        let target = TeacherService::get_teacher(&state.db, id).await?;
        if target.user_id != staff.user_id() {
            return Err(AppError::forbidden(anyhow!(
                "You can only update your own teacher profile"
            )));
        }
        if dto.is_active.is_some() {
            return Err(AppError::forbidden(anyhow!(
                "Only an admin can change a teacher's active status"
            )));
        }
    }

    let teacher = TeacherService::update_teacher(&state.db, id, dto).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    delete,
    path = "/api/teachers/{id}",
    params(("id" = TeacherId, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher deactivated", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN"),
        (status = 404, description = "Teacher not found")
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn deactivate_teacher(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<TeacherId>,
) -> Result<Json<MessageResponse>, AppError> {
    let name = TeacherService::deactivate_teacher(&state.db, id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Teacher {} deactivated successfully",
        name
    ))))
}
