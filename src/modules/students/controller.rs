use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use sekolah_core::AppError;
use sekolah_models::auth::MessageResponse;
use sekolah_models::ids::StudentId;

use crate::middleware::role::{RequireAdmin, RequireStaff, RequireStudent};
use crate::modules::students::model::{
    PaginatedStudentsResponse, StudentFilterParams, StudentResponse, UpdateStudentDto,
};
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/students",
    params(StudentFilterParams),
    responses(
        (status = 200, description = "Paginated list of students", body = PaginatedStudentsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN or TEACHER")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _staff))]
pub async fn get_students(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Query(filters): Query<StudentFilterParams>,
) -> Result<Json<PaginatedStudentsResponse>, AppError> {
    let students = StudentService::get_students(&state.db, filters).await?;
    Ok(Json(students))
}

#[utoipa::path(
    get,
    path = "/api/students/me",
    responses(
        (status = 200, description = "Student profile of the current session", body = StudentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires STUDENT"),
        (status = 404, description = "Student profile not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, student))]
pub async fn get_my_student_profile(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
) -> Result<Json<StudentResponse>, AppError> {
    let profile = StudentService::get_student_by_user_id(&state.db, student.user_id()).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id" = StudentId, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student with class, major and parent", body = StudentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN or TEACHER"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _staff))]
pub async fn get_student(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<StudentId>,
) -> Result<Json<StudentResponse>, AppError> {
    let student = StudentService::get_student(&state.db, id).await?;
    Ok(Json(student))
}

#[utoipa::path(
    patch,
    path = "/api/students/{id}",
    params(("id" = StudentId, Path, description = "Student ID")),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = StudentResponse),
        (status = 400, description = "Validation failed or class is full"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN or TEACHER"),
        (status = 404, description = "Student, class, major or parent not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _staff))]
pub async fn update_student(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<StudentId>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<StudentResponse>, AppError> {
    let student = StudentService::update_student(&state.db, id, dto).await?;
    Ok(Json(student))
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(("id" = StudentId, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student deactivated", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires ADMIN"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn deactivate_student(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<StudentId>,
) -> Result<Json<MessageResponse>, AppError> {
    let name = StudentService::deactivate_student(&state.db, id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Student {} deactivated successfully",
        name
    ))))
}
