use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use sekolah_core::AppError;

use crate::middleware::auth::{AuthUser, BearerToken};
use crate::modules::auth::model::{
    LoginRequest, LoginResponse, MessageResponse, RegisterAdminDto, RegisterParentDto,
    RegisterRequest, RegisterResponse, RegisterStudentDto, RegisterTeacherDto, SessionResponse,
    UserProfile,
};
use crate::modules::auth::service::AuthService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

async fn register(
    state: &AppState,
    request: RegisterRequest,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let user = AuthService::register(&state.db, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user,
            message: "Registration successful".to_string(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/register/student",
    request_body = RegisterStudentDto,
    responses(
        (status = 201, description = "Student account created", body = RegisterResponse),
        (status = 400, description = "Validation failed or class is full"),
        (status = 404, description = "Major, class or parent not found"),
        (status = 409, description = "Email, NIS or NISN already registered")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register_student(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterStudentDto>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    register(&state, RegisterRequest::Student(dto)).await
}

#[utoipa::path(
    post,
    path = "/api/auth/register/teacher",
    request_body = RegisterTeacherDto,
    responses(
        (status = 201, description = "Teacher account created", body = RegisterResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email or NIP already registered")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register_teacher(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterTeacherDto>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    register(&state, RegisterRequest::Teacher(dto)).await
}

#[utoipa::path(
    post,
    path = "/api/auth/register/parent",
    request_body = RegisterParentDto,
    responses(
        (status = 201, description = "Parent account created", body = RegisterResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email or NIK already registered")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register_parent(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterParentDto>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    register(&state, RegisterRequest::Parent(dto)).await
}

#[utoipa::path(
    post,
    path = "/api/auth/register/admin",
    request_body = RegisterAdminDto,
    responses(
        (status = 201, description = "Admin account created", body = RegisterResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email or NIP already registered")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register_admin(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterAdminDto>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    register(&state, RegisterRequest::Admin(dto)).await
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login(&state.db, &state.session_config, dto).await?;
    Ok(Json(response))
}

/// Ends the presented session. Tokens that are already expired or unknown
/// still get a success response.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session closed", body = MessageResponse),
        (status = 401, description = "Missing authorization header")
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, token))]
pub async fn logout(
    State(state): State<AppState>,
    token: BearerToken,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::logout(&state.db, &token.0).await?;
    Ok(Json(MessageResponse::new("Logout successful")))
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "Invalid or expired session")
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(auth_user))]
pub async fn get_session(auth_user: AuthUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: auth_user.account,
        expires_at: auth_user.expires_at,
    })
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Role profile of the current session", body = UserProfile),
        (status = 401, description = "Invalid or expired session"),
        (status = 404, description = "Profile not found")
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    let profile = AuthService::get_profile(&state.db, auth_user.user_id(), auth_user.role()).await?;
    Ok(Json(profile))
}
