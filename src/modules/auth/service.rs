use anyhow::anyhow;
use axum::http::StatusCode;
use chrono::{DateTime, Datelike, Duration, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{info, instrument, warn};

use sekolah_config::SessionConfig;
use sekolah_core::password::burn_verification;
use sekolah_core::{AppError, SessionToken, hash_password, hash_session_token, verify_password};
use sekolah_db::{ConstraintKind, Violation, violated_constraint};
use sekolah_models::accounts::{Account, Role};
use sekolah_models::ids::{AdminId, ParentId, UserId};
use sekolah_observability::{track_account_registered, track_login, track_session_revoked};

use crate::modules::accounts::{ACCOUNT_COLUMNS, AccountColumns};
use crate::modules::auth::model::{
    AdminProfile, LoginRequest, LoginResponse, ParentProfile, RegisterAdminDto,
    RegisterParentDto, RegisterRequest, RegisterStudentDto, RegisterTeacherDto, UserProfile,
};
use crate::modules::classes::service::ClassService;
use crate::modules::lookup::{Referenced, ensure_exists};
use crate::modules::students::service::StudentService;
use crate::modules::teachers::service::TeacherService;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(FromRow)]
struct ParentRow {
    id: ParentId,
    user_id: UserId,
    nik: String,
    occupation: Option<String>,
    phone: String,
    address: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[sqlx(flatten)]
    account: AccountColumns,
}

impl From<ParentRow> for ParentProfile {
    fn from(row: ParentRow) -> Self {
        ParentProfile {
            id: row.id,
            user_id: row.user_id,
            nik: row.nik,
            occupation: row.occupation,
            phone: row.phone,
            address: row.address,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user: row.account.into_account(row.user_id),
        }
    }
}

#[derive(FromRow)]
struct AdminRow {
    id: AdminId,
    user_id: UserId,
    nip: Option<String>,
    position: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[sqlx(flatten)]
    account: AccountColumns,
}

impl From<AdminRow> for AdminProfile {
    fn from(row: AdminRow) -> Self {
        AdminProfile {
            id: row.id,
            user_id: row.user_id,
            nip: row.nip,
            position: row.position,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user: row.account.into_account(row.user_id),
        }
    }
}

#[derive(FromRow)]
struct LoginCandidate {
    id: UserId,
    role: Role,
    password_hash: Option<String>,
}

#[derive(FromRow)]
struct SessionRow {
    id: UserId,
    expires_at: DateTime<Utc>,
    #[sqlx(flatten)]
    account: AccountColumns,
}

pub struct AuthService;

impl AuthService {
    /// Creates the account, its password credential and the role profile in
    /// one transaction.
    #[instrument(skip(db, request), fields(role = %request.role(), email = %request.email()))]
    pub async fn register(db: &PgPool, request: RegisterRequest) -> Result<UserProfile, AppError> {
        let email_taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(request.email())
                .fetch_one(db)
                .await?;
        if email_taken {
            return Err(email_conflict());
        }

        let password_hash = hash_password(request.password())?;
        let role = request.role();

        let mut tx = db.begin().await?;

        let user_id = sqlx::query_scalar::<_, UserId>(
            "INSERT INTO users (email, name, role, image) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(request.email())
        .bind(request.name())
        .bind(role)
        .bind(request.image())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_register_error)?;

        sqlx::query(
            "INSERT INTO credentials (user_id, provider, password_hash) VALUES ($1, 'password', $2)",
        )
        .bind(user_id)
        .bind(&password_hash)
        .execute(&mut *tx)
        .await?;

        match &request {
            RegisterRequest::Student(dto) => insert_student(&mut *tx, user_id, dto).await?,
            RegisterRequest::Teacher(dto) => insert_teacher(&mut *tx, user_id, dto).await?,
            RegisterRequest::Parent(dto) => insert_parent(&mut *tx, user_id, dto).await?,
            RegisterRequest::Admin(dto) => insert_admin(&mut *tx, user_id, dto).await?,
        }

        tx.commit().await?;

        track_account_registered(role.as_str());
        info!(user_id = %user_id, role = %role, "Account registered");

        Self::get_profile(db, user_id, role).await
    }

    /// Verifies the password and opens a session. Every failure reports the
    /// same message so callers cannot tell which part was wrong.
    #[instrument(skip(db, session_config, dto), fields(email = %dto.email))]
    pub async fn login(
        db: &PgPool,
        session_config: &SessionConfig,
        dto: LoginRequest,
    ) -> Result<LoginResponse, AppError> {
        let candidate = sqlx::query_as::<_, LoginCandidate>(
            r#"SELECT u.id, u.role, c.password_hash
               FROM users u
               LEFT JOIN credentials c ON c.user_id = u.id AND c.provider = 'password'
               WHERE u.email = $1"#,
        )
        .bind(&dto.email)
        .fetch_optional(db)
        .await?;

        let verified = match candidate {
            Some(LoginCandidate {
                id,
                role,
                password_hash: Some(hash),
            }) => verify_password(&dto.password, &hash)?.then_some((id, role)),
            _ => {
                burn_verification(&dto.password);
                None
            }
        };

        let Some((user_id, role)) = verified else {
            track_login(false);
            warn!("Login rejected");
            return Err(AppError::unauthorized(anyhow!(INVALID_CREDENTIALS)));
        };

        let profile = Self::get_profile(db, user_id, role)
            .await
            .map_err(|err| match err.status {
                StatusCode::NOT_FOUND => AppError::unauthorized(err.error),
                _ => err,
            })?;

        let token = SessionToken::generate();
        let expires_at = Utc::now() + Duration::days(session_config.ttl_days);

        sqlx::query("INSERT INTO sessions (user_id, token_hash, expires_at) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(token.digest())
            .bind(expires_at)
            .execute(db)
            .await?;

        track_login(true);
        info!(user_id = %user_id, "Login succeeded");

        Ok(LoginResponse {
            user: profile,
            session_token: token.into_inner(),
            expires_at,
            message: "Login successful".to_string(),
        })
    }

    /// The account and expiry behind a presented token, or `None` when the
    /// token is unknown or expired.
    pub async fn validate_session(
        db: &PgPool,
        token: &str,
    ) -> Result<Option<(Account, DateTime<Utc>)>, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            r#"SELECT u.id, s.expires_at, {}
               FROM sessions s
               JOIN users u ON u.id = s.user_id
               WHERE s.token_hash = $1 AND s.expires_at > NOW()"#,
            ACCOUNT_COLUMNS
        ))
        .bind(hash_session_token(token))
        .fetch_optional(db)
        .await?;

        Ok(row.map(|row| (row.account.into_account(row.id), row.expires_at)))
    }

    /// Deletes the session for `token`. Unknown tokens are ignored.
    #[instrument(skip(db, token))]
    pub async fn logout(db: &PgPool, token: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(hash_session_token(token))
            .execute(db)
            .await?;

        if result.rows_affected() > 0 {
            track_session_revoked();
            info!("Session revoked");
        }
        Ok(())
    }

    /// The role profile of an account.
    #[instrument(skip(db))]
    pub async fn get_profile(
        db: &PgPool,
        user_id: UserId,
        role: Role,
    ) -> Result<UserProfile, AppError> {
        let profile = match role {
            Role::Student => {
                UserProfile::Student(StudentService::get_student_by_user_id(db, user_id).await?)
            }
            Role::Teacher => {
                UserProfile::Teacher(TeacherService::get_teacher_by_user_id(db, user_id).await?)
            }
            Role::Parent => {
                let row = sqlx::query_as::<_, ParentRow>(&format!(
                    r#"SELECT p.id, p.user_id, p.nik, p.occupation, p.phone, p.address,
                              p.created_at, p.updated_at, {}
                       FROM parents p
                       JOIN users u ON u.id = p.user_id
                       WHERE p.user_id = $1"#,
                    ACCOUNT_COLUMNS
                ))
                .bind(user_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow!("Parent profile not found")))?;
                UserProfile::Parent(row.into())
            }
            Role::Admin => {
                let row = sqlx::query_as::<_, AdminRow>(&format!(
                    r#"SELECT a.id, a.user_id, a.nip, a.position, a.phone,
                              a.created_at, a.updated_at, {}
                       FROM admins a
                       JOIN users u ON u.id = a.user_id
                       WHERE a.user_id = $1"#,
                    ACCOUNT_COLUMNS
                ))
                .bind(user_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow!("Admin profile not found")))?;
                UserProfile::Admin(row.into())
            }
        };

        Ok(profile)
    }
}

async fn insert_student(
    tx: &mut PgConnection,
    user_id: UserId,
    dto: &RegisterStudentDto,
) -> Result<(), AppError> {
    ensure_exists(&mut *tx, Referenced::Major, dto.major_id).await?;
    if let Some(class_id) = dto.class_id {
        ClassService::ensure_has_room(&mut *tx, class_id, None).await?;
    }
    if let Some(parent_id) = dto.parent_id {
        ensure_exists(&mut *tx, Referenced::Parent, parent_id).await?;
    }

    let enrollment_year = dto.enrollment_year.unwrap_or_else(|| Utc::now().year());

    sqlx::query(
        r#"INSERT INTO students
               (user_id, nis, nisn, class_id, major_id, parent_id, date_of_birth,
                place_of_birth, gender, address, phone, enrollment_year)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"#,
    )
    .bind(user_id)
    .bind(&dto.nis)
    .bind(&dto.nisn)
    .bind(dto.class_id)
    .bind(dto.major_id)
    .bind(dto.parent_id)
    .bind(dto.date_of_birth)
    .bind(&dto.place_of_birth)
    .bind(dto.gender)
    .bind(&dto.address)
    .bind(&dto.phone)
    .bind(enrollment_year)
    .execute(&mut *tx)
    .await
    .map_err(map_register_error)?;

    Ok(())
}

async fn insert_teacher(
    tx: &mut PgConnection,
    user_id: UserId,
    dto: &RegisterTeacherDto,
) -> Result<(), AppError> {
    sqlx::query(
        r#"INSERT INTO teachers
               (user_id, nip, date_of_birth, place_of_birth, gender, address, phone,
                specialization, hire_date)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
    )
    .bind(user_id)
    .bind(&dto.nip)
    .bind(dto.date_of_birth)
    .bind(&dto.place_of_birth)
    .bind(dto.gender)
    .bind(&dto.address)
    .bind(&dto.phone)
    .bind(&dto.specialization)
    .bind(dto.hire_date)
    .execute(&mut *tx)
    .await
    .map_err(map_register_error)?;

    Ok(())
}

async fn insert_parent(
    tx: &mut PgConnection,
    user_id: UserId,
    dto: &RegisterParentDto,
) -> Result<(), AppError> {
    sqlx::query(
        r#"INSERT INTO parents (user_id, nik, occupation, phone, address)
           VALUES ($1, $2, $3, $4, $5)"#,
    )
    .bind(user_id)
    .bind(&dto.nik)
    .bind(&dto.occupation)
    .bind(&dto.phone)
    .bind(&dto.address)
    .execute(&mut *tx)
    .await
    .map_err(map_register_error)?;

    Ok(())
}

async fn insert_admin(
    tx: &mut PgConnection,
    user_id: UserId,
    dto: &RegisterAdminDto,
) -> Result<(), AppError> {
    sqlx::query(
        r#"INSERT INTO admins (user_id, nip, position, phone)
           VALUES ($1, $2, $3, $4)"#,
    )
    .bind(user_id)
    .bind(&dto.nip)
    .bind(&dto.position)
    .bind(&dto.phone)
    .execute(&mut *tx)
    .await
    .map_err(map_register_error)?;

    Ok(())
}

fn email_conflict() -> AppError {
    AppError::conflict(anyhow!("Email is already registered"))
}

/// Translates unique and foreign-key violations raised while registering
/// into the errors the pre-checks report.
fn map_register_error(err: sqlx::Error) -> AppError {
    let mapped = match violated_constraint(&err) {
        Some(Violation {
            kind: ConstraintKind::Unique,
            constraint: Some(constraint),
        }) => match constraint {
            "users_email_key" => Some(email_conflict()),
            "students_nis_key" | "students_nisn_key" => Some(AppError::conflict(anyhow!(
                "NIS or NISN is already registered"
            ))),
            "teachers_nip_key" | "admins_nip_key" => {
                Some(AppError::conflict(anyhow!("NIP is already registered")))
            }
            "parents_nik_key" => Some(AppError::conflict(anyhow!("NIK is already registered"))),
            _ => None,
        },
        Some(Violation {
            kind: ConstraintKind::ForeignKey,
            constraint: Some(constraint),
        }) => match constraint {
            "students_major_id_fkey" => Some(Referenced::Major.not_found()),
            "students_class_id_fkey" => Some(Referenced::Class.not_found()),
            "students_parent_id_fkey" => Some(Referenced::Parent.not_found()),
            _ => None,
        },
        _ => None,
    };

    mapped.unwrap_or_else(|| AppError::from(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_constraint_errors_stay_internal() {
        let err = map_register_error(sqlx::Error::RowNotFound);
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
