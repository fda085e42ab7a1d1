use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};

use sekolah_core::{AppError, PaginationMeta, contains_pattern};
use sekolah_models::accounts::Gender;
use sekolah_models::ids::{TeacherId, UserId};

use crate::modules::accounts::{ACCOUNT_COLUMNS, AccountColumns};
use crate::modules::teachers::model::{
    PaginatedTeachersResponse, TeacherCounts, TeacherFilterParams, TeacherResponse,
    UpdateTeacherDto,
};

#[derive(FromRow)]
struct TeacherRow {
    id: TeacherId,
    user_id: UserId,
    nip: String,
    date_of_birth: NaiveDate,
    place_of_birth: String,
    gender: Gender,
    address: String,
    phone: String,
    specialization: Option<String>,
    hire_date: NaiveDate,
    photo: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[sqlx(flatten)]
    account: AccountColumns,
    #[sqlx(flatten)]
    counts: TeacherCounts,
}

impl From<TeacherRow> for TeacherResponse {
    fn from(row: TeacherRow) -> Self {
        TeacherResponse {
            id: row.id,
            user_id: row.user_id,
            nip: row.nip,
            date_of_birth: row.date_of_birth,
            place_of_birth: row.place_of_birth,
            gender: row.gender,
            address: row.address,
            phone: row.phone,
            specialization: row.specialization,
            hire_date: row.hire_date,
            photo: row.photo,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user: row.account.into_account(row.user_id),
            counts: row.counts,
        }
    }
}

fn teacher_select() -> String {
    format!(
        r#"SELECT
            t.id, t.user_id, t.nip, t.date_of_birth, t.place_of_birth, t.gender, t.address,
            t.phone, t.specialization, t.hire_date, t.photo, t.is_active,
            t.created_at, t.updated_at,
            {},
            (SELECT COUNT(*) FROM schedules x WHERE x.teacher_id = t.id) AS schedules,
            (SELECT COUNT(*) FROM assignments x WHERE x.teacher_id = t.id) AS assignments,
            (SELECT COUNT(*) FROM grades x WHERE x.teacher_id = t.id) AS grades,
            (SELECT COUNT(*) FROM classes x WHERE x.homeroom_teacher_id = t.id) AS homeroom_classes
        FROM teachers t
        JOIN users u ON u.id = t.user_id"#,
        ACCOUNT_COLUMNS
    )
}

fn teacher_not_found() -> AppError {
    AppError::not_found(anyhow!("Teacher not found"))
}

pub struct TeacherService;

impl TeacherService {
    #[instrument(skip(db))]
    pub async fn get_teachers(
        db: &PgPool,
        filters: TeacherFilterParams,
    ) -> Result<PaginatedTeachersResponse, AppError> {
        let mut count_query = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM teachers t JOIN users u ON u.id = t.user_id",
        );
        push_filters(&mut count_query, &filters);
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(db)
            .await?;

        let mut data_query = QueryBuilder::<Postgres>::new(teacher_select());
        push_filters(&mut data_query, &filters);
        data_query
            .push(" ORDER BY t.nip ASC LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let rows = data_query
            .build_query_as::<TeacherRow>()
            .fetch_all(db)
            .await?;

        Ok(PaginatedTeachersResponse {
            data: rows.into_iter().map(TeacherResponse::from).collect(),
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_teacher(db: &PgPool, id: TeacherId) -> Result<TeacherResponse, AppError> {
        let row = sqlx::query_as::<_, TeacherRow>(&format!("{} WHERE t.id = $1", teacher_select()))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(teacher_not_found)?;

        Ok(row.into())
    }

    /// The teacher profile owned by an account.
    #[instrument(skip(db))]
    pub async fn get_teacher_by_user_id(
        db: &PgPool,
        user_id: UserId,
    ) -> Result<TeacherResponse, AppError> {
        let row = sqlx::query_as::<_, TeacherRow>(&format!(
            "{} WHERE t.user_id = $1",
            teacher_select()
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Teacher profile not found")))?;

        Ok(row.into())
    }

    #[instrument(skip(db))]
    pub async fn update_teacher(
        db: &PgPool,
        id: TeacherId,
        dto: UpdateTeacherDto,
    ) -> Result<TeacherResponse, AppError> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE teachers SET updated_at = NOW()");
        if let Some(date_of_birth) = dto.date_of_birth {
            query.push(", date_of_birth = ").push_bind(date_of_birth);
        }
        if let Some(place_of_birth) = dto.place_of_birth {
            query.push(", place_of_birth = ").push_bind(place_of_birth);
        }
        if let Some(gender) = dto.gender {
            query.push(", gender = ").push_bind(gender);
        }
        if let Some(address) = dto.address {
            query.push(", address = ").push_bind(address);
        }
        if let Some(phone) = dto.phone {
            query.push(", phone = ").push_bind(phone);
        }
        if let Some(specialization) = dto.specialization {
            query.push(", specialization = ").push_bind(specialization);
        }
        if let Some(hire_date) = dto.hire_date {
            query.push(", hire_date = ").push_bind(hire_date);
        }
        if let Some(photo) = dto.photo {
            query.push(", photo = ").push_bind(photo);
        }
        if let Some(is_active) = dto.is_active {
            query.push(", is_active = ").push_bind(is_active);
        }
        query.push(" WHERE id = ").push_bind(id);

        let result = query.build().execute(db).await?;
        if result.rows_affected() == 0 {
            return Err(teacher_not_found());
        }

        Self::get_teacher(db, id).await
    }

    /// Marks the teacher inactive. Returns the teacher's name.
    #[instrument(skip(db))]
    pub async fn deactivate_teacher(db: &PgPool, id: TeacherId) -> Result<String, AppError> {
        let name = sqlx::query_scalar::<_, String>(
            r#"UPDATE teachers t SET is_active = FALSE, updated_at = NOW()
               FROM users u
               WHERE t.id = $1 AND u.id = t.user_id
               RETURNING u.name"#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(teacher_not_found)?;

        info!(teacher_id = %id, "Teacher deactivated");
        Ok(name)
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &TeacherFilterParams) {
    query.push(" WHERE TRUE");
    if let Some(search) = &filters.search {
        let pattern = contains_pattern(search);
        query
            .push(" AND (t.nip ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR t.specialization ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(specialization) = &filters.specialization {
        query
            .push(" AND t.specialization ILIKE ")
            .push_bind(contains_pattern(specialization));
    }
    if let Some(is_active) = filters.is_active {
        query.push(" AND t.is_active = ").push_bind(is_active);
    }
}
