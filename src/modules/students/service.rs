use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};

use sekolah_core::{AppError, PaginationMeta, contains_pattern};
use sekolah_db::{ConstraintKind, Violation, violated_constraint};
use sekolah_models::accounts::Gender;
use sekolah_models::ids::{ClassId, MajorId, ParentId, StudentId, UserId};
use sekolah_models::summaries::{ClassSummary, MajorSummary, ParentSummary};

use crate::modules::accounts::{ACCOUNT_COLUMNS, AccountColumns};
use crate::modules::classes::service::ClassService;
use crate::modules::lookup::{Referenced, ensure_exists};
use crate::modules::students::model::{
    PaginatedStudentsResponse, StudentFilterParams, StudentResponse, UpdateStudentDto,
};

#[derive(FromRow)]
struct StudentRow {
    id: StudentId,
    user_id: UserId,
    nis: String,
    nisn: String,
    class_id: Option<ClassId>,
    major_id: MajorId,
    parent_id: Option<ParentId>,
    date_of_birth: NaiveDate,
    place_of_birth: String,
    gender: Gender,
    address: String,
    phone: Option<String>,
    photo: Option<String>,
    enrollment_year: i32,
    graduation_year: Option<i32>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[sqlx(flatten)]
    account: AccountColumns,
    class_name: Option<String>,
    class_grade: Option<i16>,
    class_section: Option<String>,
    major_code: String,
    major_name: String,
    parent_nik: Option<String>,
    parent_name: Option<String>,
    parent_email: Option<String>,
}

impl From<StudentRow> for StudentResponse {
    fn from(row: StudentRow) -> Self {
        let class = match (row.class_id, row.class_name, row.class_grade, row.class_section) {
            (Some(id), Some(name), Some(grade), Some(section)) => Some(ClassSummary {
                id,
                name,
                grade,
                section,
            }),
            _ => None,
        };
        let parent = match (row.parent_id, row.parent_nik, row.parent_name, row.parent_email) {
            (Some(id), Some(nik), Some(name), Some(email)) => Some(ParentSummary {
                id,
                nik,
                name,
                email,
            }),
            _ => None,
        };

        StudentResponse {
            id: row.id,
            user_id: row.user_id,
            nis: row.nis,
            nisn: row.nisn,
            class_id: row.class_id,
            major_id: row.major_id,
            parent_id: row.parent_id,
            date_of_birth: row.date_of_birth,
            place_of_birth: row.place_of_birth,
            gender: row.gender,
            address: row.address,
            phone: row.phone,
            photo: row.photo,
            enrollment_year: row.enrollment_year,
            graduation_year: row.graduation_year,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user: row.account.into_account(row.user_id),
            class,
            major: MajorSummary {
                id: row.major_id,
                code: row.major_code,
                name: row.major_name,
            },
            parent,
        }
    }
}

fn student_select() -> String {
    format!(
        r#"SELECT
            s.id, s.user_id, s.nis, s.nisn, s.class_id, s.major_id, s.parent_id,
            s.date_of_birth, s.place_of_birth, s.gender, s.address, s.phone, s.photo,
            s.enrollment_year, s.graduation_year, s.is_active, s.created_at, s.updated_at,
            {},
            c.name AS class_name, c.grade AS class_grade, c.section AS class_section,
            m.code AS major_code, m.name AS major_name,
            p.nik AS parent_nik, pu.name AS parent_name, pu.email AS parent_email
        FROM students s
        JOIN users u ON u.id = s.user_id
        JOIN majors m ON m.id = s.major_id
        LEFT JOIN classes c ON c.id = s.class_id
        LEFT JOIN parents p ON p.id = s.parent_id
        LEFT JOIN users pu ON pu.id = p.user_id"#,
        ACCOUNT_COLUMNS
    )
}

fn student_not_found() -> AppError {
    AppError::not_found(anyhow!("Student not found"))
}

#[derive(FromRow)]
struct Placement {
    class_id: Option<ClassId>,
    is_active: bool,
}

pub struct StudentService;

impl StudentService {
    #[instrument(skip(db))]
    pub async fn get_students(
        db: &PgPool,
        filters: StudentFilterParams,
    ) -> Result<PaginatedStudentsResponse, AppError> {
        let mut count_query = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM students s JOIN users u ON u.id = s.user_id",
        );
        push_filters(&mut count_query, &filters);
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(db)
            .await?;

        let mut data_query = QueryBuilder::<Postgres>::new(student_select());
        push_filters(&mut data_query, &filters);
        data_query
            .push(" ORDER BY s.nis ASC LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let rows = data_query
            .build_query_as::<StudentRow>()
            .fetch_all(db)
            .await?;

        Ok(PaginatedStudentsResponse {
            data: rows.into_iter().map(StudentResponse::from).collect(),
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_student(db: &PgPool, id: StudentId) -> Result<StudentResponse, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!("{} WHERE s.id = $1", student_select()))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(student_not_found)?;

        Ok(row.into())
    }

    /// The student profile owned by an account.
    #[instrument(skip(db))]
    pub async fn get_student_by_user_id(
        db: &PgPool,
        user_id: UserId,
    ) -> Result<StudentResponse, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            "{} WHERE s.user_id = $1",
            student_select()
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Student profile not found")))?;

        Ok(row.into())
    }

    /// Partial update. Referenced class, major and parent must exist, and a
    /// student placed into a class (or reactivated in one) needs a free seat.
    #[instrument(skip(db))]
    pub async fn update_student(
        db: &PgPool,
        id: StudentId,
        dto: UpdateStudentDto,
    ) -> Result<StudentResponse, AppError> {
        let mut tx = db.begin().await?;

        let current = sqlx::query_as::<_, Placement>(
            "SELECT class_id, is_active FROM students WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(student_not_found)?;

        if let Some(major_id) = dto.major_id {
            ensure_exists(&mut *tx, Referenced::Major, major_id).await?;
        }
        if let Some(Some(parent_id)) = dto.parent_id {
            ensure_exists(&mut *tx, Referenced::Parent, parent_id).await?;
        }

        let class_id = dto.class_id.unwrap_or(current.class_id);
        let will_be_active = dto.is_active.unwrap_or(current.is_active);
        let placement_changes = dto.class_id.is_some() || (will_be_active && !current.is_active);
        if let (Some(class_id), true, true) = (class_id, will_be_active, placement_changes) {
            ClassService::ensure_has_room(&mut *tx, class_id, Some(id)).await?;
        }

        let mut query = QueryBuilder::<Postgres>::new("UPDATE students SET updated_at = NOW()");
        if let Some(class_id) = dto.class_id {
            query.push(", class_id = ").push_bind(class_id);
        }
        if let Some(major_id) = dto.major_id {
            query.push(", major_id = ").push_bind(major_id);
        }
        if let Some(parent_id) = dto.parent_id {
            query.push(", parent_id = ").push_bind(parent_id);
        }
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
        if let Some(photo) = dto.photo {
            query.push(", photo = ").push_bind(photo);
        }
        if let Some(graduation_year) = dto.graduation_year {
            query.push(", graduation_year = ").push_bind(graduation_year);
        }
        if let Some(is_active) = dto.is_active {
            query.push(", is_active = ").push_bind(is_active);
        }
        query.push(" WHERE id = ").push_bind(id);

        query
            .build()
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
        tx.commit().await?;

        Self::get_student(db, id).await
    }

    /// Marks the student inactive. Returns the student's name.
    #[instrument(skip(db))]
    pub async fn deactivate_student(db: &PgPool, id: StudentId) -> Result<String, AppError> {
        let name = sqlx::query_scalar::<_, String>(
            r#"UPDATE students s SET is_active = FALSE, updated_at = NOW()
               FROM users u
               WHERE s.id = $1 AND u.id = s.user_id
               RETURNING u.name"#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(student_not_found)?;

        info!(student_id = %id, "Student deactivated");
        Ok(name)
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &StudentFilterParams) {
    query.push(" WHERE TRUE");
    if let Some(search) = &filters.search {
        let pattern = contains_pattern(search);
        query
            .push(" AND (s.nis ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR s.nisn ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(class_id) = filters.class_id {
        query.push(" AND s.class_id = ").push_bind(class_id);
    }
    if let Some(major_id) = filters.major_id {
        query.push(" AND s.major_id = ").push_bind(major_id);
    }
    if let Some(enrollment_year) = filters.enrollment_year {
        query.push(" AND s.enrollment_year = ").push_bind(enrollment_year);
    }
    if let Some(is_active) = filters.is_active {
        query.push(" AND s.is_active = ").push_bind(is_active);
    }
}

/// Maps foreign-key failures on student writes to the 404 of the missing row.
fn map_write_error(err: sqlx::Error) -> AppError {
    match violated_constraint(&err) {
        Some(Violation {
            kind: ConstraintKind::ForeignKey,
            constraint: Some("students_class_id_fkey"),
        }) => Referenced::Class.not_found(),
        Some(Violation {
            kind: ConstraintKind::ForeignKey,
            constraint: Some("students_major_id_fkey"),
        }) => Referenced::Major.not_found(),
        Some(Violation {
            kind: ConstraintKind::ForeignKey,
            constraint: Some("students_parent_id_fkey"),
        }) => Referenced::Parent.not_found(),
        _ => AppError::from(err),
    }
}
