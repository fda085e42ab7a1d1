use anyhow::anyhow;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgExecutor, PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};

use sekolah_core::{AppError, PaginationMeta, contains_pattern};
use sekolah_db::{ConstraintKind, Violation, violated_constraint};
use sekolah_observability::track_class_full;
use sekolah_models::accounts::Gender;
use sekolah_models::ids::{AcademicYearId, ClassId, MajorId, StudentId, TeacherId, UserId};
use sekolah_models::summaries::{AcademicYearSummary, MajorSummary, TeacherSummary, UserSummary};

use crate::modules::classes::model::{
    ClassCounts, ClassFilterParams, ClassResponse, CreateClassDto, DEFAULT_MAX_STUDENTS,
    PaginatedClassesResponse, RosterEntry, UpdateClassDto, default_class_name,
};
use crate::modules::lookup::{Referenced, ensure_exists};

const CLASS_SELECT: &str = r#"SELECT
        c.id, c.academic_year_id, c.major_id, c.grade, c.section, c.name,
        c.homeroom_teacher_id, c.max_students, c.is_active, c.created_at, c.updated_at,
        ay.year AS academic_year, ay.is_active AS academic_year_is_active,
        m.code AS major_code, m.name AS major_name,
        t.nip AS homeroom_nip, tu.name AS homeroom_name,
        (SELECT COUNT(*) FROM students x WHERE x.class_id = c.id) AS students,
        (SELECT COUNT(*) FROM schedules x WHERE x.class_id = c.id) AS schedules,
        (SELECT COUNT(*) FROM assignments x WHERE x.class_id = c.id) AS assignments,
        (SELECT COUNT(*) FROM attendances x WHERE x.class_id = c.id) AS attendances
    FROM classes c
    JOIN academic_years ay ON ay.id = c.academic_year_id
    JOIN majors m ON m.id = c.major_id
    LEFT JOIN teachers t ON t.id = c.homeroom_teacher_id
    LEFT JOIN users tu ON tu.id = t.user_id"#;

#[derive(FromRow)]
struct ClassRow {
    id: ClassId,
    academic_year_id: AcademicYearId,
    major_id: MajorId,
    grade: i16,
    section: String,
    name: String,
    homeroom_teacher_id: Option<TeacherId>,
    max_students: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    academic_year: String,
    academic_year_is_active: bool,
    major_code: String,
    major_name: String,
    homeroom_nip: Option<String>,
    homeroom_name: Option<String>,
    #[sqlx(flatten)]
    counts: ClassCounts,
}

impl From<ClassRow> for ClassResponse {
    fn from(row: ClassRow) -> Self {
        let homeroom_teacher = match (row.homeroom_teacher_id, row.homeroom_nip, row.homeroom_name)
        {
            (Some(id), Some(nip), Some(name)) => Some(TeacherSummary { id, nip, name }),
            _ => None,
        };

        ClassResponse {
            id: row.id,
            academic_year_id: row.academic_year_id,
            major_id: row.major_id,
            grade: row.grade,
            section: row.section,
            name: row.name,
            homeroom_teacher_id: row.homeroom_teacher_id,
            max_students: row.max_students,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            academic_year: AcademicYearSummary {
                id: row.academic_year_id,
                year: row.academic_year,
                is_active: row.academic_year_is_active,
            },
            major: MajorSummary {
                id: row.major_id,
                code: row.major_code,
                name: row.major_name,
            },
            homeroom_teacher,
            counts: row.counts,
        }
    }
}

#[derive(FromRow)]
struct RosterRow {
    id: StudentId,
    nis: String,
    nisn: String,
    gender: Gender,
    user_id: UserId,
    user_name: String,
    user_email: String,
    user_image: Option<String>,
    major_id: MajorId,
    major_code: String,
    major_name: String,
}

impl From<RosterRow> for RosterEntry {
    fn from(row: RosterRow) -> Self {
        RosterEntry {
            id: row.id,
            nis: row.nis,
            nisn: row.nisn,
            gender: row.gender,
            user: UserSummary {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
                image: row.user_image,
            },
            major: MajorSummary {
                id: row.major_id,
                code: row.major_code,
                name: row.major_name,
            },
        }
    }
}

#[derive(FromRow)]
struct Occupancy {
    name: String,
    max_students: i32,
    active_students: i64,
}

pub struct ClassService;

impl ClassService {
    #[instrument(skip(db))]
    pub async fn get_classes(
        db: &PgPool,
        filters: ClassFilterParams,
    ) -> Result<PaginatedClassesResponse, AppError> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM classes c");
        push_filters(&mut count_query, &filters);
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(db)
            .await?;

        let mut data_query = QueryBuilder::<Postgres>::new(CLASS_SELECT);
        push_filters(&mut data_query, &filters);
        data_query
            .push(" ORDER BY c.grade ASC, c.section ASC, m.code ASC LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let rows = data_query.build_query_as::<ClassRow>().fetch_all(db).await?;

        Ok(PaginatedClassesResponse {
            data: rows.into_iter().map(ClassResponse::from).collect(),
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_class(db: &PgPool, id: ClassId) -> Result<ClassResponse, AppError> {
        let row = sqlx::query_as::<_, ClassRow>(&format!("{} WHERE c.id = $1", CLASS_SELECT))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| Referenced::Class.not_found())?;

        Ok(row.into())
    }

    #[instrument(skip(db))]
    pub async fn create_class(db: &PgPool, dto: CreateClassDto) -> Result<ClassResponse, AppError> {
        ensure_exists(db, Referenced::AcademicYear, dto.academic_year_id).await?;
        let major_code = major_code(db, dto.major_id).await?;
        if let Some(teacher_id) = dto.homeroom_teacher_id {
            ensure_exists(db, Referenced::Teacher, teacher_id).await?;
        }

        let name = dto
            .name
            .clone()
            .unwrap_or_else(|| default_class_name(dto.grade, &major_code, &dto.section));

        let id = sqlx::query_scalar::<_, ClassId>(
            r#"INSERT INTO classes
                   (academic_year_id, major_id, grade, section, name, homeroom_teacher_id,
                    max_students, is_active)
               VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, TRUE))
               RETURNING id"#,
        )
        .bind(dto.academic_year_id)
        .bind(dto.major_id)
        .bind(dto.grade)
        .bind(&dto.section)
        .bind(&name)
        .bind(dto.homeroom_teacher_id)
        .bind(dto.max_students.unwrap_or(DEFAULT_MAX_STUDENTS))
        .bind(dto.is_active)
        .fetch_one(db)
        .await
        .map_err(map_write_error)?;

        info!(class_id = %id, name = %name, "Class created");
        Self::get_class(db, id).await
    }

    /// Partial update. A class still carrying its generated name is renamed
    /// when grade, section or major change and no explicit name is given.
    #[instrument(skip(db))]
    pub async fn update_class(
        db: &PgPool,
        id: ClassId,
        dto: UpdateClassDto,
    ) -> Result<ClassResponse, AppError> {
        let existing = Self::get_class(db, id).await?;

        if let Some(academic_year_id) = dto.academic_year_id {
            ensure_exists(db, Referenced::AcademicYear, academic_year_id).await?;
        }
        let new_major_code = match dto.major_id {
            Some(major_id) => major_code(db, major_id).await?,
            None => existing.major.code.clone(),
        };
        if let Some(Some(teacher_id)) = dto.homeroom_teacher_id {
            ensure_exists(db, Referenced::Teacher, teacher_id).await?;
        }

        if let Some(max_students) = dto.max_students {
            let occupancy = occupancy(db, id, None).await?;
            if occupancy.active_students > i64::from(max_students) {
                return Err(AppError::bad_request(anyhow!(
                    "Class {} already has {} active students; capacity cannot be lowered to {}",
                    occupancy.name,
                    occupancy.active_students,
                    max_students
                )));
            }
        }

        let name = match &dto.name {
            Some(name) => Some(name.clone()),
            None if dto.changes_natural_key() => {
                let generated = default_class_name(
                    existing.grade,
                    &existing.major.code,
                    &existing.section,
                );
                (existing.name == generated).then(|| {
                    default_class_name(
                        dto.grade.unwrap_or(existing.grade),
                        &new_major_code,
                        dto.section.as_deref().unwrap_or(&existing.section),
                    )
                })
            }
            None => None,
        };

        let mut query = QueryBuilder::<Postgres>::new("UPDATE classes SET updated_at = NOW()");
        if let Some(academic_year_id) = dto.academic_year_id {
            query.push(", academic_year_id = ").push_bind(academic_year_id);
        }
        if let Some(major_id) = dto.major_id {
            query.push(", major_id = ").push_bind(major_id);
        }
        if let Some(grade) = dto.grade {
            query.push(", grade = ").push_bind(grade);
        }
        if let Some(section) = dto.section {
            query.push(", section = ").push_bind(section);
        }
        if let Some(name) = name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(homeroom_teacher_id) = dto.homeroom_teacher_id {
            query
                .push(", homeroom_teacher_id = ")
                .push_bind(homeroom_teacher_id);
        }
        if let Some(max_students) = dto.max_students {
            query.push(", max_students = ").push_bind(max_students);
        }
        if let Some(is_active) = dto.is_active {
            query.push(", is_active = ").push_bind(is_active);
        }
        query.push(" WHERE id = ").push_bind(id);

        let result = query
            .build()
            .execute(db)
            .await
            .map_err(map_write_error)?;
        if result.rows_affected() == 0 {
            return Err(Referenced::Class.not_found());
        }

        Self::get_class(db, id).await
    }

    /// Deletes a class nothing refers to. Returns the deleted class's name.
    #[instrument(skip(db))]
    pub async fn delete_class(db: &PgPool, id: ClassId) -> Result<String, AppError> {
        let class = Self::get_class(db, id).await?;
        if has_dependents(&class.counts) {
            return Err(blocked(&class.counts));
        }

        match sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
        {
            Ok(result) if result.rows_affected() == 0 => Err(Referenced::Class.not_found()),
            Ok(_) => {
                info!(class_id = %id, name = %class.name, "Class deleted");
                Ok(class.name)
            }
            Err(err)
                if violated_constraint(&err)
                    .is_some_and(|v| v.kind == ConstraintKind::ForeignKey) =>
            {
                let class = Self::get_class(db, id).await?;
                Err(blocked(&class.counts))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Active students of a class, ordered by NIS.
    #[instrument(skip(db))]
    pub async fn get_class_students(
        db: &PgPool,
        id: ClassId,
    ) -> Result<Vec<RosterEntry>, AppError> {
        ensure_exists(db, Referenced::Class, id).await?;

        let rows = sqlx::query_as::<_, RosterRow>(
            r#"SELECT
                   s.id, s.nis, s.nisn, s.gender,
                   u.id AS user_id, u.name AS user_name, u.email AS user_email,
                   u.image AS user_image,
                   m.id AS major_id, m.code AS major_code, m.name AS major_name
               FROM students s
               JOIN users u ON u.id = s.user_id
               JOIN majors m ON m.id = s.major_id
               WHERE s.class_id = $1 AND s.is_active
               ORDER BY s.nis ASC"#,
        )
        .bind(id)
        .fetch_all(db)
        .await?;

        Ok(rows.into_iter().map(RosterEntry::from).collect())
    }

    /// Fails with 400 when the class has no free seat for one more active
    /// student. `moving` is left out of the head count so a student already
    /// in the class can be re-saved. Locks the class row when run inside a
    /// transaction.
    pub async fn ensure_has_room<'c, E>(
        executor: E,
        class_id: ClassId,
        moving: Option<StudentId>,
    ) -> Result<(), AppError>
    where
        E: PgExecutor<'c>,
    {
        let occupancy = occupancy(executor, class_id, moving).await?;
        if occupancy.active_students >= i64::from(occupancy.max_students) {
            track_class_full();
            return Err(AppError::bad_request(anyhow!(
                "Class {} is full ({} of {} students)",
                occupancy.name,
                occupancy.active_students,
                occupancy.max_students
            )));
        }
        Ok(())
    }
}

async fn occupancy<'c, E>(
    executor: E,
    class_id: ClassId,
    moving: Option<StudentId>,
) -> Result<Occupancy, AppError>
where
    E: PgExecutor<'c>,
{
    sqlx::query_as::<_, Occupancy>(
        r#"SELECT c.name, c.max_students,
                  (SELECT COUNT(*) FROM students s
                    WHERE s.class_id = c.id AND s.is_active
                      AND ($2::uuid IS NULL OR s.id <> $2)) AS active_students
           FROM classes c
           WHERE c.id = $1
           FOR UPDATE OF c"#,
    )
    .bind(class_id)
    .bind(moving)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| Referenced::Class.not_found())
}

async fn major_code(db: &PgPool, major_id: MajorId) -> Result<String, AppError> {
    sqlx::query_scalar::<_, String>("SELECT code FROM majors WHERE id = $1")
        .bind(major_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| Referenced::Major.not_found())
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &ClassFilterParams) {
    query.push(" WHERE TRUE");
    if let Some(search) = &filters.search {
        let pattern = contains_pattern(search);
        query
            .push(" AND (c.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.section ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(academic_year_id) = filters.academic_year_id {
        query
            .push(" AND c.academic_year_id = ")
            .push_bind(academic_year_id);
    }
    if let Some(major_id) = filters.major_id {
        query.push(" AND c.major_id = ").push_bind(major_id);
    }
    if let Some(grade) = filters.grade {
        query.push(" AND c.grade = ").push_bind(grade);
    }
    if let Some(is_active) = filters.is_active {
        query.push(" AND c.is_active = ").push_bind(is_active);
    }
}

fn has_dependents(counts: &ClassCounts) -> bool {
    counts.students + counts.schedules + counts.assignments + counts.attendances > 0
}

fn blocked(counts: &ClassCounts) -> AppError {
    AppError::dependency_conflict(
        "class",
        vec![
            ("students", counts.students),
            ("schedules", counts.schedules),
            ("assignments", counts.assignments),
            ("attendances", counts.attendances),
        ],
    )
}

fn map_write_error(err: sqlx::Error) -> AppError {
    match violated_constraint(&err) {
        Some(Violation {
            kind: ConstraintKind::Unique,
            constraint: Some("classes_year_major_grade_section_key"),
        }) => AppError::conflict(anyhow!(
            "A class with this grade and section already exists for the academic year and major"
        )),
        Some(Violation {
            kind: ConstraintKind::ForeignKey,
            constraint: Some(constraint),
        }) => match constraint {
            "classes_academic_year_id_fkey" => Referenced::AcademicYear.not_found(),
            "classes_major_id_fkey" => Referenced::Major.not_found(),
            "classes_homeroom_teacher_id_fkey" => Referenced::Teacher.not_found(),
            _ => AppError::from(err),
        },
        _ => AppError::from(err),
    }
}
