use anyhow::anyhow;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use sekolah_core::{AppError, PaginationMeta, contains_pattern};
use sekolah_db::{ConstraintKind, Violation, violated_constraint};
use sekolah_models::ids::{MajorId, SubjectId};
use sekolah_models::summaries::MajorSummary;

use crate::modules::lookup::{Referenced, ensure_exists};
use crate::modules::subjects::model::{
    CreateSubjectDto, DEFAULT_CREDITS, PaginatedSubjectsResponse, SubjectCounts,
    SubjectFilterParams, SubjectResponse, UpdateSubjectDto,
};

const SUBJECT_SELECT: &str = r#"SELECT
        sj.id, sj.code, sj.name, sj.description, sj.major_id, sj.is_core, sj.credits,
        sj.created_at, sj.updated_at,
        m.code AS major_code, m.name AS major_name,
        (SELECT COUNT(*) FROM schedules x WHERE x.subject_id = sj.id) AS schedules,
        (SELECT COUNT(*) FROM assignments x WHERE x.subject_id = sj.id) AS assignments,
        (SELECT COUNT(*) FROM grades x WHERE x.subject_id = sj.id) AS grades
    FROM subjects sj
    LEFT JOIN majors m ON m.id = sj.major_id"#;

#[derive(FromRow)]
struct SubjectRow {
    id: SubjectId,
    code: String,
    name: String,
    description: Option<String>,
    major_id: Option<MajorId>,
    is_core: bool,
    credits: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    major_code: Option<String>,
    major_name: Option<String>,
    #[sqlx(flatten)]
    counts: SubjectCounts,
}

impl From<SubjectRow> for SubjectResponse {
    fn from(row: SubjectRow) -> Self {
        let major = match (row.major_id, row.major_code, row.major_name) {
            (Some(id), Some(code), Some(name)) => Some(MajorSummary { id, code, name }),
            _ => None,
        };

        SubjectResponse {
            id: row.id,
            code: row.code,
            name: row.name,
            description: row.description,
            major_id: row.major_id,
            is_core: row.is_core,
            credits: row.credits,
            created_at: row.created_at,
            updated_at: row.updated_at,
            major,
            counts: row.counts,
        }
    }
}

pub struct SubjectService;

impl SubjectService {
    #[instrument(skip(db))]
    pub async fn get_subjects(
        db: &PgPool,
        filters: SubjectFilterParams,
    ) -> Result<PaginatedSubjectsResponse, AppError> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM subjects sj");
        push_filters(&mut count_query, &filters);
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(db)
            .await?;

        let mut data_query = QueryBuilder::<Postgres>::new(SUBJECT_SELECT);
        push_filters(&mut data_query, &filters);
        data_query
            .push(" ORDER BY sj.created_at DESC, sj.code ASC LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let rows = data_query
            .build_query_as::<SubjectRow>()
            .fetch_all(db)
            .await?;

        Ok(PaginatedSubjectsResponse {
            data: rows.into_iter().map(SubjectResponse::from).collect(),
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_subject(db: &PgPool, id: SubjectId) -> Result<SubjectResponse, AppError> {
        let row = sqlx::query_as::<_, SubjectRow>(&format!("{} WHERE sj.id = $1", SUBJECT_SELECT))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Subject not found")))?;

        Ok(row.into())
    }

    #[instrument(skip(db))]
    pub async fn create_subject(
        db: &PgPool,
        dto: CreateSubjectDto,
    ) -> Result<SubjectResponse, AppError> {
        if let Some(major_id) = dto.major_id {
            ensure_exists(db, Referenced::Major, major_id).await?;
        }

        let id = sqlx::query_scalar::<_, SubjectId>(
            r#"INSERT INTO subjects (code, name, description, major_id, is_core, credits)
               VALUES ($1, $2, $3, $4, COALESCE($5, FALSE), $6)
               RETURNING id"#,
        )
        .bind(&dto.code)
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(dto.major_id)
        .bind(dto.is_core)
        .bind(dto.credits.unwrap_or(DEFAULT_CREDITS))
        .fetch_one(db)
        .await
        .map_err(map_write_error)?;

        Self::get_subject(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn update_subject(
        db: &PgPool,
        id: SubjectId,
        dto: UpdateSubjectDto,
    ) -> Result<SubjectResponse, AppError> {
        if let Some(Some(major_id)) = dto.major_id {
            ensure_exists(db, Referenced::Major, major_id).await?;
        }

        let mut query = QueryBuilder::<Postgres>::new("UPDATE subjects SET updated_at = NOW()");
        if let Some(code) = dto.code {
            query.push(", code = ").push_bind(code);
        }
        if let Some(name) = dto.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(description) = dto.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(major_id) = dto.major_id {
            query.push(", major_id = ").push_bind(major_id);
        }
        if let Some(is_core) = dto.is_core {
            query.push(", is_core = ").push_bind(is_core);
        }
        if let Some(credits) = dto.credits {
            query.push(", credits = ").push_bind(credits);
        }
        query.push(" WHERE id = ").push_bind(id).push(" RETURNING id");

        query
            .build_query_scalar::<SubjectId>()
            .fetch_optional(db)
            .await
            .map_err(map_write_error)?
            .ok_or_else(|| AppError::not_found(anyhow!("Subject not found")))?;

        Self::get_subject(db, id).await
    }

    /// Deletes a subject with no schedules, assignments or grades.
    #[instrument(skip(db))]
    pub async fn delete_subject(db: &PgPool, id: SubjectId) -> Result<(), AppError> {
        let subject = Self::get_subject(db, id).await?;
        if has_dependents(&subject.counts) {
            return Err(blocked(&subject.counts));
        }

        match sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
        {
            Ok(result) if result.rows_affected() == 0 => {
                Err(AppError::not_found(anyhow!("Subject not found")))
            }
            Ok(_) => Ok(()),
            Err(err)
                if violated_constraint(&err)
                    .is_some_and(|v| v.kind == ConstraintKind::ForeignKey) =>
            {
                let subject = Self::get_subject(db, id).await?;
                Err(blocked(&subject.counts))
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &SubjectFilterParams) {
    query.push(" WHERE TRUE");
    if let Some(search) = &filters.search {
        let pattern = contains_pattern(search);
        query
            .push(" AND (sj.code ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR sj.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR sj.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(major_id) = filters.major_id {
        query.push(" AND sj.major_id = ").push_bind(major_id);
    }
    if let Some(is_core) = filters.is_core {
        query.push(" AND sj.is_core = ").push_bind(is_core);
    }
}

fn has_dependents(counts: &SubjectCounts) -> bool {
    counts.schedules + counts.assignments + counts.grades > 0
}

fn blocked(counts: &SubjectCounts) -> AppError {
    AppError::dependency_conflict(
        "subject",
        vec![
            ("schedules", counts.schedules),
            ("assignments", counts.assignments),
            ("grades", counts.grades),
        ],
    )
}

fn map_write_error(err: sqlx::Error) -> AppError {
    match violated_constraint(&err) {
        Some(Violation {
            kind: ConstraintKind::Unique,
            constraint: Some("subjects_code_key"),
        }) => AppError::conflict(anyhow!("A subject with this code already exists")),
        Some(Violation {
            kind: ConstraintKind::ForeignKey,
            constraint: Some("subjects_major_id_fkey"),
        }) => Referenced::Major.not_found(),
        _ => AppError::from(err),
    }
}
