use anyhow::anyhow;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use sekolah_core::{AppError, PaginationMeta, contains_pattern};
use sekolah_db::{ConstraintKind, Violation, violated_constraint};
use sekolah_models::ids::MajorId;

use crate::modules::majors::model::{
    CreateMajorDto, MajorFilterParams, MajorResponse, PaginatedMajorsResponse, UpdateMajorDto,
};

const MAJOR_SELECT: &str = r#"SELECT
        m.id, m.code, m.name, m.description, m.image, m.is_active, m.created_at, m.updated_at,
        (SELECT COUNT(*) FROM students s WHERE s.major_id = m.id) AS students,
        (SELECT COUNT(*) FROM classes c WHERE c.major_id = m.id) AS classes,
        (SELECT COUNT(*) FROM subjects sj WHERE sj.major_id = m.id) AS subjects
    FROM majors m"#;

pub struct MajorService;

impl MajorService {
    #[instrument(skip(db))]
    pub async fn get_majors(
        db: &PgPool,
        filters: MajorFilterParams,
    ) -> Result<PaginatedMajorsResponse, AppError> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM majors m");
        push_filters(&mut count_query, &filters);
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(db)
            .await?;

        let mut data_query = QueryBuilder::<Postgres>::new(MAJOR_SELECT);
        push_filters(&mut data_query, &filters);
        data_query
            .push(" ORDER BY m.created_at DESC, m.code ASC LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let majors = data_query
            .build_query_as::<MajorResponse>()
            .fetch_all(db)
            .await?;

        Ok(PaginatedMajorsResponse {
            data: majors,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_major(db: &PgPool, id: MajorId) -> Result<MajorResponse, AppError> {
        sqlx::query_as::<_, MajorResponse>(&format!("{} WHERE m.id = $1", MAJOR_SELECT))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Major not found")))
    }

    #[instrument(skip(db))]
    pub async fn create_major(db: &PgPool, dto: CreateMajorDto) -> Result<MajorResponse, AppError> {
        let id = sqlx::query_scalar::<_, MajorId>(
            r#"INSERT INTO majors (code, name, description, image, is_active)
               VALUES ($1, $2, $3, $4, COALESCE($5, TRUE))
               RETURNING id"#,
        )
        .bind(&dto.code)
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(&dto.image)
        .bind(dto.is_active)
        .fetch_one(db)
        .await
        .map_err(map_write_error)?;

        Self::get_major(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn update_major(
        db: &PgPool,
        id: MajorId,
        dto: UpdateMajorDto,
    ) -> Result<MajorResponse, AppError> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE majors SET updated_at = NOW()");
        if let Some(code) = dto.code {
            query.push(", code = ").push_bind(code);
        }
        if let Some(name) = dto.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(description) = dto.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(image) = dto.image {
            query.push(", image = ").push_bind(image);
        }
        if let Some(is_active) = dto.is_active {
            query.push(", is_active = ").push_bind(is_active);
        }
        query.push(" WHERE id = ").push_bind(id).push(" RETURNING id");

        query
            .build_query_scalar::<MajorId>()
            .fetch_optional(db)
            .await
            .map_err(map_write_error)?
            .ok_or_else(|| AppError::not_found(anyhow!("Major not found")))?;

        Self::get_major(db, id).await
    }

    /// Deletes a major that no student or class references. Subjects of the
    /// major are detached.
    #[instrument(skip(db))]
    pub async fn delete_major(db: &PgPool, id: MajorId) -> Result<(), AppError> {
        let major = Self::get_major(db, id).await?;
        if major.counts.students + major.counts.classes > 0 {
            return Err(blocked(&major));
        }

        match sqlx::query("DELETE FROM majors WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
        {
            Ok(result) if result.rows_affected() == 0 => {
                Err(AppError::not_found(anyhow!("Major not found")))
            }
            Ok(_) => Ok(()),
            Err(err)
                if violated_constraint(&err)
                    .is_some_and(|v| v.kind == ConstraintKind::ForeignKey) =>
            {
                // A student or class was attached after the check above.
                let major = Self::get_major(db, id).await?;
                Err(blocked(&major))
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &MajorFilterParams) {
    query.push(" WHERE TRUE");
    if let Some(search) = &filters.search {
        let pattern = contains_pattern(search);
        query
            .push(" AND (m.code ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR m.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR m.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(is_active) = filters.is_active {
        query.push(" AND m.is_active = ").push_bind(is_active);
    }
}

fn blocked(major: &MajorResponse) -> AppError {
    AppError::dependency_conflict(
        "major",
        vec![
            ("students", major.counts.students),
            ("classes", major.counts.classes),
        ],
    )
}

fn map_write_error(err: sqlx::Error) -> AppError {
    match violated_constraint(&err) {
        Some(Violation {
            kind: ConstraintKind::Unique,
            constraint: Some("majors_code_key"),
        }) => AppError::conflict(anyhow!("A major with this code already exists")),
        _ => AppError::from(err),
    }
}
