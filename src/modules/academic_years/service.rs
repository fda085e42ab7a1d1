use std::collections::HashMap;

use anyhow::anyhow;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};

use sekolah_core::{AppError, PaginationMeta};
use sekolah_db::{ConstraintKind, Violation, violated_constraint};
use sekolah_models::ids::AcademicYearId;

use crate::modules::academic_years::model::{
    AcademicYearFilterParams, AcademicYearResponse, CreateAcademicYearDto, CreateSemesterDto,
    PaginatedAcademicYearsResponse, SemesterResponse,
};

const YEAR_COLUMNS: &str =
    "id, year, start_date, end_date, is_active, created_at, updated_at";

const SEMESTER_COLUMNS: &str =
    "id, academic_year_id, type, start_date, end_date, is_active, created_at, updated_at";

pub struct AcademicYearService;

impl AcademicYearService {
    #[instrument(skip(db))]
    pub async fn get_academic_years(
        db: &PgPool,
        filters: AcademicYearFilterParams,
    ) -> Result<PaginatedAcademicYearsResponse, AppError> {
        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM academic_years WHERE TRUE");
        if let Some(is_active) = filters.is_active {
            count_query.push(" AND is_active = ").push_bind(is_active);
        }
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(db)
            .await?;

        let mut data_query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM academic_years WHERE TRUE",
            YEAR_COLUMNS
        ));
        if let Some(is_active) = filters.is_active {
            data_query.push(" AND is_active = ").push_bind(is_active);
        }
        data_query
            .push(" ORDER BY start_date DESC LIMIT ")
            .push_bind(filters.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filters.pagination.offset());
        let mut years = data_query
            .build_query_as::<AcademicYearResponse>()
            .fetch_all(db)
            .await?;

        attach_semesters(db, &mut years).await?;

        Ok(PaginatedAcademicYearsResponse {
            data: years,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_academic_year(
        db: &PgPool,
        id: AcademicYearId,
    ) -> Result<AcademicYearResponse, AppError> {
        let year = sqlx::query_as::<_, AcademicYearResponse>(&format!(
            "SELECT {} FROM academic_years WHERE id = $1",
            YEAR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Academic year not found")))?;

        let mut years = [year];
        attach_semesters(db, &mut years).await?;
        let [year] = years;
        Ok(year)
    }

    /// Creates a year. An active year replaces the currently active one.
    #[instrument(skip(db))]
    pub async fn create_academic_year(
        db: &PgPool,
        dto: CreateAcademicYearDto,
    ) -> Result<AcademicYearResponse, AppError> {
        if dto.start_date >= dto.end_date {
            return Err(AppError::bad_request(anyhow!(
                "Start date must be before end date"
            )));
        }

        let is_active = dto.is_active.unwrap_or(false);
        let mut tx = db.begin().await?;

        if is_active {
            sqlx::query(
                "UPDATE academic_years SET is_active = FALSE, updated_at = NOW() WHERE is_active",
            )
            .execute(&mut *tx)
            .await?;
        }

        let id = sqlx::query_scalar::<_, AcademicYearId>(
            r#"INSERT INTO academic_years (year, start_date, end_date, is_active)
               VALUES ($1, $2, $3, $4)
               RETURNING id"#,
        )
        .bind(&dto.year)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .bind(is_active)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_year_write_error)?;

        tx.commit().await?;
        info!(academic_year_id = %id, year = %dto.year, "Academic year created");

        Self::get_academic_year(db, id).await
    }

    /// Makes `id` the only active year.
    #[instrument(skip(db))]
    pub async fn activate_academic_year(
        db: &PgPool,
        id: AcademicYearId,
    ) -> Result<AcademicYearResponse, AppError> {
        let mut tx = db.begin().await?;

        sqlx::query_scalar::<_, AcademicYearId>(
            r#"UPDATE academic_years SET is_active = TRUE, updated_at = NOW()
               WHERE id = $1
               RETURNING id"#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Academic year not found")))?;

        sqlx::query(
            r#"UPDATE academic_years SET is_active = FALSE, updated_at = NOW()
               WHERE id <> $1 AND is_active"#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(academic_year_id = %id, "Academic year activated");

        Self::get_academic_year(db, id).await
    }

    /// Deletes a year with no classes and no grades recorded in its
    /// semesters. The semesters go with it.
    #[instrument(skip(db))]
    pub async fn delete_academic_year(db: &PgPool, id: AcademicYearId) -> Result<(), AppError> {
        Self::get_academic_year(db, id).await?;

        let dependents = count_dependents(db, id).await?;
        if dependents.iter().any(|(_, count)| *count > 0) {
            return Err(AppError::dependency_conflict("academic year", dependents));
        }

        match sqlx::query("DELETE FROM academic_years WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
        {
            Ok(result) if result.rows_affected() == 0 => {
                Err(AppError::not_found(anyhow!("Academic year not found")))
            }
            Ok(_) => Ok(()),
            Err(err)
                if violated_constraint(&err)
                    .is_some_and(|v| v.kind == ConstraintKind::ForeignKey) =>
            {
                let dependents = count_dependents(db, id).await?;
                Err(AppError::dependency_conflict("academic year", dependents))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Adds a semester inside the year's date range. Activating it
    /// deactivates the year's other semester.
    #[instrument(skip(db))]
    pub async fn create_semester(
        db: &PgPool,
        academic_year_id: AcademicYearId,
        dto: CreateSemesterDto,
    ) -> Result<SemesterResponse, AppError> {
        let year = Self::get_academic_year(db, academic_year_id).await?;

        if dto.start_date >= dto.end_date {
            return Err(AppError::bad_request(anyhow!(
                "Start date must be before end date"
            )));
        }
        if dto.start_date < year.start_date || dto.end_date > year.end_date {
            return Err(AppError::bad_request(anyhow!(
                "Semester dates must fall within academic year {} ({} to {})",
                year.year,
                year.start_date,
                year.end_date
            )));
        }

        let is_active = dto.is_active.unwrap_or(false);
        let mut tx = db.begin().await?;

        if is_active {
            sqlx::query(
                r#"UPDATE semesters SET is_active = FALSE, updated_at = NOW()
                   WHERE academic_year_id = $1 AND is_active"#,
            )
            .bind(academic_year_id)
            .execute(&mut *tx)
            .await?;
        }

        let semester = sqlx::query_as::<_, SemesterResponse>(&format!(
            r#"INSERT INTO semesters (academic_year_id, type, start_date, end_date, is_active)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {}"#,
            SEMESTER_COLUMNS
        ))
        .bind(academic_year_id)
        .bind(dto.semester_type)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .bind(is_active)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| match violated_constraint(&err) {
            Some(Violation {
                kind: ConstraintKind::Unique,
                constraint: Some("semesters_year_type_key"),
            }) => AppError::conflict(anyhow!(
                "Academic year {} already has a {} semester",
                year.year,
                dto.semester_type.as_str()
            )),
            _ => AppError::from(err),
        })?;

        tx.commit().await?;

        Ok(semester)
    }
}

async fn attach_semesters(
    db: &PgPool,
    years: &mut [AcademicYearResponse],
) -> Result<(), AppError> {
    if years.is_empty() {
        return Ok(());
    }

    let ids: Vec<AcademicYearId> = years.iter().map(|year| year.id).collect();
    let semesters = sqlx::query_as::<_, SemesterResponse>(&format!(
        "SELECT {} FROM semesters WHERE academic_year_id = ANY($1) ORDER BY start_date ASC",
        SEMESTER_COLUMNS
    ))
    .bind(ids)
    .fetch_all(db)
    .await?;

    let mut by_year: HashMap<AcademicYearId, Vec<SemesterResponse>> = HashMap::new();
    for semester in semesters {
        by_year
            .entry(semester.academic_year_id)
            .or_default()
            .push(semester);
    }
    for year in years.iter_mut() {
        year.semesters = by_year.remove(&year.id).unwrap_or_default();
    }

    Ok(())
}

async fn count_dependents(
    db: &PgPool,
    id: AcademicYearId,
) -> Result<Vec<(&'static str, i64)>, AppError> {
    let (classes, grades) = sqlx::query_as::<_, (i64, i64)>(
        r#"SELECT
               (SELECT COUNT(*) FROM classes WHERE academic_year_id = $1),
               (SELECT COUNT(*) FROM grades g
                  JOIN semesters s ON s.id = g.semester_id
                 WHERE s.academic_year_id = $1)"#,
    )
    .bind(id)
    .fetch_one(db)
    .await?;

    Ok(vec![("classes", classes), ("grades", grades)])
}

fn map_year_write_error(err: sqlx::Error) -> AppError {
    match violated_constraint(&err) {
        Some(Violation {
            kind: ConstraintKind::Unique,
            constraint: Some("academic_years_year_key"),
        }) => AppError::conflict(anyhow!("This academic year already exists")),
        Some(Violation {
            kind: ConstraintKind::Check,
            ..
        }) => AppError::bad_request(anyhow!("Start date must be before end date")),
        _ => AppError::from(err),
    }
}
