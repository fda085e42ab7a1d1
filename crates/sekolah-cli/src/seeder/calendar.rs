//! Academic year and semester seeding.

use chrono::NaiveDate;
use sekolah_models::academic_years::SemesterType;
use sekolah_models::ids::AcademicYearId;
use sqlx::PgPool;

use crate::CliResult;

const YEAR_LABEL: &str = "2024/2025";

fn date(year: i32, month: u32, day: u32) -> CliResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("invalid date {}-{}-{}", year, month, day).into())
}

/// Seeds the active 2024/2025 year with its GANJIL and GENAP semesters.
pub async fn seed_academic_year(db: &PgPool) -> CliResult<AcademicYearId> {
    println!("📅 Seeding academic year {}...", YEAR_LABEL);
    let mut tx = db.begin().await?;

    let existing = sqlx::query_scalar::<_, AcademicYearId>(
        "SELECT id FROM academic_years WHERE year = $1",
    )
    .bind(YEAR_LABEL)
    .fetch_optional(&mut *tx)
    .await?;

    let academic_year_id = match existing {
        Some(id) => id,
        None => {
            sqlx::query("UPDATE academic_years SET is_active = FALSE WHERE is_active")
                .execute(&mut *tx)
                .await?;
            sqlx::query_scalar::<_, AcademicYearId>(
                r#"INSERT INTO academic_years (year, start_date, end_date, is_active)
                   VALUES ($1, $2, $3, TRUE)
                   RETURNING id"#,
            )
            .bind(YEAR_LABEL)
            .bind(date(2024, 7, 15)?)
            .bind(date(2025, 6, 30)?)
            .fetch_one(&mut *tx)
            .await?
        }
    };

    let semesters = [
        (SemesterType::Ganjil, date(2024, 7, 15)?, date(2024, 12, 31)?, true),
        (SemesterType::Genap, date(2025, 1, 6)?, date(2025, 6, 30)?, false),
    ];
    for (semester_type, start_date, end_date, is_active) in semesters {
        sqlx::query(
            r#"INSERT INTO semesters (academic_year_id, type, start_date, end_date, is_active)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT ON CONSTRAINT semesters_year_type_key DO NOTHING"#,
        )
        .bind(academic_year_id)
        .bind(semester_type)
        .bind(start_date)
        .bind(end_date)
        .bind(is_active)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    println!("   ✓ Academic year and semesters ready");
    Ok(academic_year_id)
}
