//! Existence checks for referenced rows, reported as 404 before a write.

use anyhow::anyhow;
use sqlx::{Encode, PgExecutor, Postgres, Type};

use sekolah_core::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Referenced {
    AcademicYear,
    Major,
    Class,
    Teacher,
    Parent,
}

impl Referenced {
    fn query(self) -> &'static str {
        match self {
            Referenced::AcademicYear => {
                "SELECT EXISTS(SELECT 1 FROM academic_years WHERE id = $1)"
            }
            Referenced::Major => "SELECT EXISTS(SELECT 1 FROM majors WHERE id = $1)",
            Referenced::Class => "SELECT EXISTS(SELECT 1 FROM classes WHERE id = $1)",
            Referenced::Teacher => "SELECT EXISTS(SELECT 1 FROM teachers WHERE id = $1)",
            Referenced::Parent => "SELECT EXISTS(SELECT 1 FROM parents WHERE id = $1)",
        }
    }

    pub fn not_found(self) -> AppError {
        let entity = match self {
            Referenced::AcademicYear => "Academic year",
            Referenced::Major => "Major",
            Referenced::Class => "Class",
            Referenced::Teacher => "Teacher",
            Referenced::Parent => "Parent",
        };
        AppError::not_found(anyhow!("{} not found", entity))
    }
}

/// Works against the pool or an open transaction (`&mut *tx`).
pub async fn ensure_exists<'c, E, Id>(
    executor: E,
    referenced: Referenced,
    id: Id,
) -> Result<(), AppError>
where
    E: PgExecutor<'c>,
    Id: for<'q> Encode<'q, Postgres> + Type<Postgres> + Send,
{
    let exists = sqlx::query_scalar::<_, bool>(referenced.query())
        .bind(id)
        .fetch_one(executor)
        .await?;

    if !exists {
        return Err(referenced.not_found());
    }
    Ok(())
}
