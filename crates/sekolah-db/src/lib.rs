//! # Sekolah DB
//!
//! Connection pool construction, embedded migrations, and classification of
//! constraint violations reported by PostgreSQL.
//!
//! # Example
//!
//! ```ignore
//! use sekolah_config::DatabaseConfig;
//! use sekolah_db::{init_db_pool, run_migrations};
//!
//! let config = DatabaseConfig::from_env()?;
//! let pool = init_db_pool(&config).await?;
//! run_migrations(&pool).await?;
//! ```

use sekolah_config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub use sqlx::PgPool;

/// Opens the PostgreSQL pool shared by every request handler.
///
/// The pool is cheap to clone and is carried in the application state; call
/// [`PgPool::close`] on shutdown to drain it.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.url)
        .await?;

    info!(
        max_connections = config.max_connections,
        "Database pool initialized"
    );

    Ok(pool)
}

/// Applies the migrations embedded from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Kind of integrity constraint a failed statement violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    Check,
}

/// A constraint violation reported by the database, with the constraint name
/// when the driver provides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation<'a> {
    pub kind: ConstraintKind,
    pub constraint: Option<&'a str>,
}

impl Violation<'_> {
    pub fn is(&self, kind: ConstraintKind, constraint: &str) -> bool {
        self.kind == kind && self.constraint == Some(constraint)
    }
}

/// Classifies `err` as a constraint violation, or `None` for any other error.
pub fn violated_constraint(err: &sqlx::Error) -> Option<Violation<'_>> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };

    let kind = if db_err.is_unique_violation() {
        ConstraintKind::Unique
    } else if db_err.is_foreign_key_violation() {
        ConstraintKind::ForeignKey
    } else if db_err.is_check_violation() {
        ConstraintKind::Check
    } else {
        return None;
    };

    Some(Violation {
        kind,
        constraint: db_err.constraint(),
    })
}
