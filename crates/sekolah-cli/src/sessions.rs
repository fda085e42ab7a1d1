use sqlx::PgPool;

use crate::CliResult;

/// Deletes every session past its expiry. Returns how many were removed.
pub async fn purge_expired_sessions(db: &PgPool) -> CliResult<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
