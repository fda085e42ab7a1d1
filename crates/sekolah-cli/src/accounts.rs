//! Admin account creation outside the HTTP API.

use sekolah_core::hash_password;
use sekolah_db::{ConstraintKind, violated_constraint};
use sekolah_models::accounts::Role;
use sekolah_models::ids::UserId;
use sqlx::PgPool;

use crate::CliResult;

pub struct NewAdmin {
    pub email: String,
    pub name: String,
    pub password: String,
    pub position: Option<String>,
    pub phone: Option<String>,
}

/// Inserts an admin account, its password credential and admin profile in
/// one transaction.
pub async fn create_admin(db: &PgPool, admin: &NewAdmin) -> CliResult<UserId> {
    if admin.password.len() < 8 {
        return Err("Password must be at least 8 characters".into());
    }
    let password_hash = hash_password(&admin.password).map_err(|e| e.error)?;

    let mut tx = db.begin().await?;

    let user_id = sqlx::query_scalar::<_, UserId>(
        r#"INSERT INTO users (email, name, role, email_verified)
           VALUES ($1, $2, $3, TRUE)
           RETURNING id"#,
    )
    .bind(&admin.email)
    .bind(&admin.name)
    .bind(Role::Admin)
    .fetch_one(&mut *tx)
    .await
    .map_err(|err| -> Box<dyn std::error::Error> {
        let duplicate = violated_constraint(&err)
            .is_some_and(|v| v.is(ConstraintKind::Unique, "users_email_key"));
        if duplicate {
            format!("An account with email {} already exists", admin.email).into()
        } else {
            err.into()
        }
    })?;

    sqlx::query(
        "INSERT INTO credentials (user_id, provider, password_hash) VALUES ($1, 'password', $2)",
    )
    .bind(user_id)
    .bind(&password_hash)
    .execute(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO admins (user_id, position, phone) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(&admin.position)
        .bind(&admin.phone)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(user_id)
}
