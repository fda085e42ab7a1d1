//! Account columns joined onto profile queries.
//!
//! Profile selects alias the `users` columns with a `user_` prefix through
//! [`ACCOUNT_COLUMNS`] so they can sit next to profile columns of the same
//! name, and rows flatten [`AccountColumns`] to rebuild the [`Account`].

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use sekolah_models::accounts::{Account, Role};
use sekolah_models::ids::UserId;

/// Expects the `users` table aliased as `u`.
pub const ACCOUNT_COLUMNS: &str = "u.email AS user_email, u.name AS user_name, \
     u.role AS user_role, u.image AS user_image, u.email_verified AS user_email_verified, \
     u.created_at AS user_created_at, u.updated_at AS user_updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct AccountColumns {
    pub user_email: String,
    pub user_name: String,
    pub user_role: Role,
    pub user_image: Option<String>,
    pub user_email_verified: bool,
    pub user_created_at: DateTime<Utc>,
    pub user_updated_at: DateTime<Utc>,
}

impl AccountColumns {
    pub fn into_account(self, id: UserId) -> Account {
        Account {
            id,
            email: self.user_email,
            name: self.user_name,
            role: self.user_role,
            image: self.user_image,
            email_verified: self.user_email_verified,
            created_at: self.user_created_at,
            updated_at: self.user_updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_account_keeps_the_profile_user_id() {
        let now = Utc::now();
        let columns = AccountColumns {
            user_email: "guru@sekolah.sch.id".to_string(),
            user_name: "Siti Aminah".to_string(),
            user_role: Role::Teacher,
            user_image: None,
            user_email_verified: false,
            user_created_at: now,
            user_updated_at: now,
        };
        let id = UserId::new();
        let account = columns.into_account(id);
        assert_eq!(account.id, id);
        assert_eq!(account.role, Role::Teacher);
        assert_eq!(account.email, "guru@sekolah.sch.id");
    }
}
