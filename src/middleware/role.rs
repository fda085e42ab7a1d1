//! Role allow-list extractors.
//!
//! Each extractor authenticates the request through [`AuthUser`] and then
//! rejects sessions whose role is not listed with 403.

use sekolah_models::accounts::Role;

use crate::middleware::auth::AuthUser;

/// Defines an extractor that admits only the listed roles.
#[macro_export]
macro_rules! require_roles {
    ($name:ident, [$($role:expr),+ $(,)?]) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl $name {
            pub const ROLES: &'static [sekolah_models::accounts::Role] = &[$($role),+];
        }

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = sekolah_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user = <$crate::middleware::auth::AuthUser as axum::extract::FromRequestParts<
                    $crate::state::AppState,
                >>::from_request_parts(parts, state)
                .await?;

                if !auth_user.has_any_role(Self::ROLES) {
                    return Err(sekolah_core::AppError::forbidden(anyhow::anyhow!(
                        "Access denied. Required role: {}",
                        $crate::middleware::role::describe_roles(Self::ROLES)
                    )));
                }

                Ok($name(auth_user))
            }
        }
    };
}

require_roles!(RequireAdmin, [Role::Admin]);
require_roles!(RequireStaff, [Role::Admin, Role::Teacher]);
require_roles!(RequireTeacher, [Role::Teacher]);
require_roles!(RequireStudent, [Role::Student]);

/// `"ADMIN or TEACHER"` style list for error messages.
pub fn describe_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(" or ")
}

pub fn is_admin(auth_user: &AuthUser) -> bool {
    auth_user.role() == Role::Admin
}
