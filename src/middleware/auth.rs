use anyhow::anyhow;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::{DateTime, Utc};

use sekolah_core::AppError;
use sekolah_models::accounts::{Account, Role};
use sekolah_models::ids::UserId;

use crate::modules::auth::service::AuthService;
use crate::state::AppState;

/// Extracts the raw session token from the `Authorization` header.
///
/// Accepts `Bearer <token>` as well as a bare token. Does not check the
/// token against the store.
#[derive(Clone)]
pub struct BearerToken(pub String);

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(..)")
    }
}

/// Returns the token part of an `Authorization` header value.
pub fn parse_authorization(value: &str) -> Option<&str> {
    let value = value.trim();
    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        Some(_) => return None,
        None if value.eq_ignore_ascii_case("bearer") => return None,
        None => value,
    };
    (!token.is_empty()).then_some(token)
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized(anyhow!("Missing authorization header")))?;

        let token = parse_authorization(header_value).ok_or_else(|| {
            AppError::unauthorized(anyhow!("Invalid authorization header format"))
        })?;

        Ok(BearerToken(token.to_string()))
    }
}

/// The account behind a live session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account: Account,
    pub expires_at: DateTime<Utc>,
}

impl AuthUser {
    pub fn user_id(&self) -> UserId {
        self.account.id
    }

    pub fn role(&self) -> Role {
        self.account.role
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.account.role)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

        let (account, expires_at) = AuthService::validate_session(&state.db, &token)
            .await?
            .ok_or_else(|| AppError::unauthorized(anyhow!("Invalid or expired session")))?;

        Ok(AuthUser {
            account,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer_header() {
        assert_eq!(parse_authorization("Bearer abc123"), Some("abc123"));
        assert_eq!(parse_authorization("bearer abc123"), Some("abc123"));
        assert_eq!(parse_authorization("  Bearer   abc123 "), Some("abc123"));
    }

    #[test]
    fn test_parse_bare_token() {
        assert_eq!(parse_authorization("abc123"), Some("abc123"));
    }

    #[test]
    fn test_parse_rejects_other_schemes_and_blank_values() {
        assert_eq!(parse_authorization("Basic dXNlcjpwYXNz"), None);
        assert_eq!(parse_authorization(""), None);
        assert_eq!(parse_authorization("Bearer "), None);
    }
}
