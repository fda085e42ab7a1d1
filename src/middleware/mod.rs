//! Request extractors for authentication and role checks.
//!
//! # Authentication Flow
//!
//! 1. Client sends `Authorization: Bearer <token>` (a bare token also works)
//! 2. [`auth::AuthUser`] hashes the token and looks up a live session
//! 3. Role extractors from [`role`] check the session's role
//! 4. Handler executes if all checks pass
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//! use crate::middleware::role::RequireAdmin;
//!
//! async fn me(auth_user: AuthUser) -> impl IntoResponse { /* any session */ }
//!
//! async fn create_major(RequireAdmin(auth_user): RequireAdmin) -> impl IntoResponse {
//!     // only ADMIN sessions reach this point
//! }
//! ```

pub mod auth;
pub mod role;
