//! # Sekolah Config
//!
//! Configuration types for the Sekolah API, loaded from environment variables:
//!
//! - [`server`]: bind address for the HTTP listener
//! - [`database`]: PostgreSQL connection pool settings
//! - [`session`]: session lifetime
//! - [`cors`]: CORS allowed origins
//!
//! Every config exposes `from_env()` plus `from_lookup()`, which takes any
//! `Fn(&str) -> Option<String>` so parsing can be tested without touching the
//! process environment.
//!
//! # Example
//!
//! ```ignore
//! use sekolah_config::{CorsConfig, DatabaseConfig, ServerConfig, SessionConfig};
//!
//! let server = ServerConfig::from_env();
//! let database = DatabaseConfig::from_env()?;
//! let session = SessionConfig::from_env();
//! let cors = CorsConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod server;
pub mod session;

pub use cors::CorsConfig;
pub use database::{DatabaseConfig, MissingDatabaseUrl};
pub use server::ServerConfig;
pub use session::SessionConfig;

/// Parses `key` with [`std::str::FromStr`], falling back to `default` when it
/// is unset or malformed.
pub(crate) fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// Reads a boolean flag; `false`, `0` and `no` (any case) turn it off.
pub(crate) fn flag_or<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            let value = value.trim().to_lowercase();
            !(value == "false" || value == "0" || value == "no")
        })
        .unwrap_or(default)
}
