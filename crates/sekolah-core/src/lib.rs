//! # Sekolah Core
//!
//! Core types, errors, and utilities for the Sekolah API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Page-based pagination parameters and metadata
//! - [`password`]: Password hashing and verification
//! - [`token`]: Opaque session token generation and digests
//! - [`serde`]: Deserialization helpers for query strings and partial updates
//!
//! # Example
//!
//! ```ignore
//! use sekolah_core::errors::AppError;
//! use sekolah_core::pagination::{PaginationParams, PaginationMeta};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Major not found"));
//!
//! let params = PaginationParams::default();
//! let meta = PaginationMeta::new(42, &params);
//! assert_eq!(meta.total_pages, 5);
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod serde;
pub mod token;

pub use errors::{AppError, ErrorDetails, FieldError};
pub use pagination::{PaginationMeta, PaginationParams, contains_pattern};
pub use password::{hash_password, verify_password};
pub use token::{SessionToken, hash_session_token};
