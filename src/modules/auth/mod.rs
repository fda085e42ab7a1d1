//! Authentication module.
//!
//! Registration for the four roles, password login issuing opaque session
//! tokens, logout, and the session and profile lookups behind `/auth/me`.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::init_auth_router;
