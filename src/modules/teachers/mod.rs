//! Teachers module.
//!
//! Teacher profiles are created through registration. This module lists,
//! reads, updates and deactivates them; teachers are never hard-deleted.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::init_teachers_router;
