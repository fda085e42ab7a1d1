//! Students module.
//!
//! Student profiles are created through registration. Staff list, read and
//! update them here; deleting a student only deactivates the profile so it
//! drops out of class rosters while remaining resolvable by id.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::init_students_router;
