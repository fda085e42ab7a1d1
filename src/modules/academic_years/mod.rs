//! Academic years module.
//!
//! Years are labelled `YYYY/YYYY` and split into a GANJIL and a GENAP
//! semester. At most one year is active at a time; activation is done here
//! rather than by a database constraint.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::init_academic_years_router;
