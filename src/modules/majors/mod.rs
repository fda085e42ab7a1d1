//! Majors module.
//!
//! Vocational programmes (TKJ, RPL, ...). Classes and students belong to a
//! major; subjects may.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::init_majors_router;
