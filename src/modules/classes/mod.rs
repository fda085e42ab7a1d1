//! Classes module.
//!
//! A class is one section of a grade (10 to 12) within a major for an
//! academic year, e.g. "10 TKJ 1". It has an optional homeroom teacher and a
//! capacity that limits how many active students it holds.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::init_classes_router;
