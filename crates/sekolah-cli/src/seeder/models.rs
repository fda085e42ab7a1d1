//! Seed configuration and the rows the seeder inserts.

use chrono::NaiveDate;
use sekolah_models::accounts::Gender;
use sekolah_models::ids::{ClassId, MajorId};

/// Configuration for a full seeding run.
#[derive(Clone)]
pub struct SeedConfig {
    /// Password for the seeded admin and every fake student
    pub admin_password: String,
    pub students_per_class: usize,
}

impl SeedConfig {
    pub fn new(admin_password: impl Into<String>) -> Self {
        Self {
            admin_password: admin_password.into(),
            students_per_class: 0,
        }
    }

    pub fn with_students_per_class(mut self, students_per_class: usize) -> Self {
        self.students_per_class = students_per_class;
        self
    }
}

pub struct MajorSeed {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub struct SubjectSeed {
    pub code: &'static str,
    pub name: &'static str,
    /// `None` for subjects taught in every major
    pub major_code: Option<&'static str>,
    pub credits: i32,
}

/// A seeded major as stored.
#[derive(Clone, Debug)]
pub struct SeededMajor {
    pub id: MajorId,
    pub code: String,
}

/// A seeded class with the major its students belong to.
#[derive(Clone, Copy, Debug)]
pub struct SeededClass {
    pub id: ClassId,
    pub major_id: MajorId,
    pub grade: i16,
}

pub struct StudentSeed {
    pub password_hash: String,
    pub email: String,
    pub name: String,
    pub nis: String,
    pub nisn: String,
    pub class_id: ClassId,
    pub major_id: MajorId,
    pub date_of_birth: NaiveDate,
    pub place_of_birth: String,
    pub gender: Gender,
    pub address: String,
    pub enrollment_year: i32,
}
