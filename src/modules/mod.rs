pub mod academic_years;
pub mod accounts;
pub mod auth;
pub mod classes;
pub mod lookup;
pub mod majors;
pub mod students;
pub mod subjects;
pub mod teachers;
