//! # Sekolah Models
//!
//! Domain models and DTOs for the Sekolah API.
//!
//! This crate provides the data structures shared by the HTTP layer and the
//! administrative CLI: database row types, request/response DTOs and their
//! validation rules.
//!
//! # Modules
//!
//! - [`ids`]: Typed UUID newtypes for every table
//! - [`accounts`]: Accounts, roles and genders
//! - [`auth`]: Registration, login and session shapes
//! - [`academic_years`]: Academic years and semesters
//! - [`majors`]: Majors (vocational programmes)
//! - [`subjects`]: Subjects
//! - [`classes`]: Classes and class rosters
//! - [`students`]: Student profiles
//! - [`teachers`]: Teacher profiles
//! - [`summaries`]: Compact related-entity views embedded in responses
//!
//! # Example
//!
//! ```ignore
//! use sekolah_models::auth::{RegisterRequest, UserProfile};
//! use sekolah_models::accounts::Role;
//!
//! let request = RegisterRequest::Admin(dto);
//! assert_eq!(request.role(), Role::Admin);
//! ```

pub mod academic_years;
pub mod accounts;
pub mod auth;
pub mod classes;
pub mod ids;
pub mod majors;
pub mod students;
pub mod subjects;
pub mod summaries;
pub mod teachers;

pub use accounts::{Account, Gender, Role};

pub use auth::{
    AdminProfile, LoginRequest, LoginResponse, MessageResponse, ParentProfile,
    RegisterAdminDto, RegisterParentDto, RegisterRequest, RegisterResponse, RegisterStudentDto,
    RegisterTeacherDto, SessionResponse, UserProfile,
};

pub use academic_years::{
    AcademicYearFilterParams, AcademicYearResponse, CreateAcademicYearDto, CreateSemesterDto,
    PaginatedAcademicYearsResponse, SemesterResponse, SemesterType,
};

pub use majors::{
    CreateMajorDto, MajorCounts, MajorFilterParams, MajorResponse, PaginatedMajorsResponse,
    UpdateMajorDto,
};

pub use subjects::{
    CreateSubjectDto, PaginatedSubjectsResponse, SubjectCounts, SubjectFilterParams,
    SubjectResponse, UpdateSubjectDto,
};

pub use classes::{
    ClassCounts, ClassFilterParams, ClassResponse, CreateClassDto, PaginatedClassesResponse,
    RosterEntry, UpdateClassDto, default_class_name,
};

pub use students::{
    PaginatedStudentsResponse, StudentFilterParams, StudentResponse, UpdateStudentDto,
};

pub use teachers::{
    PaginatedTeachersResponse, TeacherCounts, TeacherFilterParams, TeacherResponse,
    UpdateTeacherDto,
};

pub use summaries::{
    AcademicYearSummary, ClassSummary, MajorSummary, ParentSummary, TeacherSummary, UserSummary,
};
