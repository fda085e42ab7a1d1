//! Registration, login and session DTOs.
//!
//! Each role registers through its own request shape. The shapes repeat the
//! account fields (`email`, `password`, `name`, `image`) so validation errors
//! are reported against flat field names. [`RegisterRequest`] unifies them for
//! the service layer and [`UserProfile`] is the matching tagged response.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::accounts::{Account, Gender, Role};
use crate::ids::{AdminId, ClassId, MajorId, ParentId, UserId};
use crate::students::StudentResponse;
use crate::teachers::TeacherResponse;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStudentDto {
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "siswa@sekolah.sch.id")]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    pub image: Option<String>,
    #[validate(length(min = 1, max = 20, message = "NIS must be 1 to 20 characters"))]
    pub nis: String,
    #[validate(length(equal = 10, message = "NISN must be exactly 10 characters"))]
    pub nisn: String,
    pub major_id: MajorId,
    pub class_id: Option<ClassId>,
    pub parent_id: Option<ParentId>,
    pub date_of_birth: NaiveDate,
    #[validate(length(min = 2, message = "Place of birth must be at least 2 characters"))]
    pub place_of_birth: String,
    pub gender: Gender,
    #[validate(length(min = 5, message = "Address must be at least 5 characters"))]
    pub address: String,
    #[validate(length(min = 8, message = "Phone number must be at least 8 characters"))]
    pub phone: Option<String>,
    /// Defaults to the current year
    pub enrollment_year: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTeacherDto {
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "guru@sekolah.sch.id")]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    pub image: Option<String>,
    #[validate(length(min = 1, max = 30, message = "NIP must be 1 to 30 characters"))]
    pub nip: String,
    pub date_of_birth: NaiveDate,
    #[validate(length(min = 2, message = "Place of birth must be at least 2 characters"))]
    pub place_of_birth: String,
    pub gender: Gender,
    #[validate(length(min = 5, message = "Address must be at least 5 characters"))]
    pub address: String,
    #[validate(length(min = 8, message = "Phone number must be at least 8 characters"))]
    pub phone: String,
    pub specialization: Option<String>,
    pub hire_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterParentDto {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    pub image: Option<String>,
    #[validate(length(equal = 16, message = "NIK must be exactly 16 characters"))]
    pub nik: String,
    pub occupation: Option<String>,
    #[validate(length(min = 8, message = "Phone number must be at least 8 characters"))]
    pub phone: String,
    #[validate(length(min = 5, message = "Address must be at least 5 characters"))]
    pub address: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAdminDto {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    pub image: Option<String>,
    #[validate(length(min = 1, max = 30, message = "NIP must be 1 to 30 characters"))]
    pub nip: Option<String>,
    pub position: Option<String>,
    #[validate(length(min = 8, message = "Phone number must be at least 8 characters"))]
    pub phone: Option<String>,
}

/// A registration for any of the four roles.
#[derive(Debug, Clone)]
pub enum RegisterRequest {
    Student(RegisterStudentDto),
    Teacher(RegisterTeacherDto),
    Parent(RegisterParentDto),
    Admin(RegisterAdminDto),
}

impl RegisterRequest {
    pub fn role(&self) -> Role {
        match self {
            RegisterRequest::Student(_) => Role::Student,
            RegisterRequest::Teacher(_) => Role::Teacher,
            RegisterRequest::Parent(_) => Role::Parent,
            RegisterRequest::Admin(_) => Role::Admin,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            RegisterRequest::Student(dto) => &dto.email,
            RegisterRequest::Teacher(dto) => &dto.email,
            RegisterRequest::Parent(dto) => &dto.email,
            RegisterRequest::Admin(dto) => &dto.email,
        }
    }

    pub fn password(&self) -> &str {
        match self {
            RegisterRequest::Student(dto) => &dto.password,
            RegisterRequest::Teacher(dto) => &dto.password,
            RegisterRequest::Parent(dto) => &dto.password,
            RegisterRequest::Admin(dto) => &dto.password,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RegisterRequest::Student(dto) => &dto.name,
            RegisterRequest::Teacher(dto) => &dto.name,
            RegisterRequest::Parent(dto) => &dto.name,
            RegisterRequest::Admin(dto) => &dto.name,
        }
    }

    pub fn image(&self) -> Option<&str> {
        match self {
            RegisterRequest::Student(dto) => dto.image.as_deref(),
            RegisterRequest::Teacher(dto) => dto.image.as_deref(),
            RegisterRequest::Parent(dto) => dto.image.as_deref(),
            RegisterRequest::Admin(dto) => dto.image.as_deref(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            RegisterRequest::Student(dto) => dto.validate(),
            RegisterRequest::Teacher(dto) => dto.validate(),
            RegisterRequest::Parent(dto) => dto.validate(),
            RegisterRequest::Admin(dto) => dto.validate(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "password123")]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParentProfile {
    pub id: ParentId,
    pub user_id: UserId,
    pub nik: String,
    pub occupation: Option<String>,
    pub phone: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: Account,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: AdminId,
    pub user_id: UserId,
    pub nip: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: Account,
}

/// The role-specific profile of an account, tagged with its role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserProfile {
    Student(StudentResponse),
    Teacher(TeacherResponse),
    Parent(ParentProfile),
    Admin(AdminProfile),
}

impl UserProfile {
    pub fn account(&self) -> &Account {
        match self {
            UserProfile::Student(profile) => &profile.user,
            UserProfile::Teacher(profile) => &profile.user,
            UserProfile::Parent(profile) => &profile.user,
            UserProfile::Admin(profile) => &profile.user,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user: UserProfile,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserProfile,
    /// Opaque bearer token; shown only once
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: Account,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent_dto() -> RegisterParentDto {
        RegisterParentDto {
            email: "wali@example.com".to_string(),
            password: "rahasia123".to_string(),
            name: "Budi Santoso".to_string(),
            image: None,
            nik: "3201010101010001".to_string(),
            occupation: Some("Wiraswasta".to_string()),
            phone: "081234567890".to_string(),
            address: "Jl. Merdeka No. 1".to_string(),
        }
    }

    #[test]
    fn test_register_request_accessors() {
        let request = RegisterRequest::Parent(parent_dto());
        assert_eq!(request.role(), Role::Parent);
        assert_eq!(request.email(), "wali@example.com");
        assert_eq!(request.name(), "Budi Santoso");
        assert_eq!(request.image(), None);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_register_request_reports_flat_field_names() {
        let request = RegisterRequest::Parent(RegisterParentDto {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            nik: "123".to_string(),
            ..parent_dto()
        });
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("nik"));
    }

    #[test]
    fn test_login_request_requires_password() {
        let request = LoginRequest {
            email: "admin@sekolah.sch.id".to_string(),
            password: String::new(),
        };
        assert!(request.validate().is_err());
    }
}
