use chrono::{DateTime, Utc};
use sekolah_core::pagination::{PaginationMeta, PaginationParams};
use sekolah_core::serde::{deserialize_optional_from_str, deserialize_optional_search, deserialize_some};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::accounts::Gender;
use crate::ids::{AcademicYearId, ClassId, MajorId, StudentId, TeacherId};
use crate::summaries::{AcademicYearSummary, MajorSummary, TeacherSummary, UserSummary};

pub const DEFAULT_MAX_STUDENTS: i32 = 36;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassDto {
    pub academic_year_id: AcademicYearId,
    pub major_id: MajorId,
    #[validate(range(min = 10, max = 12, message = "Grade must be between 10 and 12"))]
    #[schema(example = 10)]
    pub grade: i16,
    #[validate(length(min = 1, max = 10, message = "Section must be 1 to 10 characters"))]
    #[schema(example = "1")]
    pub section: String,
    /// Display name; defaults to "{grade} {major code} {section}"
    #[validate(length(min = 1, max = 50, message = "Class name must be 1 to 50 characters"))]
    pub name: Option<String>,
    pub homeroom_teacher_id: Option<TeacherId>,
    #[validate(range(min = 1, message = "A class must hold at least one student"))]
    pub max_students: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClassDto {
    pub academic_year_id: Option<AcademicYearId>,
    pub major_id: Option<MajorId>,
    #[validate(range(min = 10, max = 12, message = "Grade must be between 10 and 12"))]
    pub grade: Option<i16>,
    #[validate(length(min = 1, max = 10, message = "Section must be 1 to 10 characters"))]
    pub section: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Class name must be 1 to 50 characters"))]
    pub name: Option<String>,
    /// `null` removes the homeroom teacher
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<TeacherId>)]
    pub homeroom_teacher_id: Option<Option<TeacherId>>,
    #[validate(range(min = 1, message = "A class must hold at least one student"))]
    pub max_students: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateClassDto {
    /// Whether the update touches any column of the (year, major, grade,
    /// section) natural key.
    pub fn changes_natural_key(&self) -> bool {
        self.academic_year_id.is_some()
            || self.major_id.is_some()
            || self.grade.is_some()
            || self.section.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ClassFilterParams {
    /// Case-insensitive match on name or section
    #[serde(default, deserialize_with = "deserialize_optional_search")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub academic_year_id: Option<AcademicYearId>,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub major_id: Option<MajorId>,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub grade: Option<i16>,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClassCounts {
    pub students: i64,
    pub schedules: i64,
    pub assignments: i64,
    pub attendances: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassResponse {
    pub id: ClassId,
    pub academic_year_id: AcademicYearId,
    pub major_id: MajorId,
    pub grade: i16,
    pub section: String,
    pub name: String,
    pub homeroom_teacher_id: Option<TeacherId>,
    pub max_students: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub academic_year: AcademicYearSummary,
    pub major: MajorSummary,
    pub homeroom_teacher: Option<TeacherSummary>,
    pub counts: ClassCounts,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedClassesResponse {
    pub data: Vec<ClassResponse>,
    pub meta: PaginationMeta,
}

/// One active student on a class roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: StudentId,
    pub nis: String,
    pub nisn: String,
    pub gender: Gender,
    pub user: UserSummary,
    pub major: MajorSummary,
}

/// Default display name for a class, e.g. `"10 TKJ 1"`.
pub fn default_class_name(grade: i16, major_code: &str, section: &str) -> String {
    format!("{} {} {}", grade, major_code, section)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_class_name() {
        assert_eq!(default_class_name(11, "RPL", "2"), "11 RPL 2");
    }

    #[test]
    fn test_grade_outside_range_is_rejected() {
        let dto: CreateClassDto = serde_json::from_str(
            r#"{
                "academicYearId": "12345678-1234-1234-1234-123456789abc",
                "majorId": "12345678-1234-1234-1234-123456789abd",
                "grade": 9,
                "section": "1"
            }"#,
        )
        .unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("grade"));
    }

    #[test]
    fn test_changes_natural_key() {
        let dto = UpdateClassDto {
            name: Some("X TKJ A".to_string()),
            ..Default::default()
        };
        assert!(!dto.changes_natural_key());

        let dto = UpdateClassDto {
            section: Some("3".to_string()),
            ..Default::default()
        };
        assert!(dto.changes_natural_key());
    }
}
