use chrono::{DateTime, NaiveDate, Utc};
use sekolah_core::pagination::{PaginationMeta, PaginationParams};
use sekolah_core::serde::{deserialize_optional_from_str, deserialize_optional_search, deserialize_some};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::accounts::{Account, Gender};
use crate::ids::{ClassId, MajorId, ParentId, StudentId, UserId};
use crate::summaries::{ClassSummary, MajorSummary, ParentSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    pub id: StudentId,
    pub user_id: UserId,
    pub nis: String,
    pub nisn: String,
    pub class_id: Option<ClassId>,
    pub major_id: MajorId,
    pub parent_id: Option<ParentId>,
    pub date_of_birth: NaiveDate,
    pub place_of_birth: String,
    pub gender: Gender,
    pub address: String,
    pub phone: Option<String>,
    pub photo: Option<String>,
    pub enrollment_year: i32,
    pub graduation_year: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: Account,
    pub class: Option<ClassSummary>,
    pub major: MajorSummary,
    pub parent: Option<ParentSummary>,
}

/// Partial update of a student profile. NIS and NISN are immutable.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentDto {
    /// `null` removes the student from their class
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<ClassId>)]
    pub class_id: Option<Option<ClassId>>,
    pub major_id: Option<MajorId>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<ParentId>)]
    pub parent_id: Option<Option<ParentId>>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(min = 2, message = "Place of birth must be at least 2 characters"))]
    pub place_of_birth: Option<String>,
    pub gender: Option<Gender>,
    #[validate(length(min = 5, message = "Address must be at least 5 characters"))]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub photo: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<i32>)]
    pub graduation_year: Option<Option<i32>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StudentFilterParams {
    /// Case-insensitive match on NIS, NISN, name or email
    #[serde(default, deserialize_with = "deserialize_optional_search")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub class_id: Option<ClassId>,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub major_id: Option<MajorId>,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub enrollment_year: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedStudentsResponse {
    pub data: Vec<StudentResponse>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let dto: UpdateStudentDto =
            serde_json::from_str(r#"{"classId":null,"isActive":false}"#).unwrap();
        assert_eq!(dto.class_id, Some(None));
        assert_eq!(dto.parent_id, None);
        assert_eq!(dto.is_active, Some(false));
    }

    #[test]
    fn test_filter_params_parse_from_query_strings() {
        let params: StudentFilterParams = serde_json::from_value(serde_json::json!({
            "enrollmentYear": "2024",
            "isActive": "true",
            "search": "  ",
            "page": "2",
        }))
        .unwrap();
        assert_eq!(params.enrollment_year, Some(2024));
        assert_eq!(params.is_active, Some(true));
        assert_eq!(params.search, None);
        assert_eq!(params.pagination.page(), 2);
    }
}
