use chrono::{DateTime, Utc};
use sekolah_core::pagination::{PaginationMeta, PaginationParams};
use sekolah_core::serde::{deserialize_optional_from_str, deserialize_optional_search, deserialize_some};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{MajorId, SubjectId};
use crate::summaries::MajorSummary;

pub const DEFAULT_CREDITS: i32 = 2;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubjectDto {
    #[validate(length(min = 2, max = 20, message = "Subject code must be 2 to 20 characters"))]
    #[schema(example = "MTK")]
    pub code: String,
    #[validate(length(min = 3, message = "Subject name must be at least 3 characters"))]
    #[schema(example = "Matematika")]
    pub name: String,
    pub description: Option<String>,
    /// Owning major; omit for subjects shared by every major
    pub major_id: Option<MajorId>,
    pub is_core: Option<bool>,
    #[validate(range(min = 1, max = 8, message = "Credits must be between 1 and 8"))]
    pub credits: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubjectDto {
    #[validate(length(min = 2, max = 20, message = "Subject code must be 2 to 20 characters"))]
    pub code: Option<String>,
    #[validate(length(min = 3, message = "Subject name must be at least 3 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    /// `null` detaches the subject from its major
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<MajorId>)]
    pub major_id: Option<Option<MajorId>>,
    pub is_core: Option<bool>,
    #[validate(range(min = 1, max = 8, message = "Credits must be between 1 and 8"))]
    pub credits: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SubjectFilterParams {
    /// Case-insensitive match on code, name or description
    #[serde(default, deserialize_with = "deserialize_optional_search")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub major_id: Option<MajorId>,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub is_core: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SubjectCounts {
    pub schedules: i64,
    pub assignments: i64,
    pub grades: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResponse {
    pub id: SubjectId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub major_id: Option<MajorId>,
    pub is_core: bool,
    pub credits: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub major: Option<MajorSummary>,
    pub counts: SubjectCounts,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedSubjectsResponse {
    pub data: Vec<SubjectResponse>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credits_out_of_range() {
        let dto: CreateSubjectDto =
            serde_json::from_str(r#"{"code":"MTK","name":"Matematika","credits":9}"#).unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("credits"));
    }

    #[test]
    fn test_update_can_detach_major() {
        let dto: UpdateSubjectDto = serde_json::from_str(r#"{"majorId":null}"#).unwrap();
        assert_eq!(dto.major_id, Some(None));
    }
}
