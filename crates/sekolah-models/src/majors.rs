use chrono::{DateTime, Utc};
use sekolah_core::pagination::{PaginationMeta, PaginationParams};
use sekolah_core::serde::{deserialize_optional_from_str, deserialize_optional_search, deserialize_some};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::MajorId;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMajorDto {
    #[validate(length(min = 2, max = 10, message = "Major code must be 2 to 10 characters"))]
    #[schema(example = "TKJ")]
    pub code: String,
    #[validate(length(min = 3, message = "Major name must be at least 3 characters"))]
    #[schema(example = "Teknik Komputer dan Jaringan")]
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

/// Partial update. `description` and `image` accept `null` to clear them.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMajorDto {
    #[validate(length(min = 2, max = 10, message = "Major code must be 2 to 10 characters"))]
    pub code: Option<String>,
    #[validate(length(min = 3, message = "Major name must be at least 3 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub image: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MajorFilterParams {
    /// Case-insensitive match on code, name or description
    #[serde(default, deserialize_with = "deserialize_optional_search")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Rows that reference a major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MajorCounts {
    pub students: i64,
    pub classes: i64,
    pub subjects: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MajorResponse {
    pub id: MajorId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub counts: MajorCounts,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedMajorsResponse {
    pub data: Vec<MajorResponse>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_major_code_length() {
        let dto = CreateMajorDto {
            code: "T".to_string(),
            name: "Teknik".to_string(),
            description: None,
            image: None,
            is_active: None,
        };
        assert!(dto.validate().is_err());

        let dto = CreateMajorDto {
            code: "TKJ".to_string(),
            ..dto
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_update_major_explicit_null_clears_description() {
        let dto: UpdateMajorDto = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(dto.description, Some(None));
        assert_eq!(dto.image, None);
        assert!(dto.validate().is_ok());
    }
}
