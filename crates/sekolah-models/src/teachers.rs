use chrono::{DateTime, NaiveDate, Utc};
use sekolah_core::pagination::{PaginationMeta, PaginationParams};
use sekolah_core::serde::{deserialize_optional_from_str, deserialize_optional_search, deserialize_some};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::accounts::{Account, Gender};
use crate::ids::{TeacherId, UserId};

/// Teaching records attached to a teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherCounts {
    pub schedules: i64,
    pub assignments: i64,
    pub grades: i64,
    pub homeroom_classes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherResponse {
    pub id: TeacherId,
    pub user_id: UserId,
    pub nip: String,
    pub date_of_birth: NaiveDate,
    pub place_of_birth: String,
    pub gender: Gender,
    pub address: String,
    pub phone: String,
    pub specialization: Option<String>,
    pub hire_date: NaiveDate,
    pub photo: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: Account,
    pub counts: TeacherCounts,
}

/// Partial update of a teacher profile. NIP is immutable.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeacherDto {
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(min = 2, message = "Place of birth must be at least 2 characters"))]
    pub place_of_birth: Option<String>,
    pub gender: Option<Gender>,
    #[validate(length(min = 5, message = "Address must be at least 5 characters"))]
    pub address: Option<String>,
    #[validate(length(min = 8, message = "Phone number must be at least 8 characters"))]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub specialization: Option<Option<String>>,
    pub hire_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub photo: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TeacherFilterParams {
    /// Case-insensitive match on NIP, name or email
    #[serde(default, deserialize_with = "deserialize_optional_search")]
    pub search: Option<String>,
    /// Case-insensitive substring of the specialization
    #[serde(default, deserialize_with = "deserialize_optional_search")]
    pub specialization: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedTeachersResponse {
    pub data: Vec<TeacherResponse>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_rejects_short_phone() {
        let dto: UpdateTeacherDto = serde_json::from_str(r#"{"phone":"0812"}"#).unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("phone"));
    }

    #[test]
    fn test_update_clears_specialization() {
        let dto: UpdateTeacherDto =
            serde_json::from_str(r#"{"specialization":null,"hireDate":"2020-07-13"}"#).unwrap();
        assert_eq!(dto.specialization, Some(None));
        assert_eq!(dto.hire_date, NaiveDate::from_ymd_opt(2020, 7, 13));
    }
}
