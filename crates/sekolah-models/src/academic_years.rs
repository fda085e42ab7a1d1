use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use sekolah_core::pagination::{PaginationMeta, PaginationParams};
use sekolah_core::serde::deserialize_optional_from_str;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::ids::{AcademicYearId, SemesterId};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "semester_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SemesterType {
    /// Odd (first) semester
    Ganjil,
    /// Even (second) semester
    Genap,
}

impl SemesterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemesterType::Ganjil => "GANJIL",
            SemesterType::Genap => "GENAP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SemesterResponse {
    pub id: SemesterId,
    pub academic_year_id: AcademicYearId,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub semester_type: SemesterType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcademicYearResponse {
    pub id: AcademicYearId,
    #[schema(example = "2024/2025")]
    pub year: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Ordered by start date
    #[sqlx(skip)]
    pub semesters: Vec<SemesterResponse>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAcademicYearDto {
    #[validate(custom(function = "validate_year_label"))]
    #[schema(example = "2024/2025")]
    pub year: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Activating a new year deactivates every other year
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSemesterDto {
    #[serde(rename = "type")]
    pub semester_type: SemesterType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AcademicYearFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedAcademicYearsResponse {
    pub data: Vec<AcademicYearResponse>,
    pub meta: PaginationMeta,
}

/// Accepts labels of the form `YYYY/YYYY` where the second year follows the
/// first.
pub fn validate_year_label(label: &str) -> Result<(), ValidationError> {
    let invalid = || {
        ValidationError::new("year_label").with_message(Cow::Borrowed(
            "Academic year must look like 2024/2025 with consecutive years",
        ))
    };

    let (first, second) = label.split_once('/').ok_or_else(invalid)?;
    let is_year = |s: &str| s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit());
    if !is_year(first) || !is_year(second) {
        return Err(invalid());
    }
    let first: u16 = first.parse().map_err(|_| invalid())?;
    let second: u16 = second.parse().map_err(|_| invalid())?;
    if first.checked_add(1) != Some(second) {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_label() {
        assert!(validate_year_label("2024/2025").is_ok());
        assert!(validate_year_label("2024/2026").is_err());
        assert!(validate_year_label("2024-2025").is_err());
        assert!(validate_year_label("24/25").is_err());
        assert!(validate_year_label("abcd/efgh").is_err());
    }

    #[test]
    fn test_create_semester_reads_type_field() {
        let dto: CreateSemesterDto = serde_json::from_str(
            r#"{"type":"GENAP","startDate":"2025-01-06","endDate":"2025-06-20"}"#,
        )
        .unwrap();
        assert_eq!(dto.semester_type, SemesterType::Genap);
        assert_eq!(dto.is_active, None);
    }

    #[test]
    fn test_create_year_reports_label_field() {
        let dto: CreateAcademicYearDto = serde_json::from_str(
            r#"{"year":"2024","startDate":"2024-07-15","endDate":"2025-06-30"}"#,
        )
        .unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("year"));
    }
}
