//! Compact views of related entities embedded in responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ids::{AcademicYearId, ClassId, MajorId, ParentId, TeacherId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MajorSummary {
    pub id: MajorId,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcademicYearSummary {
    pub id: AcademicYearId,
    pub year: String,
    pub is_active: bool,
}

/// Homeroom teacher shown on a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSummary {
    pub id: TeacherId,
    pub nip: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub id: ClassId,
    pub name: String,
    pub grade: i16,
    pub section: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParentSummary {
    pub id: ParentId,
    pub nik: String,
    pub name: String,
    pub email: String,
}

/// Account fields shown on roster entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}
