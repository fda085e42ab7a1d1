use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// A single failed validation rule for one request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub code: String,
    pub message: String,
}

/// Structured payload attached to some errors in addition to the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetails {
    /// Every field that failed validation, sorted by field name.
    Fields(Vec<FieldError>),
    /// Rows that still reference the target of a rejected delete, per kind.
    Dependents(Vec<(&'static str, i64)>),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub details: Option<ErrorDetails>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            details: None,
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::CONFLICT, err)
    }

    pub fn unauthorized<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNAUTHORIZED, err)
    }

    pub fn forbidden<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::FORBIDDEN, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    /// 400 carrying one [`FieldError`] per failed rule.
    pub fn validation(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                let field = field.to_string();
                errors.iter().map(move |error| FieldError {
                    field: field.clone(),
                    code: error.code.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));

        let summary = fields
            .iter()
            .map(|f| f.message.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::anyhow!("Validation failed: {}", summary),
            details: Some(ErrorDetails::Fields(fields)),
        }
    }

    /// 400 for a single field that could not be read from the body.
    pub fn invalid_field(field: &str, code: &str, message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::anyhow!("Validation failed: {}", message),
            details: Some(ErrorDetails::Fields(vec![FieldError {
                field: field.to_string(),
                code: code.to_string(),
                message,
            }])),
        }
    }

    /// 409 for a delete blocked by rows that still reference the target.
    ///
    /// `dependents` lists each referencing kind with its row count; kinds
    /// with a zero count are left out of the message.
    pub fn dependency_conflict(entity: &str, dependents: Vec<(&'static str, i64)>) -> Self {
        let blocking = dependents
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(kind, count)| format!("{} {}", count, kind))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            status: StatusCode::CONFLICT,
            error: anyhow::anyhow!(
                "Cannot delete {}: it is still referenced by {}",
                entity,
                blocking
            ),
            details: Some(ErrorDetails::Dependents(dependents)),
        }
    }

    /// Total number of blocking rows for a dependency conflict.
    pub fn dependents_total(&self) -> Option<i64> {
        match &self.details {
            Some(ErrorDetails::Dependents(dependents)) => {
                Some(dependents.iter().map(|(_, count)| count).sum())
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = ?self.error, "Request failed");
            "Internal server error".to_string()
        } else {
            self.error.to_string()
        };

        let mut body = json!({ "error": message });

        match &self.details {
            Some(ErrorDetails::Fields(fields)) => {
                body["fields"] = json!(fields);
            }
            Some(ErrorDetails::Dependents(dependents)) => {
                let counts: serde_json::Map<String, serde_json::Value> = dependents
                    .iter()
                    .map(|(kind, count)| (kind.to_string(), json!(count)))
                    .collect();
                body["dependents"] = serde_json::Value::Object(counts);
                body["totalDependents"] = json!(self.dependents_total().unwrap_or(0));
            }
            None => {}
        }

        (self.status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "name must be at least 3 characters"))]
        name: String,
        #[validate(range(min = 1, max = 8))]
        credits: i32,
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_constructor_statuses() {
        assert_eq!(
            AppError::not_found(anyhow::anyhow!("x")).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::conflict(anyhow::anyhow!("x")).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::unauthorized(anyhow::anyhow!("x")).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::forbidden(anyhow::anyhow!("x")).status,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::bad_request(anyhow::anyhow!("x")).status,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_validation_collects_every_field() {
        let sample = Sample {
            name: "ab".to_string(),
            credits: 12,
        };
        let err = AppError::validation(sample.validate().unwrap_err());

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        match err.details {
            Some(ErrorDetails::Fields(fields)) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].field, "credits");
                assert_eq!(fields[0].code, "range");
                assert_eq!(fields[1].field, "name");
                assert_eq!(fields[1].message, "name must be at least 3 characters");
            }
            other => panic!("unexpected details: {:?}", other),
        }
    }

    #[test]
    fn test_dependency_conflict_total_and_message() {
        let err = AppError::dependency_conflict("major", vec![("students", 3), ("classes", 0)]);

        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.dependents_total(), Some(3));
        assert_eq!(
            err.error.to_string(),
            "Cannot delete major: it is still referenced by 3 students"
        );
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let response = AppError::internal(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_dependency_conflict_body() {
        let response =
            AppError::dependency_conflict("class", vec![("students", 2), ("schedules", 1)])
                .into_response();
        let body = body_json(response).await;

        assert_eq!(body["dependents"]["students"], 2);
        assert_eq!(body["dependents"]["schedules"], 1);
        assert_eq!(body["totalDependents"], 3);
    }
}
