use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use sekolah_core::AppError;

/// JSON body extractor that runs `validator` rules before the handler.
///
/// Malformed bodies and failed rules are both rejected with 400. Whenever
/// the offending field is known it is reported under `fields`, so a missing
/// `nis` and a too-short `nis` look the same to a client.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(reject_body)?;

        value.validate().map_err(AppError::validation)?;

        Ok(ValidatedJson(value))
    }
}

fn reject_body(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::bad_request(anyhow!("Expected a JSON body (Content-Type: application/json)"))
        }
        JsonRejection::JsonSyntaxError(_) => AppError::bad_request(anyhow!("Malformed JSON body")),
        JsonRejection::JsonDataError(err) => match field_problem(&err.body_text()) {
            Some(problem) => {
                AppError::invalid_field(&problem.field, problem.code, problem.message())
            }
            None => AppError::bad_request(anyhow!("Request body has the wrong shape")),
        },
        other => AppError::bad_request(anyhow!("{}", other.body_text())),
    }
}

#[derive(Debug, PartialEq, Eq)]
struct FieldProblem {
    field: String,
    code: &'static str,
}

impl FieldProblem {
    fn message(&self) -> String {
        match self.code {
            "required" => format!("{} is required", self.field),
            _ => format!("{} has an invalid value", self.field),
        }
    }
}

/// Recovers the field name from a serde data error.
///
/// Type and enum errors are prefixed with the field path (`gender: unknown
/// variant ...`); a missing field is only named inside backticks.
fn field_problem(text: &str) -> Option<FieldProblem> {
    let detail = text
        .split_once("target type: ")
        .map_or(text, |(_, detail)| detail);

    if let Some(rest) = detail.split("missing field `").nth(1) {
        let field = rest.split('`').next()?;
        return Some(FieldProblem {
            field: field.to_string(),
            code: "required",
        });
    }

    let (path, _) = detail.split_once(": ")?;
    if path.is_empty() || path == "." || path.contains(' ') {
        return None;
    }
    Some(FieldProblem {
        field: path.to_string(),
        code: "invalid",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_is_required() {
        let problem = field_problem(
            "Failed to deserialize the JSON body into the target type: missing field `nisn` at line 1 column 42",
        )
        .unwrap();
        assert_eq!(problem.field, "nisn");
        assert_eq!(problem.message(), "nisn is required");
    }

    #[test]
    fn test_wrong_type_names_the_path() {
        let problem = field_problem(
            "Failed to deserialize the JSON body into the target type: gender: unknown variant `L`, expected `MALE` or `FEMALE` at line 1 column 20",
        )
        .unwrap();
        assert_eq!(
            problem,
            FieldProblem {
                field: "gender".to_string(),
                code: "invalid"
            }
        );
        assert_eq!(problem.message(), "gender has an invalid value");
    }

    #[test]
    fn test_top_level_errors_have_no_field() {
        assert_eq!(
            field_problem(
                "Failed to deserialize the JSON body into the target type: invalid type: integer `3`, expected struct LoginRequest at line 1 column 1"
            ),
            None
        );
    }
}
