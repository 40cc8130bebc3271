//! Error taxonomy for the numbering service and its mapping onto HTTP responses.

use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::validation::{ValidationError, ValidationErrors};
use crate::ErrorResponse;

/// Errors raised by counter and registry stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// Serialization failure or deadlock; safe to retry.
    #[error("concurrent update conflict: {0}")]
    Conflict(String),
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if matches!(db_err.code().as_deref(), Some("40001") | Some("40P01")) {
                return StoreError::Conflict(db_err.message().to_string());
            }
        }

        match err {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::TypeNotFound { .. } => StoreError::Corrupt(err.to_string()),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Errors surfaced by the numbering service to its callers.
#[derive(Debug, Error)]
pub enum NumberingError {
    #[error("missing required parameters: {}", .missing.join(", "))]
    MissingParameters {
        required: Vec<&'static str>,
        missing: Vec<&'static str>,
    },
    #[error("invalid parameter {field}: {message}")]
    InvalidParameter { field: &'static str, message: String },
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("{kind} '{code}' not found")]
    NotFound { kind: &'static str, code: String },
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("letter number store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),
    #[error("letter number issuance failed: {0}")]
    IssuanceFailed(#[source] StoreError),
}

impl NumberingError {
    pub fn document_type_not_found(code: &str) -> Self {
        NumberingError::NotFound {
            kind: "document type",
            code: code.to_string(),
        }
    }

    pub fn program_not_found(id: impl ToString) -> Self {
        NumberingError::NotFound {
            kind: "program",
            code: id.to_string(),
        }
    }

    /// Collect the names of required parameters that are absent or blank.
    pub fn check_required(
        params: &[(&'static str, Option<&str>)],
    ) -> Result<(), NumberingError> {
        let missing: Vec<&'static str> = params
            .iter()
            .filter(|(_, value)| value.map(|v| v.trim().is_empty()).unwrap_or(true))
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(NumberingError::MissingParameters {
                required: params.iter().map(|(name, _)| *name).collect(),
                missing,
            })
        }
    }
}

impl From<StoreError> for NumberingError {
    fn from(err: StoreError) -> Self {
        NumberingError::StoreUnavailable(err)
    }
}

/// 400 body for absent query or body parameters.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct MissingParametersResponse {
    pub error: String,
    pub message: String,
    #[schema(example = json!(["jenisSurat", "prodiKode", "prodiId"]))]
    pub required: Vec<String>,
    #[schema(example = json!(["prodiKode", "prodiId"]))]
    pub missing: Vec<String>,
    pub timestamp: String,
}

impl MissingParametersResponse {
    pub fn new(required: &[&str], missing: &[&str]) -> Self {
        Self {
            error: "BadRequest".to_string(),
            message: format!("Missing required parameters: {}", missing.join(", ")),
            required: required.iter().map(|s| s.to_string()).collect(),
            missing: missing.iter().map(|s| s.to_string()).collect(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// 400 body for field-level validation failures.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub error: String,
    pub message: String,
    pub errors: Vec<ValidationError>,
    pub timestamp: String,
}

impl ValidationErrorResponse {
    pub fn new(errors: ValidationErrors) -> Self {
        Self {
            error: "ValidationError".to_string(),
            message: errors.to_string(),
            errors: errors.into_inner(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl From<NumberingError> for HttpResponse {
    fn from(error: NumberingError) -> Self {
        let message = error.to_string();
        match error {
            NumberingError::MissingParameters { required, missing } => {
                HttpResponse::BadRequest().json(MissingParametersResponse::new(&required, &missing))
            }
            NumberingError::InvalidParameter { .. } => {
                HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message))
            }
            NumberingError::Validation(errors) => {
                HttpResponse::BadRequest().json(ValidationErrorResponse::new(errors))
            }
            NumberingError::NotFound { .. } => {
                HttpResponse::NotFound().json(ErrorResponse::not_found(&message))
            }
            NumberingError::Forbidden(_) => {
                HttpResponse::Forbidden().json(ErrorResponse::new("Forbidden", &message))
            }
            NumberingError::StoreUnavailable(_) => {
                log::error!("{}", message);
                HttpResponse::InternalServerError().json(ErrorResponse::internal_error(
                    "Letter number service is temporarily unavailable",
                ))
            }
            NumberingError::IssuanceFailed(_) => {
                log::error!("{}", message);
                HttpResponse::InternalServerError()
                    .json(ErrorResponse::internal_error("Failed to issue letter number"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_check_required_lists_missing_and_blank() {
        let err = NumberingError::check_required(&[
            ("jenisSurat", Some("SKA")),
            ("prodiKode", None),
            ("prodiId", Some("  ")),
        ])
        .unwrap_err();

        match err {
            NumberingError::MissingParameters { required, missing } => {
                assert_eq!(required, vec!["jenisSurat", "prodiKode", "prodiId"]);
                assert_eq!(missing, vec!["prodiKode", "prodiId"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_check_required_accepts_complete_params() {
        assert!(NumberingError::check_required(&[("prodiId", Some("x"))]).is_ok());
    }

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(NumberingError, StatusCode)> = vec![
            (
                NumberingError::InvalidParameter {
                    field: "prodiId",
                    message: "not a uuid".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                NumberingError::document_type_not_found("XXX"),
                StatusCode::NOT_FOUND,
            ),
            (
                NumberingError::Forbidden("role".into()),
                StatusCode::FORBIDDEN,
            ),
            (
                NumberingError::StoreUnavailable(StoreError::Unavailable("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                NumberingError::IssuanceFailed(StoreError::Conflict("40001".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            let response: HttpResponse = error.into();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_conflict_is_retryable() {
        assert!(StoreError::Conflict("x".into()).is_retryable());
        assert!(!StoreError::Unavailable("x".into()).is_retryable());
    }
}
