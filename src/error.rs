use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

/// Failures raised by the attendance store.
///
/// Every variant except `Persistence` is recoverable by the caller; the
/// HTTP boundary surfaces the message and lets the user retry.
#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "{}", message)]
    Validation {
        field: &'static str,
        message: String,
    },
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "{}", _0)]
    Conflict(String),
    #[display(fmt = "persistence failure: {:#}", _0)]
    Persistence(anyhow::Error),
}

impl std::error::Error for StoreError {}

impl StoreError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        StoreError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        StoreError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        StoreError::Conflict(message.into())
    }
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"message": "Invalid email format", "field": "email"}))]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::Validation { .. } => StatusCode::BAD_REQUEST,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Conflict(_) => StatusCode::CONFLICT,
            StoreError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            StoreError::Validation { field, message } => ErrorBody {
                message: message.clone(),
                field: Some((*field).to_string()),
            },
            StoreError::Persistence(e) => {
                error!(error = %format!("{e:#}"), "Persistence layer failed");
                ErrorBody {
                    message: "Internal Server Error".to_string(),
                    field: None,
                }
            }
            other => ErrorBody {
                message: other.to_string(),
                field: None,
            },
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: StoreError) -> (StatusCode, ErrorBody) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn validation_maps_to_bad_request_with_field() {
        let (status, body) = body_of(StoreError::validation("email", "Invalid email format")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "Invalid email format");
        assert_eq!(body.field.as_deref(), Some("email"));
    }

    #[actix_web::test]
    async fn not_found_and_conflict_status_codes() {
        let (status, body) = body_of(StoreError::not_found("Employee not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message, "Employee not found");
        assert!(body.field.is_none());

        let (status, _) = body_of(StoreError::conflict("dup")).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn persistence_errors_are_redacted() {
        let (status, body) =
            body_of(StoreError::Persistence(anyhow::anyhow!("password=secret"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Internal Server Error");
    }
}
