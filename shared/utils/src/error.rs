use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use imdg_database::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ImdgError {
    #[error("No PDF file was uploaded")]
    MissingUpload,

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Document rejected: {message}")]
    ContentRejected { message: String },

    #[error("Document processing error: {message}")]
    DocumentProcessing { message: String },

    #[error("Vector store error: {message}")]
    VectorStore { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Authentication error: {message}")]
    Authentication { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ImdgError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn content_rejected(message: impl Into<String>) -> Self {
        Self::ContentRejected {
            message: message.into(),
        }
    }

    pub fn document_processing(message: impl Into<String>) -> Self {
        Self::DocumentProcessing {
            message: message.into(),
        }
    }

    pub fn vector_store(message: impl Into<String>) -> Self {
        Self::VectorStore {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingUpload => "MISSING_UPLOAD",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::ContentRejected { .. } => "CONTENT_REJECTED",
            Self::DocumentProcessing { .. } => "DOCUMENT_PROCESSING_ERROR",
            Self::VectorStore { .. } => "VECTOR_STORE_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Authentication { .. } => "AUTHENTICATION_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::MissingUpload => 400,
            Self::Validation { .. } => 400,
            Self::ContentRejected { .. } => 400,
            Self::DocumentProcessing { .. } => 422,
            Self::VectorStore { .. } => 500,
            Self::NotFound { .. } => 404,
            Self::Authentication { .. } => 401,
            Self::Configuration { .. } => 500,
            Self::ExternalService { .. } => 502,
            Self::Internal { .. } => 500,
        }
    }
}

pub type ImdgResult<T> = Result<T, ImdgError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl From<ImdgError> for ErrorResponse {
    fn from(error: ImdgError) -> Self {
        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
            message: error.to_string(),
            details: None,
        }
    }
}

impl IntoResponse for ImdgError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "Request failed");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "Request rejected");
        }
        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

// Conversion from common error types
impl From<StoreError> for ImdgError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::CollectionNotFound(name) => Self::not_found(format!("collection {}", name)),
            StoreError::InvalidName(e) => Self::validation("collection", e.to_string()),
            StoreError::Embedding(message) => Self::external_service("Embedding API", message),
            other => Self::vector_store(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ImdgError {
    fn from(error: reqwest::Error) -> Self {
        Self::external_service("HTTP Client", error.to_string())
    }
}

impl From<serde_json::Error> for ImdgError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}

impl From<std::io::Error> for ImdgError {
    fn from(error: std::io::Error) -> Self {
        Self::internal(format!("I/O error: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_taxonomy() {
        let err: ImdgError = StoreError::CollectionNotFound("abc".into()).into();
        assert_eq!(err.http_status_code(), 404);

        let err: ImdgError = StoreError::Embedding("timeout".into()).into();
        assert_eq!(err.error_code(), "EXTERNAL_SERVICE_ERROR");
        assert_eq!(err.http_status_code(), 502);

        let err: ImdgError = StoreError::DimensionMismatch { expected: 3, actual: 4 }.into();
        assert_eq!(err.http_status_code(), 500);
    }

    #[test]
    fn test_into_response_uses_status_and_json() {
        let response = ImdgError::content_rejected("not an MSDS").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
    }

    #[test]
    fn test_error_response_fields() {
        let body = ErrorResponse::from(ImdgError::not_found("text cache"));
        assert_eq!(body.code, "NOT_FOUND");
        assert_eq!(body.error, "Not found: text cache");
    }
}
