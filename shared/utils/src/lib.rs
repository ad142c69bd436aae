//! Configuration, logging, the `ImdgError` taxonomy and upload validation
//! shared by the analyzer service.

pub mod config;
pub mod error;
pub mod logging;
pub mod validation;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use validation::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_upload_and_rejection_are_client_errors() {
        assert_eq!(ImdgError::MissingUpload.http_status_code(), 400);
        assert_eq!(ImdgError::content_rejected("not an MSDS").http_status_code(), 400);
        assert_eq!(ImdgError::not_found("collection").http_status_code(), 404);
    }
}
