//! Error types for the application

use thiserror::Error;

use crate::notice::Notice;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Rejected by server: {0}")]
    Rejected(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Build the notice shown to the user for this error.
    ///
    /// `fallback` is used for failures whose raw text is not meant for the
    /// user (transport, parsing, IO); the other variants carry a message
    /// that is already user facing.
    pub fn to_notice(&self, fallback: &str) -> Notice {
        match self {
            AppError::NotFound(msg)
            | AppError::Precondition(msg)
            | AppError::Rejected(msg) => Notice::error(msg.clone()),
            AppError::Http(e) => {
                tracing::error!("HTTP error: {}", e);
                Notice::error(fallback)
            }
            AppError::InvalidResponse(e) => {
                tracing::error!("Invalid response: {}", e);
                Notice::error(fallback)
            }
            AppError::Pdf(e) => {
                tracing::error!("PDF error: {}", e);
                Notice::error(fallback)
            }
            AppError::Image(e) => {
                tracing::error!("Image error: {}", e);
                Notice::error(fallback)
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                Notice::error(fallback)
            }
            AppError::Config(e) => {
                tracing::error!("Configuration error: {}", e);
                Notice::error(fallback)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeLevel;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("worker".to_string());
        assert_eq!(format!("{}", err), "Not found: worker");

        let err = AppError::Rejected("duplicated".to_string());
        assert_eq!(format!("{}", err), "Rejected by server: duplicated");

        let err = AppError::Precondition("no worker".to_string());
        assert_eq!(format!("{}", err), "Precondition failed: no worker");

        let err = AppError::Config("bad url".to_string());
        assert_eq!(format!("{}", err), "Configuration error: bad url");
    }

    #[test]
    fn test_app_error_debug() {
        let err = AppError::NotFound("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("NotFound"));
    }

    #[test]
    fn test_user_facing_variants_keep_their_message() {
        let notice = AppError::Rejected("Cédula duplicada".to_string()).to_notice("fallback");
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Cédula duplicada");
    }

    #[test]
    fn test_internal_variants_use_fallback() {
        let err = AppError::InvalidResponse("expected value at line 1".to_string());
        let notice = err.to_notice("Hubo un problema");
        assert_eq!(notice.message, "Hubo un problema");

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let notice = AppError::from(io).to_notice("No se pudo guardar");
        assert_eq!(notice.message, "No se pudo guardar");
    }

    #[test]
    fn test_result_type_alias() {
        fn test_fn() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(test_fn().unwrap(), 42);

        fn test_err_fn() -> Result<i32> {
            Err(AppError::NotFound("test".to_string()))
        }
        assert!(test_err_fn().is_err());
    }
}
