//! Request-level error type.
//!
//! Every handler returns `Result<_, AppError>`; actix turns the error into a
//! status code and a `MessageResponse` body through `ResponseError`.

use crate::report::RenderError;
use crate::store::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::responses::MessageResponse;
use thiserror::Error;

pub const NOT_FOUND_MESSAGE: &str = "No schools found with the given name";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    MalformedInput(String),

    #[error("No schools found with the given name")]
    NotFound,

    /// Store failure; `context` is the message shown to the client.
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Error storing data: {0}")]
    Upload(String),

    #[error("Error generating PDF: {0}")]
    Render(#[from] RenderError),
}

impl AppError {
    pub fn store(context: &'static str) -> impl FnOnce(StoreError) -> AppError {
        move |source| AppError::Store { context, source }
    }

    fn body(&self) -> MessageResponse {
        match self {
            AppError::MalformedInput(detail) => {
                MessageResponse::with_error("Invalid submission", detail.clone())
            }
            AppError::NotFound => MessageResponse::new(NOT_FOUND_MESSAGE),
            AppError::Store { context, source } => {
                MessageResponse::with_error(*context, source.to_string())
            }
            AppError::Upload(detail) => {
                MessageResponse::with_error("Error storing data", detail.clone())
            }
            AppError::Render(source) => {
                MessageResponse::with_error("Error generating PDF", source.to_string())
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Store { .. } | AppError::Upload(_) | AppError::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("{self}");
        }
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_kind() {
        assert_eq!(
            AppError::MalformedInput("bad faults".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::store("Error fetching data")(StoreError::Poisoned).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Upload("disk full".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_errors_carry_context_and_detail() {
        let body = AppError::store("Error fetching school names")(StoreError::Poisoned).body();
        assert_eq!(body.message, "Error fetching school names");
        assert_eq!(body.error.as_deref(), Some("database connection lock poisoned"));
    }

    #[test]
    fn not_found_has_no_error_detail() {
        let body = AppError::NotFound.body();
        assert_eq!(body.message, NOT_FOUND_MESSAGE);
        assert!(body.error.is_none());
    }
}
