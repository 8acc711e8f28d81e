//! # School Survey Service Module
//!
//! Groups every endpoint of the survey API under `/api/schools`.
//!
//! ## Sub-modules:
//! - `upload`: accepts a multipart submission, stores its images and saves the record.
//! - `filter`: looks records up by exact school name.
//! - `names`: lists every school name on file.
//! - `pdf`: renders the report for one school.

mod filter;
mod names;
mod pdf;
mod upload;

#[cfg(test)]
pub(crate) mod test_support;

use crate::error::AppError;
use actix_web::web::{self, get, post, scope};
use actix_web::Scope;

/// The base path for all survey endpoints.
const API_PATH: &str = "/api/schools";

/// Configures and returns the Actix `Scope` for the survey routes.
///
/// # Registered Routes:
///
/// *   **`POST /api/schools`** (`upload::process`): multipart form with `schoolName`,
///     `location`, `comments`, `faults` (JSON array of flags) and up to ten `images`.
/// *   **`GET /filter?schoolName=`** (`filter::process`): every record for that
///     school, `404` when there are none.
/// *   **`GET /pdf?schoolName=`** (`pdf::process`): the report as a PDF attachment.
/// *   **`GET /names`** (`names::process`): distinct school names.
///
/// A missing or unparsable query string is answered with `400` and the usual
/// JSON error body.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .app_data(query_config())
        .route("", post().to(upload::process))
        .route("/filter", get().to(filter::process))
        .route("/pdf", get().to(pdf::process))
        .route("/names", get().to(names::process))
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::MalformedInput(err.to_string()).into())
}
