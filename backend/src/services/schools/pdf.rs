//! # Survey Report Service
//!
//! Backs `GET /api/schools/pdf?schoolName=`. The matching records are fetched
//! from the store (an unknown school is a `404`), laid out by
//! `report::build_report` and rendered by `report::render_report`.
//!
//! Rendering happens on the blocking pool and completes in memory before the
//! response starts, so a render failure is always answered with a clean `500`
//! instead of a truncated document. Every failure on this route reports
//! "Error generating PDF".

use crate::error::AppError;
use crate::report::{build_report, render_report, RenderError};
use crate::state::AppState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use common::requests::SchoolNameQuery;
use log::info;

const FAILURE_MESSAGE: &str = "Error generating PDF";

/// Handler for `GET /api/schools/pdf?schoolName=`.
///
/// # Returns
/// - `200 OK` with the PDF as an attachment named `{schoolName}_report.pdf`.
/// - `404 Not Found` when no record carries that name.
/// - `500 Internal Server Error` when the store or the renderer fails.
pub async fn process(
    state: web::Data<AppState>,
    query: web::Query<SchoolNameQuery>,
) -> Result<HttpResponse, AppError> {
    let school_name = query.into_inner().school_name;
    let pdf = generate_report(&state, &school_name).await?;

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(report_file_name(&school_name))],
        })
        .body(pdf))
}

/// `{schoolName}_report.pdf`, with control characters replaced by `_` so the
/// header value stays valid whatever name was submitted.
fn report_file_name(school_name: &str) -> String {
    let name: String = school_name
        .chars()
        .map(|c| if c.is_control() { '_' } else { c })
        .collect();
    format!("{name}_report.pdf")
}

/// Builds the PDF report for every record of `school_name`.
pub async fn generate_report(state: &AppState, school_name: &str) -> Result<Vec<u8>, AppError> {
    let records = state
        .store
        .find_by_name(school_name)
        .await
        .map_err(AppError::store(FAILURE_MESSAGE))?;
    if records.is_empty() {
        return Err(AppError::NotFound);
    }
    info!(
        "Generating report for {} ({} record(s))",
        school_name,
        records.len()
    );

    let uploads = state.uploads.clone();
    let fonts_dir = state.fonts_dir.clone();
    let name = school_name.to_string();
    let pdf = web::block(move || {
        let report = build_report(&name, &records, &uploads);
        render_report(report, &fonts_dir)
    })
    .await
    .map_err(RenderError::from)??;

    Ok(pdf)
}
