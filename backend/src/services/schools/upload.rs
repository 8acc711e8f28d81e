//! # Survey Submission Service
//!
//! Backs `POST /api/schools`. The request is a multipart form:
//!
//! - `schoolName`, `location`, `comments`: plain text fields. A missing field is
//!   stored as an empty string.
//! - `faults`: JSON array of flags, e.g. `["true","false","true"]`. Required.
//! - `images`: zero to `MAX_IMAGES` file parts.
//!
//! Images are streamed to the upload directory as they arrive, under a name
//! built by `UploadDir::file_name_for`. Once the form is read the faults are
//! decoded and the record is saved. If anything fails on the way, the files
//! written for this request are removed again on a best-effort basis.

use crate::error::AppError;
use crate::state::AppState;
use crate::uploads::UploadDir;
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use log::{info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use common::model::survey::{FaultFlags, RecordId, SurveyRecord};
use common::responses::MessageResponse;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Upper bound on `images` parts per submission.
pub const MAX_IMAGES: usize = 10;

/// Handler for `POST /api/schools`.
///
/// # Returns
/// - `200 OK` with `{"message": "Data stored successfully"}`.
/// - `400 Bad Request` for a malformed form or `faults` payload; nothing is saved.
/// - `500 Internal Server Error` when an image or the record cannot be persisted.
pub async fn process(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    receive_submission(&state, payload).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Data stored successfully")))
}

/// Reads the submission, stores its images and saves the record.
pub async fn receive_submission(
    state: &AppState,
    payload: Multipart,
) -> Result<RecordId, AppError> {
    let mut written = Vec::new();
    let result = store_submission(state, payload, &mut written).await;
    if result.is_err() {
        discard_files(&written).await;
    }
    result
}

#[derive(Default)]
struct SubmissionForm {
    school_name: Option<String>,
    location: Option<String>,
    comments: Option<String>,
    faults: Option<String>,
    image_paths: Vec<String>,
}

async fn store_submission(
    state: &AppState,
    mut payload: Multipart,
    written: &mut Vec<PathBuf>,
) -> Result<RecordId, AppError> {
    let mut form = SubmissionForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::MalformedInput(e.to_string()))?;
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match field_name.as_deref() {
            Some("images") => {
                if form.image_paths.len() == MAX_IMAGES {
                    return Err(AppError::MalformedInput(format!(
                        "at most {MAX_IMAGES} images may be attached"
                    )));
                }
                let original = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                let file_name = UploadDir::file_name_for(&original);
                let path = state.uploads.path_of(&file_name);

                written.push(path.clone());
                save_field_to(&mut field, &path).await?;
                form.image_paths.push(UploadDir::public_path(&file_name));
            }
            Some("schoolName") => form.school_name = Some(read_text(&mut field).await?),
            Some("location") => form.location = Some(read_text(&mut field).await?),
            Some("comments") => form.comments = Some(read_text(&mut field).await?),
            Some("faults") => form.faults = Some(read_text(&mut field).await?),
            _ => drain(&mut field).await?,
        }
    }

    let faults = parse_faults(form.faults.as_deref())?;
    let image_count = form.image_paths.len();
    let record = SurveyRecord {
        school_name: form.school_name.unwrap_or_default(),
        location: form.location.unwrap_or_default(),
        faults,
        comments: form.comments.unwrap_or_default(),
        image_path: form.image_paths,
    };

    let id = state
        .store
        .save(record)
        .await
        .map_err(AppError::store("Error storing data"))?;
    info!("Stored survey record {} with {} image(s)", id.0, image_count);
    Ok(id)
}

/// Decodes the serialised `faults` field.
pub fn parse_faults(raw: Option<&str>) -> Result<FaultFlags, AppError> {
    let raw = raw.ok_or_else(|| AppError::MalformedInput("missing faults field".to_string()))?;
    serde_json::from_str(raw)
        .map_err(|e| AppError::MalformedInput(format!("faults is not a valid flag list: {e}")))
}

async fn read_text(field: &mut Field) -> Result<String, AppError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::MalformedInput(e.to_string()))?;
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8(bytes)
        .map_err(|_| AppError::MalformedInput("form field is not valid UTF-8".to_string()))
}

async fn drain(field: &mut Field) -> Result<(), AppError> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| AppError::MalformedInput(e.to_string()))?;
    }
    Ok(())
}

async fn save_field_to(field: &mut Field, path: &Path) -> Result<(), AppError> {
    let io_err = |e: std::io::Error| AppError::Upload(format!("{}: {}", path.display(), e));

    let mut file = File::create(path).await.map_err(io_err)?;
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::MalformedInput(e.to_string()))?;
        file.write_all(&chunk).await.map_err(io_err)?;
    }
    file.flush().await.map_err(io_err)?;
    Ok(())
}

async fn discard_files(paths: &[PathBuf]) {
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove partial upload {}: {}", path.display(), e),
        }
    }
}
