//! Shared fixtures for the handler tests.

use crate::state::AppState;
use crate::store::RecordStore;
use crate::uploads::UploadDir;
use actix_web::http::header;
use actix_web::test::TestRequest;
use common::model::survey::{FaultFlags, SurveyRecord};
use tempfile::TempDir;

pub(crate) const BOUNDARY: &str = "survey-test-boundary";

/// App state over an in-memory store and a temporary upload directory.
pub(crate) struct TestEnv {
    pub state: AppState,
    pub upload_root: std::path::PathBuf,
    _dir: TempDir,
}

pub(crate) fn test_env() -> TestEnv {
    let dir = tempfile::tempdir().unwrap();
    let upload_root = dir.path().join("uploads");
    std::fs::create_dir(&upload_root).unwrap();

    let state = AppState {
        store: RecordStore::open_in_memory().unwrap(),
        uploads: UploadDir::new(&upload_root),
        fonts_dir: dir.path().join("fonts"),
    };
    TestEnv {
        state,
        upload_root,
        _dir: dir,
    }
}

macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state.clone()))
                .service(crate::services::schools::configure_routes()),
        )
    };
}
pub(crate) use test_app;

pub(crate) fn sample_record(name: &str, location: &str) -> SurveyRecord {
    SurveyRecord {
        school_name: name.to_string(),
        location: location.to_string(),
        faults: FaultFlags::new([false, true, false, false, false]),
        comments: String::new(),
        image_path: Vec::new(),
    }
}

pub(crate) enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

pub(crate) fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub(crate) fn multipart_request(parts: &[Part<'_>]) -> TestRequest {
    TestRequest::post()
        .uri("/api/schools")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_body(parts))
}
