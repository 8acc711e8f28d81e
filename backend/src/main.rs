mod config;
mod error;
mod report;
mod services;
mod state;
mod store;
mod uploads;

use crate::config::Config;
use crate::state::AppState;
use crate::store::RecordStore;
use crate::uploads::{UploadDir, PUBLIC_PREFIX};
use actix_cors::Cors;
use actix_files::Files;
use actix_web::{middleware, web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::load().map_err(io::Error::other)?;
    std::fs::create_dir_all(&config.upload_dir)?;

    let state = AppState {
        store: RecordStore::open(&config.db_path).map_err(io::Error::other)?,
        uploads: UploadDir::new(&config.upload_dir),
        fonts_dir: config.fonts_dir.clone(),
    };
    info!(
        "Records in {}, uploads in {}",
        config.db_path.display(),
        state.uploads.root().display()
    );

    let upload_dir = config.upload_dir.clone();
    info!("Server running on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_policy())
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(state.clone()))
            .service(services::schools::configure_routes())
            .service(Files::new(PUBLIC_PREFIX, upload_dir.clone()))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

/// Any origin may call the API, so a front end served elsewhere can use it.
fn cors_policy() -> Cors {
    Cors::permissive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::schools::test_support::test_env;
    use actix_web::http::{header, Method, StatusCode};
    use actix_web::test as actix_test;

    const ORIGIN: &str = "http://localhost:3000";

    #[actix_web::test]
    async fn cross_origin_requests_are_allowed() {
        let env = test_env();
        let app = actix_test::init_service(
            App::new()
                .wrap(cors_policy())
                .app_data(web::Data::new(env.state.clone()))
                .service(services::schools::configure_routes()),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/schools/names")
            .insert_header((header::ORIGIN, ORIGIN))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            ORIGIN
        );
    }

    #[actix_web::test]
    async fn preflight_for_submissions_succeeds() {
        let env = test_env();
        let app = actix_test::init_service(
            App::new()
                .wrap(cors_policy())
                .app_data(web::Data::new(env.state.clone()))
                .service(services::schools::configure_routes()),
        )
        .await;

        let req = actix_test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/schools")
            .insert_header((header::ORIGIN, ORIGIN))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert!(resp
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    }
}
