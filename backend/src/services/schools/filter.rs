use crate::error::AppError;
use crate::state::AppState;
use crate::store::RecordStore;
use actix_web::{web, HttpResponse};
use common::model::survey::StoredRecord;
use common::requests::SchoolNameQuery;

/// Handler for `GET /api/schools/filter?schoolName=`.
///
/// # Returns
/// - `200 OK` with the matching records as a JSON array.
/// - `404 Not Found` when no record carries that exact name.
/// - `500 Internal Server Error` when the store fails.
pub async fn process(
    state: web::Data<AppState>,
    query: web::Query<SchoolNameQuery>,
) -> Result<HttpResponse, AppError> {
    let records = filter_by_name(&state.store, &query.school_name).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Records whose school name equals `name` exactly (no case folding, no
/// partial matches). An empty result is reported as `AppError::NotFound`.
pub async fn filter_by_name(
    store: &RecordStore,
    name: &str,
) -> Result<Vec<StoredRecord>, AppError> {
    let records = store
        .find_by_name(name)
        .await
        .map_err(AppError::store("Error fetching data"))?;

    if records.is_empty() {
        return Err(AppError::NotFound);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::schools::test_support::{sample_record, test_app, test_env};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use common::responses::MessageResponse;

    #[actix_web::test]
    async fn returns_every_record_for_the_name() {
        let env = test_env();
        env.state.store.save(sample_record("Oakwood", "Hall")).await.unwrap();
        env.state.store.save(sample_record("Oakwood", "Gym")).await.unwrap();
        env.state.store.save(sample_record("Hillside", "Hall")).await.unwrap();
        let app = test_app!(env.state).await;

        let req = actix_test::TestRequest::get()
            .uri("/api/schools/filter?schoolName=Oakwood")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let records: Vec<StoredRecord> = actix_test::read_body_json(resp).await;
        let locations: Vec<_> = records.iter().map(|r| r.record.location.as_str()).collect();
        assert_eq!(locations, vec!["Hall", "Gym"]);
    }

    #[actix_web::test]
    async fn unknown_name_is_not_found() {
        let env = test_env();
        env.state.store.save(sample_record("Oakwood", "Hall")).await.unwrap();
        let app = test_app!(env.state).await;

        let req = actix_test::TestRequest::get()
            .uri("/api/schools/filter?schoolName=oakwood")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: MessageResponse = actix_test::read_body_json(resp).await;
        assert_eq!(body.message, "No schools found with the given name");
    }

    #[actix_web::test]
    async fn names_with_spaces_are_matched_after_decoding() {
        let env = test_env();
        env.state
            .store
            .save(sample_record("St Mary's Primary", "Hall"))
            .await
            .unwrap();
        let app = test_app!(env.state).await;

        let req = actix_test::TestRequest::get()
            .uri("/api/schools/filter?schoolName=St%20Mary%27s%20Primary")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn missing_query_parameter_is_a_client_error() {
        let env = test_env();
        let app = test_app!(env.state).await;

        let req = actix_test::TestRequest::get()
            .uri("/api/schools/filter")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
