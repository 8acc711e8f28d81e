use crate::error::AppError;
use crate::state::AppState;
use crate::store::RecordStore;
use actix_web::{web, HttpResponse};

/// Handler for `GET /api/schools/names`: `200 OK` with a JSON array of names.
pub async fn process(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let names = list_names(&state.store).await?;
    Ok(HttpResponse::Ok().json(names))
}

pub async fn list_names(store: &RecordStore) -> Result<Vec<String>, AppError> {
    store
        .distinct_names()
        .await
        .map_err(AppError::store("Error fetching school names"))
}

#[cfg(test)]
mod tests {
    use crate::services::schools::test_support::{sample_record, test_app, test_env};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;

    #[actix_web::test]
    async fn lists_each_name_once() {
        let env = test_env();
        for name in ["Oakwood", "Hillside", "Oakwood"] {
            env.state.store.save(sample_record(name, "Hall")).await.unwrap();
        }
        let app = test_app!(env.state).await;

        let req = actix_test::TestRequest::get().uri("/api/schools/names").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let names: Vec<String> = actix_test::read_body_json(resp).await;
        assert_eq!(names, vec!["Hillside", "Oakwood"]);
    }

    #[actix_web::test]
    async fn empty_store_lists_nothing() {
        let env = test_env();
        let app = test_app!(env.state).await;

        let req = actix_test::TestRequest::get().uri("/api/schools/names").to_request();
        let names: Vec<String> = actix_test::call_and_read_body_json(&app, req).await;
        assert!(names.is_empty());
    }
}
