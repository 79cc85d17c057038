//! Dealer, review and inventory API
//!
//! These handlers proxy the external dealership and inventory services.
//! Downstream failures never surface as HTTP errors: the affected field is
//! `null` and the envelope still reports `"status": 200`.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::api::middleware::{ApiError, AppState, Identity};
use crate::models::{DealerId, InventoryFilter, InventoryQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get_dealers", get(get_all_dealers))
        .route("/get_dealers/{state}", get(get_dealers_by_state))
        .route("/dealer", get(missing_dealer_id))
        .route("/dealer/{dealer_id}", get(get_dealer_details))
        .route("/reviews/dealer", get(missing_dealer_id))
        .route("/reviews/dealer/{dealer_id}", get(get_dealer_reviews))
        .route("/add_review", post(add_review))
        .route("/get_inventory", get(missing_dealer_id))
        .route("/get_inventory/{dealer_id}", get(get_inventory))
}

fn bad_request() -> Json<Value> {
    Json(json!({ "status": 400, "message": "Bad Request" }))
}

async fn missing_dealer_id() -> Json<Value> {
    bad_request()
}

/// GET /api/v1/get_dealers
async fn get_all_dealers(State(state): State<AppState>) -> Json<Value> {
    dealers(&state, "/fetchDealers").await
}

/// GET /api/v1/get_dealers/{state}, where `All` lists every dealer
async fn get_dealers_by_state(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Json<Value> {
    if region == "All" {
        return dealers(&state, "/fetchDealers").await;
    }
    let endpoint = format!("/fetchDealers/{}", urlencoding::encode(&region));
    dealers(&state, &endpoint).await
}

async fn dealers(state: &AppState, endpoint: &str) -> Json<Value> {
    let dealers = state.gateway.get_request(endpoint, &[]).await.ok();
    Json(json!({ "status": 200, "dealers": dealers }))
}

/// GET /api/v1/dealer/{dealer_id}
async fn get_dealer_details(
    State(state): State<AppState>,
    Path(dealer_id): Path<String>,
) -> Json<Value> {
    let Some(dealer_id) = DealerId::parse(Some(&dealer_id)) else {
        return bad_request();
    };

    let endpoint = format!("/fetchDealer/{}", dealer_id);
    let dealer = state.gateway.get_request(&endpoint, &[]).await.ok();
    Json(json!({ "status": 200, "dealer": dealer }))
}

/// GET /api/v1/reviews/dealer/{dealer_id}
///
/// Each review carries a `sentiment` label. `reviews` is `null` when the
/// listing could not be fetched.
async fn get_dealer_reviews(
    State(state): State<AppState>,
    Path(dealer_id): Path<String>,
) -> Json<Value> {
    let Some(dealer_id) = DealerId::parse(Some(&dealer_id)) else {
        return bad_request();
    };

    let reviews = match state.review_service.dealer_reviews(dealer_id).await {
        Ok(reviews) => Some(reviews),
        Err(e) => {
            tracing::warn!("No reviews for dealer {}: {}", dealer_id, e);
            None
        }
    };
    Json(json!({ "status": 200, "reviews": reviews }))
}

/// POST /api/v1/add_review
///
/// Requires a logged-in user. The body is forwarded as-is.
async fn add_review(
    State(state): State<AppState>,
    identity: Identity,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Some(user) = identity.user() else {
        return Ok(Json(json!({ "status": 403, "message": "Unauthorized" })));
    };
    let Json(review) = body.map_err(|rejection| {
        ApiError::with_details(
            "VALIDATION_ERROR",
            "Invalid review body",
            json!({ "reason": rejection.body_text() }),
        )
    })?;

    match state.gateway.post_review(&review).await {
        Ok(_) => {
            tracing::info!("Review posted by {}", user.display_name());
            Ok(Json(json!({ "status": 200 })))
        }
        Err(e) => {
            tracing::warn!("Failed to post review for {}: {}", user.username, e);
            Ok(Json(json!({ "status": 401, "message": "Error in posting review" })))
        }
    }
}

/// GET /api/v1/get_inventory/{dealer_id}?year=|make=|model=|mileage=|price=
async fn get_inventory(
    State(state): State<AppState>,
    Path(dealer_id): Path<String>,
    query: Result<Query<InventoryQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        ApiError::with_details(
            "VALIDATION_ERROR",
            "Invalid inventory query",
            json!({ "reason": rejection.body_text() }),
        )
    })?;
    let Some(dealer_id) = DealerId::parse(Some(&dealer_id)) else {
        return Ok(bad_request());
    };

    let endpoint = InventoryFilter::from_query(query).endpoint(dealer_id);
    let cars = state.gateway.searchcars_request(&endpoint, &[]).await.ok();
    Ok(Json(json!({ "status": 200, "cars": cars })))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};

    use crate::test_support::{dead_url, services_config, spawn_server, test_server, test_state};

    type Calls = Arc<AtomicUsize>;

    fn hit(calls: &Calls) {
        calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Fake dealership service; counts every call it receives
    async fn fake_backend(calls: Calls) -> String {
        let router = Router::new()
            .route(
                "/fetchDealers",
                get(|State(calls): State<Calls>| async move {
                    hit(&calls);
                    Json(json!([{ "id": 1, "state": "Texas" }, { "id": 2, "state": "Kansas" }]))
                }),
            )
            .route(
                "/fetchDealers/{state}",
                get(|State(calls): State<Calls>, Path(state): Path<String>| async move {
                    hit(&calls);
                    Json(json!([{ "id": 1, "state": state }]))
                }),
            )
            .route(
                "/fetchDealer/{id}",
                get(|State(calls): State<Calls>, Path(id): Path<u64>| async move {
                    hit(&calls);
                    Json(json!([{ "id": id, "full_name": "Best Cars" }]))
                }),
            )
            .route(
                "/fetchReviews/dealer/{id}",
                get(|State(calls): State<Calls>, Path(id): Path<u64>| async move {
                    hit(&calls);
                    Json(json!([
                        { "id": 1, "dealership": id, "review": "Great service" },
                        { "id": 2, "dealership": id, "review": "Awful, the worst" },
                    ]))
                }),
            )
            .route(
                "/insert_review",
                post(|State(calls): State<Calls>, Json(review): Json<Value>| async move {
                    hit(&calls);
                    Json(json!({ "inserted": review }))
                }),
            )
            .with_state(calls);
        spawn_server(router).await
    }

    async fn fake_analyzer() -> String {
        let router = Router::new().route(
            "/analyze/{text}",
            get(|Path(text): Path<String>| async move {
                let sentiment = if text.contains("worst") { "negative" } else { "positive" };
                Json(json!({ "sentiment": sentiment }))
            }),
        );
        spawn_server(router).await
    }

    async fn fake_searchcars() -> String {
        let router = Router::new()
            .route(
                "/cars/{id}",
                get(|Path(id): Path<u64>| async move { Json(json!([{ "dealer_id": id }])) }),
            )
            .route(
                "/carsbyyear/{id}/{year}",
                get(|Path((id, year)): Path<(u64, String)>| async move {
                    Json(json!([{ "dealer_id": id, "year": year }]))
                }),
            )
            .route(
                "/carsbymake/{id}/{make}",
                get(|Path((id, make)): Path<(u64, String)>| async move {
                    Json(json!([{ "dealer_id": id, "make": make }]))
                }),
            );
        spawn_server(router).await
    }

    struct Fixture {
        server: axum_test::TestServer,
        calls: Calls,
    }

    async fn fixture() -> Fixture {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = fake_backend(calls.clone()).await;
        let analyzer = fake_analyzer().await;
        let searchcars = fake_searchcars().await;
        let state = test_state(&services_config(&backend, &analyzer, &searchcars)).await;
        Fixture {
            server: test_server(state),
            calls,
        }
    }

    async fn unreachable_fixture() -> axum_test::TestServer {
        let dead = dead_url().await;
        test_server(test_state(&services_config(&dead, &dead, &dead)).await)
    }

    #[tokio::test]
    async fn test_get_dealers() {
        let f = fixture().await;

        let all = f.server.get("/api/v1/get_dealers").await.json::<Value>();
        assert_eq!(all["status"], 200);
        assert_eq!(all["dealers"].as_array().unwrap().len(), 2);

        let all = f.server.get("/api/v1/get_dealers/All").await.json::<Value>();
        assert_eq!(all["dealers"].as_array().unwrap().len(), 2);

        let kansas = f.server.get("/api/v1/get_dealers/Kansas").await.json::<Value>();
        assert_eq!(kansas["dealers"], json!([{ "id": 1, "state": "Kansas" }]));
    }

    #[tokio::test]
    async fn test_dealer_details() {
        let f = fixture().await;

        let response = f.server.get("/api/v1/dealer/7").await;
        response.assert_status_ok();
        response.assert_json(&json!({
            "status": 200,
            "dealer": [{ "id": 7, "full_name": "Best Cars" }]
        }));
    }

    #[tokio::test]
    async fn test_invalid_dealer_id_is_bad_request_without_downstream_call() {
        let f = fixture().await;
        let bad = json!({ "status": 400, "message": "Bad Request" });

        for path in [
            "/api/v1/dealer",
            "/api/v1/dealer/0",
            "/api/v1/dealer/abc",
            "/api/v1/reviews/dealer",
            "/api/v1/reviews/dealer/0",
            "/api/v1/get_inventory",
            "/api/v1/get_inventory/0?year=2020",
        ] {
            let response = f.server.get(path).await;
            response.assert_status_ok();
            response.assert_json(&bad);
        }

        assert_eq!(f.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dealer_reviews_carry_sentiment() {
        let f = fixture().await;

        let body = f.server.get("/api/v1/reviews/dealer/15").await.json::<Value>();

        assert_eq!(body["status"], 200);
        let reviews = body["reviews"].as_array().unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0]["id"], 1);
        assert_eq!(reviews[0]["dealership"], 15);
        assert_eq!(reviews[0]["sentiment"], "positive");
        assert_eq!(reviews[1]["id"], 2);
        assert_eq!(reviews[1]["sentiment"], "negative");
    }

    #[tokio::test]
    async fn test_unreachable_services_yield_null() {
        let server = unreachable_fixture().await;

        let body = server.get("/api/v1/get_dealers").await.json::<Value>();
        assert_eq!(body, json!({ "status": 200, "dealers": null }));

        let body = server.get("/api/v1/dealer/3").await.json::<Value>();
        assert_eq!(body, json!({ "status": 200, "dealer": null }));

        let body = server.get("/api/v1/reviews/dealer/3").await.json::<Value>();
        assert_eq!(body, json!({ "status": 200, "reviews": null }));

        let body = server.get("/api/v1/get_inventory/3").await.json::<Value>();
        assert_eq!(body, json!({ "status": 200, "cars": null }));
    }

    #[tokio::test]
    async fn test_inventory_filters() {
        let f = fixture().await;

        let all = f.server.get("/api/v1/get_inventory/4").await.json::<Value>();
        assert_eq!(all, json!({ "status": 200, "cars": [{ "dealer_id": 4 }] }));

        let by_year = f
            .server
            .get("/api/v1/get_inventory/4")
            .add_query_param("year", "2021")
            .add_query_param("make", "Audi")
            .await
            .json::<Value>();
        assert_eq!(by_year["cars"], json!([{ "dealer_id": 4, "year": "2021" }]));

        let by_make = f
            .server
            .get("/api/v1/get_inventory/4")
            .add_query_param("make", "Mercedes Benz")
            .await
            .json::<Value>();
        assert_eq!(by_make["cars"], json!([{ "dealer_id": 4, "make": "Mercedes Benz" }]));
    }

    #[tokio::test]
    async fn test_inventory_ignores_unknown_parameters() {
        let f = fixture().await;

        let body = f
            .server
            .get("/api/v1/get_inventory/4")
            .add_query_param("colour", "red")
            .await
            .json::<Value>();
        assert_eq!(body, json!({ "status": 200, "cars": [{ "dealer_id": 4 }] }));
    }

    #[tokio::test]
    async fn test_inventory_repeated_filter_is_validation_error() {
        let f = fixture().await;

        let response = f.server.get("/api/v1/get_inventory/4?year=2020&year=2021").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["details"]["reason"].is_string());
    }

    #[tokio::test]
    async fn test_add_review_requires_login() {
        let f = fixture().await;

        let response = f
            .server
            .post("/api/v1/add_review")
            .json(&json!({ "dealership": 1, "review": "Nice" }))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({ "status": 403, "message": "Unauthorized" }));
        assert_eq!(f.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_add_review_when_logged_in() {
        let f = fixture().await;
        f.server
            .post("/api/v1/register")
            .json(&json!({ "userName": "ada", "password": "pw" }))
            .await
            .assert_json(&json!({ "userName": "ada", "status": "Authenticated" }));

        let response = f
            .server
            .post("/api/v1/add_review")
            .json(&json!({ "dealership": 1, "review": "Nice", "name": "ada" }))
            .await;

        response.assert_json(&json!({ "status": 200 }));
        assert_eq!(f.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_add_review_backend_down() {
        let server = unreachable_fixture().await;
        server
            .post("/api/v1/register")
            .json(&json!({ "userName": "ada", "password": "pw" }))
            .await;

        let response = server
            .post("/api/v1/add_review")
            .json(&json!({ "dealership": 1, "review": "Nice" }))
            .await;

        response.assert_json(&json!({ "status": 401, "message": "Error in posting review" }));
    }

    #[tokio::test]
    async fn test_add_review_after_logout_is_unauthorized() {
        let f = fixture().await;
        f.server
            .post("/api/v1/register")
            .json(&json!({ "userName": "ada", "password": "pw" }))
            .await;
        f.server.post("/api/v1/logout").await;

        let response = f
            .server
            .post("/api/v1/add_review")
            .json(&json!({ "dealership": 1, "review": "Nice" }))
            .await;

        response.assert_json(&json!({ "status": 403, "message": "Unauthorized" }));
    }
}
