//! Integration tests for the backend client against an in-process mock backend

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use lzm_common::client::{ApiClient, ApiError, SpeciesListQuery};
use lzm_common::models::{PreferenceRequest, RecommendOptions, RecommendRequest};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Serve a router on an ephemeral port, returning its base URL
async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn backend() -> Router {
    Router::new()
        .route(
            "/api/recommend",
            post(|Json(body): Json<Value>| async move {
                // echo the request back inside a well-formed response
                Json(json!({
                    "request_id": "req_test",
                    "top_n": body["options"]["top_n"],
                    "results": [{
                        "종_한글명": "레오파드 게코",
                        "종류": body["preferences"]["종류"][0],
                        "match_score": 91.0
                    }]
                }))
            }),
        )
        .route(
            "/api/species/list",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "items": [{"종_한글명": params.get("q").cloned().unwrap_or_default()}],
                    "limit": params.get("limit")
                }))
            }),
        )
        .route(
            "/api/species/:name",
            get(|Path(name): Path<String>| async move {
                if name == "레오파드 게코" {
                    (StatusCode::OK, Json(json!({"종_한글명": name, "활동패턴": "야행성"})))
                } else {
                    (
                        StatusCode::NOT_FOUND,
                        Json(json!({"error": {"code": "SPECIES_NOT_FOUND", "message": "없음"}})),
                    )
                }
            }),
        )
}

#[tokio::test]
async fn test_recommend_round_trip() {
    let base = spawn_backend(backend()).await;
    let client = ApiClient::new(base).unwrap();

    let request = RecommendRequest {
        preferences: PreferenceRequest {
            species_types: vec!["Gecko".into()],
            ..Default::default()
        },
        options: RecommendOptions::default(),
    };

    let rec = client.recommend(&request).await.unwrap();
    assert_eq!(rec.response.results.len(), 1);
    assert_eq!(rec.response.top_n, Some(10));
    assert_eq!(rec.response.results[0].species.text("종류"), Some("Gecko"));
    assert!(rec.raw.contains("req_test"));
}

#[tokio::test]
async fn test_recommend_error_envelope() {
    let router = Router::new().route(
        "/api/recommend",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": {"message": "internal", "code": "INTERNAL_ERROR"}})),
            )
        }),
    );
    let client = ApiClient::new(spawn_backend(router).await).unwrap();

    let request = RecommendRequest {
        preferences: PreferenceRequest::default(),
        options: RecommendOptions::default(),
    };
    let err = client.recommend(&request).await.unwrap_err();

    match &err {
        ApiError::Http { status, message, code, .. } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "internal");
            assert_eq!(code.as_deref(), Some("INTERNAL_ERROR"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_recommend_malformed_body_is_parse_error() {
    let router = Router::new().route("/api/recommend", post(|| async { "not json" }));
    let client = ApiClient::new(spawn_backend(router).await).unwrap();

    let request = RecommendRequest {
        preferences: PreferenceRequest::default(),
        options: RecommendOptions::default(),
    };
    let err = client.recommend(&request).await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
}

#[tokio::test]
async fn test_species_detail_found_and_missing() {
    let client = ApiClient::new(spawn_backend(backend()).await).unwrap();

    let record = client.species_detail("레오파드 게코").await.unwrap();
    assert_eq!(record.text("활동패턴"), Some("야행성"));

    let err = client.species_detail("없는 종").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_species_list_sends_query() {
    let client = ApiClient::new(spawn_backend(backend()).await).unwrap();

    let query = SpeciesListQuery {
        q: Some("가면도마뱀붙이".into()),
        difficulty: None,
        limit: 500,
    };
    let list = client.species_list(&query).await.unwrap();
    assert_eq!(list.items.len(), 1);
    assert_eq!(list.items[0].name(), Some("가면도마뱀붙이"));
}

#[tokio::test]
async fn test_network_failure_is_reported() {
    // nothing listens on port 9 of localhost in the test environment
    let client = ApiClient::new("http://127.0.0.1:9").unwrap();
    let err = client.species_detail("아무거나").await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}
