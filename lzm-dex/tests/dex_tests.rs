//! Dex browser tests against an in-process mock backend

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use lzm_common::events::{EventBus, UiEvent};
use lzm_common::{ApiClient, MemoryStore};
use lzm_dex::browser::LIST_NOT_DEPLOYED_MESSAGE;
use lzm_dex::{DexBrowser, DexEntry, DexFilter, DexSettings, DexStatus, DexStore, EditMode, GridView, RefreshOutcome};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn browser(base_url: String, debounce: Duration) -> (Arc<DexBrowser<GridView>>, Arc<Mutex<GridView>>) {
    let view = Arc::new(Mutex::new(GridView::default()));
    let browser = DexBrowser::new(
        ApiClient::new(base_url).unwrap(),
        DexStore::new(Arc::new(MemoryStore::new())),
        Arc::clone(&view),
        DexSettings {
            debounce,
            list_limit: 500,
        },
    );
    (Arc::new(browser), view)
}

fn counting_list(items: Value) -> (Router, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/api/species/list",
            get(|State((hits, items)): State<(Arc<AtomicUsize>, Value)>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({ "items": items }))
            }),
        )
        .with_state((Arc::clone(&hits), items));
    (router, hits)
}

fn entry(name: &str, summary: &str) -> DexEntry {
    DexEntry {
        name: name.to_string(),
        summary: summary.to_string(),
        ..DexEntry::template()
    }
}

#[tokio::test]
async fn test_search_shows_local_custom_entry_when_backend_has_none() {
    let (router, hits) = counting_list(json!([]));
    let (browser, view) = browser(spawn_backend(router).await, Duration::from_millis(10));
    browser
        .store()
        .add_custom(&entry("가면도마뱀붙이", "로컬에서 추가한 종"))
        .unwrap();

    let outcome = browser.refresh(DexFilter::new("가면도마뱀붙이", "")).await;

    assert_eq!(outcome, RefreshOutcome::Applied { items: 1 });
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    let view = view.lock().unwrap();
    assert_eq!(view.card_count, 1);
    assert_eq!(view.html.matches("<article class=\"dex-card\">").count(), 1);
    assert!(view.html.contains("가면도마뱀붙이"));
    assert!(view.html.contains("로컬에서 추가한 종"));
    assert_eq!(view.status, DexStatus::Hidden);
}

#[tokio::test]
async fn test_slow_older_response_is_discarded() {
    let router = Router::new().route(
        "/api/species/list",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            let q = params.get("q").cloned().unwrap_or_default();
            if q == "느림" {
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            Json(json!({ "items": [{ "종_한글명": q }] }))
        }),
    );
    let (browser, view) = browser(spawn_backend(router).await, Duration::from_millis(10));

    let (older, newer) = tokio::join!(
        browser.refresh(DexFilter::new("느림", "")),
        browser.refresh(DexFilter::new("빠름", "")),
    );

    assert_eq!(older, RefreshOutcome::Stale);
    assert_eq!(newer, RefreshOutcome::Applied { items: 1 });
    let view = view.lock().unwrap();
    assert!(view.html.contains("빠름"));
    assert!(!view.html.contains("느림"));
    assert_eq!(view.renders, 1);
}

#[tokio::test]
async fn test_rapid_filter_changes_fetch_once() {
    let (router, hits) = counting_list(json!([{ "종_한글명": "레오파드 게코" }]));
    let (browser, _view) = browser(spawn_backend(router).await, Duration::from_millis(50));

    let (first, second) = tokio::join!(
        browser.filter_changed(DexFilter::new("레", "")),
        browser.filter_changed(DexFilter::new("레오", "")),
    );

    assert_eq!(first, None);
    assert_eq!(second, Some(RefreshOutcome::Applied { items: 1 }));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_list_endpoint_reports_deploy_hint() {
    let router = Router::new().route(
        "/api/species/list",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"error": {"code": "SPECIES_NOT_FOUND", "message": "Species not found: list"}})),
            )
        }),
    );
    let (browser, view) = browser(spawn_backend(router).await, Duration::from_millis(10));

    let outcome = browser.refresh(DexFilter::default()).await;

    assert_eq!(outcome, RefreshOutcome::Failed(LIST_NOT_DEPLOYED_MESSAGE.to_string()));
    let view = view.lock().unwrap();
    assert!(view.status.is_error());
    assert_eq!(view.status.message(), LIST_NOT_DEPLOYED_MESSAGE);
    assert_eq!(view.card_count, 0);
}

#[tokio::test]
async fn test_failed_refetch_empties_grid_and_cache() {
    let router = Router::new().route(
        "/api/species/list",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            match params.get("q").map(String::as_str) {
                Some("게코") => (
                    StatusCode::OK,
                    Json(json!({ "items": [{ "종_한글명": "레오파드 게코" }] })),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": { "message": "internal" } })),
                ),
            }
        }),
    );
    let (browser, view) = browser(spawn_backend(router).await, Duration::from_millis(10));

    let first = browser.refresh(DexFilter::new("게코", "")).await;
    assert_eq!(first, RefreshOutcome::Applied { items: 1 });
    assert_eq!(view.lock().unwrap().card_count, 1);

    let second = browser.refresh(DexFilter::default()).await;
    assert!(matches!(second, RefreshOutcome::Failed(ref msg) if msg.contains("(500)")));
    {
        let view = view.lock().unwrap();
        assert!(view.status.is_error());
        assert_eq!(view.card_count, 0);
        assert!(!view.html.contains("레오파드 게코"));
    }

    // no active filter, so the edit re-renders from the emptied cache only
    browser
        .store()
        .add_custom(&entry("가면도마뱀붙이", ""))
        .unwrap();
    browser.after_local_edit().await;
    let view = view.lock().unwrap();
    assert!(!view.html.contains("레오파드 게코"));
    assert!(view.html.contains("가면도마뱀붙이"));
}

#[tokio::test]
async fn test_edit_with_active_filter_rerenders_and_refetches() {
    let (router, hits) = counting_list(json!([
        { "종_한글명": "레오파드 게코", "종류": "Gecko", "사육_요약": "원래 설명", "사육_난이도_5단계": 1 }
    ]));
    let (browser, view) = browser(spawn_backend(router).await, Duration::from_millis(10));
    browser.refresh(DexFilter::new("게코", "")).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let mut edited = DexEntry::from_record(&browser.record_for_edit("레오파드 게코").await);
    edited.summary = "수정한 설명".to_string();
    edited.difficulty = 3;
    browser.save_entry(&edited, EditMode::Edit).await.unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    let view = view.lock().unwrap();
    assert_eq!(view.renders, 3);
    assert_eq!(view.card_count, 1);
    assert!(view.html.contains("수정한 설명"));
    assert!(view.html.contains("Lv.3"));
    assert!(!view.html.contains("원래 설명"));
}

#[tokio::test]
async fn test_edit_without_filter_rerenders_from_cache() {
    let (router, hits) = counting_list(json!([{ "종_한글명": "비어디드래곤" }]));
    let (browser, view) = browser(spawn_backend(router).await, Duration::from_millis(10));
    browser.refresh(DexFilter::default()).await;

    browser
        .save_entry(&entry("가면도마뱀붙이", ""), EditMode::Create)
        .await
        .unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    let view = view.lock().unwrap();
    assert_eq!(view.card_count, 2);
}

#[tokio::test]
async fn test_record_for_edit_falls_back_to_detail_with_override() {
    let router = Router::new()
        .route("/api/species/list", get(|| async { Json(json!({ "items": [] })) }))
        .route(
            "/api/species/:name",
            get(|Path(name): Path<String>| async move {
                Json(json!({ "종_한글명": name, "종류": "Skink", "식성타입": "잡식" }))
            }),
        );
    let (browser, _view) = browser(spawn_backend(router).await, Duration::from_millis(10));
    let mut patched = entry("블루텅 스킨크", "");
    patched.species_type = "Skink".into();
    patched.diet = "초식".into();
    browser.store().save_override(&patched).unwrap();

    let record = browser.record_for_edit("블루텅 스킨크").await;

    assert_eq!(record.name(), Some("블루텅 스킨크"));
    assert_eq!(record.text("식성타입"), Some("초식"));
}

#[tokio::test]
async fn test_record_for_edit_unknown_species_is_blank() {
    let router = Router::new().route(
        "/api/species/:name",
        get(|| async { (StatusCode::NOT_FOUND, Json(json!({"error": {"message": "not found"}}))) }),
    );
    let (browser, _view) = browser(spawn_backend(router).await, Duration::from_millis(10));

    let record = browser.record_for_edit("신종").await;

    assert_eq!(record.name(), Some("신종"));
    assert_eq!(record.as_map().len(), 1);
}

#[tokio::test]
async fn test_filter_event_triggers_debounced_fetch() {
    let (router, hits) = counting_list(json!([{ "종_한글명": "레오파드 게코" }]));
    let (browser, view) = browser(spawn_backend(router).await, Duration::from_millis(30));
    let bus = EventBus::new();
    Arc::clone(&browser).register(&bus);

    for query in ["레", "레오", "레오파"] {
        bus.dispatch(UiEvent::FilterChanged {
            query: query.to_string(),
            difficulty: String::new(),
        })
        .await;
    }
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(view.lock().unwrap().card_count, 1);
}
