use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use image::{ImageBuffer, ImageFormat, Rgb};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use waste_sorter_lib::config::AppConfig;
use waste_sorter_lib::models::classify_types::WasteCategory;
use waste_sorter_lib::models::session_types::WorkflowPhase;
use waste_sorter_lib::server::{build_pipeline, router, AppState};
use waste_sorter_lib::services::capture;
use waste_sorter_lib::services::classifier::rules::UNCERTAIN_MESSAGE;
use waste_sorter_lib::services::counter_store::{CounterStore, SqliteCounterStore};
use waste_sorter_lib::services::transport::{HttpTransport, LocalTransport};
use waste_sorter_lib::services::workflow::{Transition, WorkflowController};

#[derive(Clone)]
struct OracleScript {
    status: StatusCode,
    body: String,
    hits: Arc<AtomicUsize>,
}

async fn fake_oracle(
    State(script): State<OracleScript>,
    Query(query): Query<HashMap<String, String>>,
    Json(request): Json<serde_json::Value>,
) -> Response {
    script.hits.fetch_add(1, Ordering::SeqCst);
    assert_eq!(query.get("key").map(String::as_str), Some("test-key"));
    assert!(request["contents"][0]["parts"][1]["inline_data"]["data"].is_string());
    (script.status, script.body.clone()).into_response()
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn spawn_oracle(status: StatusCode, body: &str) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let script = OracleScript {
        status,
        body: body.to_string(),
        hits: hits.clone(),
    };
    let app = Router::new().fallback(fake_oracle).with_state(script);
    (spawn(app).await, hits)
}

fn label_body(text: &str) -> String {
    serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    })
    .to_string()
}

fn config_for(oracle: &str, data_dir: &std::path::Path) -> AppConfig {
    AppConfig {
        api_key: Some("test-key".into()),
        api_base: oracle.to_string(),
        data_dir: data_dir.to_path_buf(),
        timeout: Duration::from_secs(5),
        ..AppConfig::default()
    }
}

fn write_png(dir: &std::path::Path) -> std::path::PathBuf {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(3, 3, Rgb([120, 60, 0]));
    let path = dir.join("item.png");
    img.save_with_format(&path, ImageFormat::Png).unwrap();
    path
}

#[tokio::test]
async fn local_workflow_sorts_a_battery() {
    let (oracle, hits) = spawn_oracle(StatusCode::OK, &label_body(" Battery ")).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&oracle, dir.path());

    let store = SqliteCounterStore::open(config.stats_path()).unwrap();
    let transport = LocalTransport::new(build_pipeline(&config).unwrap());
    let mut controller = WorkflowController::new(transport, store.clone());

    controller.acquire(capture::read_image_file(&write_png(dir.path())).unwrap());
    match controller.analyze().await {
        Transition::Rendered(rendered) => {
            assert_eq!(rendered.response.object_name, "battery");
            assert_eq!(rendered.response.category, WasteCategory::Hazardous);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(store.get().unwrap(), 1);
}

#[tokio::test]
async fn empty_oracle_answer_becomes_unknown_item() {
    let (oracle, _) = spawn_oracle(StatusCode::OK, r#"{"candidates":[]}"#).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&oracle, dir.path());

    let pipeline = build_pipeline(&config).unwrap();
    let request = waste_sorter_lib::models::classify_types::ClassifyRequest::new(
        capture::read_image_file(&write_png(dir.path())).unwrap().as_str(),
    );
    let response = pipeline.classify_request(&request).await.unwrap();
    assert_eq!(response.object_name, "unknown item");
    assert_eq!(response.category, WasteCategory::Recyclable);
    assert_eq!(response.awareness_message, UNCERTAIN_MESSAGE);
}

#[tokio::test]
async fn http_workflow_round_trip_and_counter_persistence() {
    let (oracle, _) = spawn_oracle(StatusCode::OK, &label_body("banana peel")).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&oracle, dir.path());

    let server = spawn(router(AppState {
        pipeline: Arc::new(build_pipeline(&config).unwrap()),
    }))
    .await;

    let image = capture::read_image_file(&write_png(dir.path())).unwrap();
    {
        let store = SqliteCounterStore::open(config.stats_path()).unwrap();
        let transport = HttpTransport::new(&server, Duration::from_secs(5)).unwrap();
        let mut controller = WorkflowController::new(transport, store);
        controller.acquire(image.clone());
        match controller.analyze().await {
            Transition::Rendered(rendered) => {
                assert_eq!(rendered.response.category, WasteCategory::Organic)
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    // A fresh session picks the counter up from disk.
    let store = SqliteCounterStore::open(config.stats_path()).unwrap();
    let transport = HttpTransport::new(&server, Duration::from_secs(5)).unwrap();
    let mut controller = WorkflowController::new(transport, store);
    assert_eq!(controller.items_sorted(), 1);

    controller.acquire(image);
    controller.analyze().await;
    assert_eq!(controller.items_sorted(), 2);
}

#[tokio::test]
async fn oracle_error_keeps_image_and_counter() {
    let (oracle, hits) = spawn_oracle(StatusCode::SERVICE_UNAVAILABLE, "overloaded").await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&oracle, dir.path());

    let server = spawn(router(AppState {
        pipeline: Arc::new(build_pipeline(&config).unwrap()),
    }))
    .await;

    let store = SqliteCounterStore::open(config.stats_path()).unwrap();
    store.set(10).unwrap();
    let transport = HttpTransport::new(&server, Duration::from_secs(5)).unwrap();
    let mut controller = WorkflowController::new(transport, store.clone());

    let image = capture::read_image_file(&write_png(dir.path())).unwrap();
    controller.acquire(image.clone());

    assert!(matches!(controller.analyze().await, Transition::Failed { .. }));
    assert_eq!(controller.phase(), WorkflowPhase::Previewing);
    assert_eq!(controller.current_image(), Some(&image));
    assert_eq!(store.get().unwrap(), 10);
    // No local retry.
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
