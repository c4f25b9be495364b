use std::net::SocketAddr;

use calc_api::protocol::{ErrorBody, HistoryResponse, SaveResponse};
use calc_api::{start, ServerOptions};
use calc_store::SqliteStore;
use serde_json::{json, Value};

async fn spawn_server() -> String {
    let store = SqliteStore::in_memory().unwrap();
    let opts = ServerOptions {
        bind: "127.0.0.1:0".into(),
        ..Default::default()
    };
    let (addr, _handle): (SocketAddr, _) = start(store, opts).await.unwrap();
    format!("http://127.0.0.1:{}", addr.port())
}

fn quadratic_record(c: i64) -> Value {
    json!({
        "calculatorType": "quadratic-equation",
        "input": {"a": 1, "b": -3, "c": c},
        "result": {"discriminant": 9 - 4 * c},
        "steps": [{"description": "Discriminant", "value": (9 - 4 * c).to_string()}]
    })
}

#[tokio::test]
async fn test_save_then_read_back_latest() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let mut last_id = String::new();
    for c in [0, 1, 2] {
        let resp = client
            .post(format!("{base}/api/calculate"))
            .json(&quadratic_record(c))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let saved: SaveResponse = resp.json().await.unwrap();
        assert!(saved.success);
        assert_eq!(saved.message, "Calculation saved successfully");
        last_id = saved.calculation_id;
    }

    let hist: HistoryResponse = client
        .get(format!("{base}/api/history/quadratic-equation?limit=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(hist.success);
    assert_eq!(hist.history.len(), 1);
    let rec = &hist.history[0];
    assert_eq!(rec.id, last_id);
    assert_eq!(rec.input, json!({"a": 1, "b": -3, "c": 2}));
    assert_eq!(rec.steps[0].value, "1");
}

#[tokio::test]
async fn test_history_limit_defaults_and_type_filter() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    for c in 0..12 {
        client
            .post(format!("{base}/api/calculate"))
            .json(&quadratic_record(c))
            .send()
            .await
            .unwrap();
    }

    for query in ["", "?limit=abc", "?limit=0"] {
        let hist: HistoryResponse = client
            .get(format!("{base}/api/history/quadratic-equation{query}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(hist.history.len(), 10, "query {query:?}");
    }

    let other: HistoryResponse = client
        .get(format!("{base}/api/history/matrix"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(other.history.is_empty());
}

#[tokio::test]
async fn test_save_with_missing_field_is_500() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/calculate"))
        .json(&json!({"input": {"a": 1}, "result": 2}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: ErrorBody = resp.json().await.unwrap();
    assert!(!body.success);
    assert_eq!(body.message, "Error saving calculation");
    assert!(body.error.contains("calculatorType"));

    let resp = client
        .post(format!("{base}/api/calculate"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
}

#[tokio::test]
async fn test_compute_endpoint() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/compute/lcm-gcd"))
        .json(&json!({"numbers": [12, 18]}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["calculatorType"], "lcm-gcd");
    assert_eq!(body["result"]["lcm"], 36);
    assert_eq!(body["result"]["gcd"], 6);
    assert!(body["steps"].as_array().is_some_and(|s| !s.is_empty()));

    let resp = client
        .post(format!("{base}/api/compute/derivative"))
        .json(&json!({"expression": "sin(x)"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: ErrorBody = resp.json().await.unwrap();
    assert!(body.error.contains("polynomial"));

    let resp = client
        .post(format!("{base}/api/compute/horoscope"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_compute_huge_permutation_is_rejected() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/compute/permutation-combination"))
        .timeout(std::time::Duration::from_secs(10))
        .json(&json!({"n": 9_000_000_000_000_000_000u64, "r": 9_000_000_000_000_000_000u64}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: ErrorBody = resp.json().await.unwrap();
    assert!(body.error.contains("too large"));
}

#[tokio::test]
async fn test_catalogue_and_health() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let health = client
        .get(format!("{base}/healthz"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(health, "ok");

    let cat: Value = client
        .get(format!("{base}/api/calculators"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = cat["calculators"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["calculatorType"].as_str())
        .collect();
    assert!(names.contains(&"integral"));
    assert!(names.contains(&"weighted-grade"));
}
