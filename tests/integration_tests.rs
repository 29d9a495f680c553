// Integration tests: HTTP ingestion and chart endpoints

use axum_test::TestServer;
use chartfill::config::AppConfig;
use chartfill::history_repo::HistoryRepo;
use chartfill::routes;
use chrono::{Duration, SecondsFormat, Utc};
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;

const TEST_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[database]
path = "data/test.db"
max_pool_size = 2

[charts]
load_interval_secs = 60
ping_interval_secs = 60
default_hours = 1.0
max_hours = 24.0
max_grid_points = 1000
"#;

async fn test_server(dir: &TempDir) -> TestServer {
    let config = AppConfig::load_from_str(TEST_CONFIG).unwrap();
    let path = dir.path().join("test.db");
    let repo = HistoryRepo::connect(path.to_str().unwrap(), 2, 24)
        .await
        .unwrap();
    repo.init().await.unwrap();
    TestServer::try_new(routes::app(Arc::new(repo), config)).unwrap()
}

fn minutes_ago(minutes: i64) -> String {
    (Utc::now() - Duration::minutes(minutes)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[tokio::test]
async fn test_version_endpoint() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("chartfill"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_ingest_reports_rejected_samples() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let response = server
        .post("/api/records/load")
        .json(&json!([
            { "client": "n1", "time": minutes_ago(5), "cpu": 10.0 },
            { "client": "n1", "time": "not a time", "cpu": 20.0 }
        ]))
        .await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["accepted"], 1);
    assert_eq!(json["rejected"][0]["index"], 1);
}

#[tokio::test]
async fn test_load_chart_is_gap_filled() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    server
        .post("/api/records/load")
        .json(&json!([
            { "client": "n1", "time": minutes_ago(30), "cpu": 10.0, "ram": 1048576.0 },
            { "client": "n1", "time": minutes_ago(20), "cpu": 20.0, "ram": 2097152.0 },
            { "client": "n1", "updated_at": minutes_ago(2), "cpu": 30.0, "ram": 3145728.0 },
            { "client": "n2", "time": minutes_ago(2), "cpu": 99.0 }
        ]))
        .await
        .assert_status_ok();

    let response = server
        .get("/api/charts/load")
        .add_query_param("uuid", "n1")
        .add_query_param("hours", 1)
        .await;
    response.assert_status_ok();
    let json: Value = response.json();
    let points = json["points"].as_array().unwrap();
    assert_eq!(points.len(), 61);

    let cpu: Vec<f64> = points.iter().filter_map(|p| p["cpu"].as_f64()).collect();
    assert_eq!(cpu, vec![10.0, 20.0, 30.0]);
    assert!(points.iter().all(|p| p["client"] == "n1"));
    assert!(points.iter().all(|p| p.as_object().unwrap().contains_key("net_in")));

    let summary = json["summary"].as_array().unwrap();
    let cpu_summary = summary.iter().find(|s| s["metric"] == "cpu").unwrap();
    assert_eq!(cpu_summary["avg"], 20.0);
    assert_eq!(cpu_summary["latest"], 30.0);
    let ram_summary = summary.iter().find(|s| s["metric"] == "ram").unwrap();
    assert_eq!(ram_summary["avg_display"], "2.00 MB");
    assert!(summary.iter().all(|s| s["metric"] != "gpu"));
}

#[tokio::test]
async fn test_load_chart_for_unknown_node_is_empty() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let response = server
        .get("/api/charts/load")
        .add_query_param("uuid", "nobody")
        .await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["points"], json!([]));
    assert_eq!(json["summary"], json!([]));
}

#[tokio::test]
async fn test_load_chart_rejects_bad_parameters() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    server
        .get("/api/charts/load")
        .add_query_param("uuid", "n1")
        .add_query_param("hours", 0)
        .await
        .assert_status_bad_request();
    server
        .get("/api/charts/load")
        .add_query_param("uuid", "n1")
        .add_query_param("hours", 48)
        .await
        .assert_status_bad_request();
    server
        .get("/api/charts/load")
        .add_query_param("uuid", "n1")
        .add_query_param("cut_peak", "cpu,bogus")
        .await
        .assert_status_bad_request();
    server
        .get("/api/charts/load")
        .add_query_param("uuid", "n1")
        .add_query_param("interval", 0)
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_chart_rejects_grids_finer_than_native_or_too_large() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    server
        .get("/api/charts/load")
        .add_query_param("uuid", "n1")
        .add_query_param("interval", 30)
        .await
        .assert_status_bad_request();
    server
        .get("/api/charts/ping")
        .add_query_param("task_id", 1)
        .add_query_param("interval", 1)
        .await
        .assert_status_bad_request();
    // 24 h at 60 s is 1441 slots, over the configured 1000.
    server
        .get("/api/charts/load")
        .add_query_param("uuid", "n1")
        .add_query_param("hours", 24)
        .await
        .assert_status_bad_request();
    server
        .get("/api/charts/load")
        .add_query_param("uuid", "n1")
        .add_query_param("hours", 24)
        .add_query_param("interval", 120)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_chart_rejects_interval_beyond_time_range() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    server
        .post("/api/records/load")
        .json(&json!([
            { "client": "n1", "time": minutes_ago(10), "cpu": 1.0 },
            { "client": "n1", "time": minutes_ago(5), "cpu": 2.0 }
        ]))
        .await
        .assert_status_ok();
    server
        .get("/api/charts/load")
        .add_query_param("uuid", "n1")
        .add_query_param("interval", u64::MAX)
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_load_summary_reports_observed_values_when_clipped() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let samples: Vec<Value> = (0..40)
        .map(|i| {
            let cpu = if i == 12 { 1000.0 } else { 10.0 };
            json!({ "client": "n1", "time": minutes_ago(45 - i), "cpu": cpu })
        })
        .collect();
    server
        .post("/api/records/load")
        .json(&samples)
        .await
        .assert_status_ok();

    let response = server
        .get("/api/charts/load")
        .add_query_param("uuid", "n1")
        .add_query_param("hours", 1)
        .add_query_param("cut_peak", "cpu")
        .await;
    response.assert_status_ok();
    let json: Value = response.json();
    let cpu: Vec<f64> = json["points"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["cpu"].as_f64())
        .collect();
    assert_eq!(cpu.len(), 40);
    assert_eq!(cpu.iter().cloned().fold(f64::MIN, f64::max), 15.0);

    let summary = json["summary"].as_array().unwrap();
    let cpu_summary = summary.iter().find(|s| s["metric"] == "cpu").unwrap();
    assert_eq!(cpu_summary["max"], 1000.0);
    assert_eq!(cpu_summary["min"], 10.0);
}

#[tokio::test]
async fn test_load_compare_merges_nodes_per_metric() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    server
        .post("/api/records/load")
        .json(&json!([
            { "client": "n1", "time": minutes_ago(10), "cpu": 10.0, "ram": 1.0 },
            { "client": "n2", "time": minutes_ago(10), "cpu": 30.0 },
            { "client": "n1", "time": minutes_ago(5), "cpu": 20.0 },
            { "client": "n2", "time": minutes_ago(5), "cpu": 40.0 },
            { "client": "n3", "time": minutes_ago(5), "cpu": 99.0 }
        ]))
        .await
        .assert_status_ok();

    let response = server
        .get("/api/charts/load/compare")
        .add_query_param("uuids", "n2,n1")
        .add_query_param("metric", "cpu")
        .add_query_param("hours", 1)
        .await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["metric"], "cpu");

    let points = json["points"].as_array().unwrap();
    assert_eq!(points.len(), 61);
    for p in points {
        let obj = p.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert!(obj.contains_key("n1_cpu") && obj.contains_key("n2_cpu"));
    }
    let n1: Vec<f64> = points.iter().filter_map(|p| p["n1_cpu"].as_f64()).collect();
    assert_eq!(n1, vec![10.0, 20.0]);
    let n2: Vec<f64> = points.iter().filter_map(|p| p["n2_cpu"].as_f64()).collect();
    assert_eq!(n2, vec![30.0, 40.0]);

    let nodes = json["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0]["node_id"], "n1");
    assert_eq!(nodes[0]["summary"]["avg"], 15.0);
    assert_eq!(nodes[1]["summary"]["max"], 40.0);
}

#[tokio::test]
async fn test_load_compare_rejects_bad_parameters() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    server
        .get("/api/charts/load/compare")
        .add_query_param("uuids", " , ")
        .add_query_param("metric", "cpu")
        .await
        .assert_status_bad_request();
    server
        .get("/api/charts/load/compare")
        .add_query_param("uuids", "n1")
        .add_query_param("metric", "bogus")
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_ping_chart_merges_nodes() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    server
        .post("/api/records/ping")
        .json(&json!([
            { "task_id": 1, "client": "a", "time": minutes_ago(10), "value": 12.0 },
            { "task_id": 1, "client": "b", "time": minutes_ago(10), "value": 40.0 },
            { "task_id": 1, "client": "a", "time": minutes_ago(5), "value": -1 },
            { "task_id": 1, "client": "b", "time": minutes_ago(5), "value": 44.0 },
            { "task_id": 2, "client": "a", "time": minutes_ago(5), "value": 1.0 }
        ]))
        .await
        .assert_status_ok();

    let response = server
        .get("/api/charts/ping")
        .add_query_param("task_id", 1)
        .add_query_param("hours", 1)
        .await;
    response.assert_status_ok();
    let json: Value = response.json();

    let points = json["points"].as_array().unwrap();
    assert_eq!(points.len(), 61);
    for p in points {
        let obj = p.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert!(obj.contains_key("time") && obj.contains_key("a") && obj.contains_key("b"));
    }
    let b: Vec<f64> = points.iter().filter_map(|p| p["b"].as_f64()).collect();
    assert_eq!(b, vec![40.0, 44.0]);
    let a: Vec<f64> = points.iter().filter_map(|p| p["a"].as_f64()).collect();
    assert_eq!(a, vec![12.0]);

    let nodes = json["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0]["node_id"], "a");
    assert_eq!(nodes[0]["loss_percent"], 50.0);
    assert_eq!(nodes[1]["latency"]["avg"], 42.0);
}

#[tokio::test]
async fn test_ping_chart_requires_task_id() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    server
        .get("/api/charts/ping")
        .await
        .assert_status_bad_request();
}
