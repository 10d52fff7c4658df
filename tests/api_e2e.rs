use actix_web::{web, App, HttpServer};
use ragvec::{StoreConfig, VectorStore};
use reqwest::Client;
use serde_json::json;
use std::net::TcpListener;
use tokio::time::{sleep, Duration};

/// Find a free port by binding to port 0
fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Start a server over a fresh store, returning its base URL and handle
async fn start_server() -> (String, actix_web::dev::ServerHandle) {
    let port = free_port();
    let store: web::Data<dyn VectorStore> = web::Data::from(StoreConfig::default().build());

    let server = HttpServer::new(move || App::new().app_data(store.clone()).configure(ragvec::server::config))
        .bind(format!("127.0.0.1:{}", port))
        .unwrap()
        .run();
    let handle = server.handle();
    tokio::spawn(server);
    sleep(Duration::from_millis(200)).await;

    (format!("http://127.0.0.1:{}", port), handle)
}

#[actix_web::test]
async fn test_upsert_and_query() {
    let (base, handle) = start_server().await;
    let client = Client::new();

    // --- Upsert two documents ---
    for (id, vector, text) in [("d1", [1.0, 0.0, 0.0], "hello"), ("d2", [0.0, 1.0, 0.0], "goodbye")] {
        let resp = client
            .post(format!("{}/upsert", base))
            .json(&json!({"id": id, "vector": vector, "metadata": {"text": text}}))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body, json!({"status": "upserted", "id": id}));
    }

    // --- Query near d1 ---
    let resp = client
        .post(format!("{}/query", base))
        .json(&json!({"vector": [0.9, 0.1, 0.0], "top_k": 1}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], "d1");
    assert_eq!(results[0]["metadata"], json!({"text": "hello"}));
    assert!((results[0]["score"].as_f64().unwrap() - 0.994).abs() < 1e-3);

    // --- Equidistant query: tie keeps insertion order ---
    let resp = client
        .post(format!("{}/query", base))
        .json(&json!({"vector": [0.5, 0.5, 0.0], "top_k": 2}))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = resp.json().await.unwrap();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["id"], "d1");
    assert_eq!(results[1]["id"], "d2");
    assert_eq!(results[0]["score"], results[1]["score"]);
    assert!((results[0]["score"].as_f64().unwrap() - 0.7071).abs() < 1e-3);

    handle.stop(true).await;
}

#[actix_web::test]
async fn test_query_defaults_and_empty_store() {
    let (base, handle) = start_server().await;
    let client = Client::new();

    // Empty store answers with no results
    let resp = client
        .post(format!("{}/query", base))
        .json(&json!({"vector": [1.0, 0.0]}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["results"], json!([]));

    for i in 0..5 {
        client
            .post(format!("{}/upsert", base))
            .json(&json!({"id": format!("v{}", i), "vector": [1.0, i as f32]}))
            .send()
            .await
            .unwrap();
    }

    // top_k defaults to 3, metadata defaults to an empty object
    let resp = client
        .post(format!("{}/query", base))
        .json(&json!({"vector": [1.0, 0.0]}))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["id"], "v0");
    assert_eq!(results[0]["metadata"], json!({}));

    // --- Health reports the record count ---
    let resp = client.get(format!("{}/health", base)).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"status": "ok", "records": 5}));

    handle.stop(true).await;
}

#[actix_web::test]
async fn test_dimension_mismatch_is_bad_request() {
    let (base, handle) = start_server().await;
    let client = Client::new();

    client
        .post(format!("{}/upsert", base))
        .json(&json!({"id": "a", "vector": [1.0, 0.0, 0.0]}))
        .send()
        .await
        .unwrap();

    // --- Upsert with the wrong dimension ---
    let resp = client
        .post(format!("{}/upsert", base))
        .json(&json!({"id": "b", "vector": [1.0, 0.0]}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("dimension mismatch"));

    // --- Query with the wrong dimension ---
    let resp = client
        .post(format!("{}/query", base))
        .json(&json!({"vector": [1.0, 0.0], "top_k": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Negative top_k never reaches the store
    let resp = client
        .post(format!("{}/query", base))
        .json(&json!({"vector": [1.0, 0.0, 0.0], "top_k": -1}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = client.get(format!("{}/health", base)).send().await.unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["records"], 1);

    handle.stop(true).await;
}
