mod common;

use std::time::Duration;

use axum::{http::StatusCode, routing::post as route_post, Json, Router};
use common::{app_with, post};
use crm_functions::Notifier;
use serde_json::{json, Value};
use tokio::sync::mpsc;

/// 本地起一个接收通知的接口，收到的请求体写入 channel
async fn hook() -> (String, mpsc::UnboundedReceiver<Value>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new().route(
        "/lead",
        route_post(move |Json(body): Json<Value>| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(body);
                StatusCode::OK
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/lead", addr), rx)
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Value>) -> Value {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("notification not received")
        .expect("hook closed")
}

#[tokio::test]
async fn lead_is_forwarded_after_insert_and_update() {
    let (url, mut rx) = hook().await;
    let (app, _) = app_with(Notifier::new(Some(url)));

    let (status, _) = post(&app, "/leads/upsert", json!({"name": "Ana", "phone": "900"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let sent = next(&mut rx).await;
    assert_eq!(sent["event"], "lead");
    assert_eq!(sent["data"]["phone"], "900");
    assert_eq!(sent["data"]["stage"], "New");

    let (status, _) = post(&app, "/leads/upsert", json!({"phone": "900", "stage": "Won"})).await;
    assert_eq!(status, StatusCode::OK);
    let sent = next(&mut rx).await;
    assert_eq!(sent["data"]["stage"], "Won");
    assert_eq!(sent["data"]["name"], "Ana");
}

#[tokio::test]
async fn unreachable_endpoint_does_not_fail_request() {
    let (app, store) = app_with(Notifier::new(Some("http://127.0.0.1:9/lead".to_owned())));

    let (status, body) = post(&app, "/leads/upsert", json!({"name": "Bruno", "phone": "901"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);

    let (status, _) = post(&app, "/leads/upsert", json!({"phone": "901", "score": 80})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.count("leads"), 1);
}
