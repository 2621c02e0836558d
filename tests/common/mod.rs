#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use crm_functions::{database::Reference, router, AppState, MemoryStore, Notifier};
use serde_json::Value;
use tower::ServiceExt;

pub const CONTACT: &str = "ext-contact-1";
pub const CALENDAR: &str = "ext-calendar-1";
pub const PIPELINE: &str = "Sales";

/// 内存存储 + 已写入的联系人、日历、管道
pub fn app() -> (Router, Arc<MemoryStore>) {
    app_with(Notifier::disabled())
}

pub fn app_with(notifier: Notifier) -> (Router, Arc<MemoryStore>) {
    let store = MemoryStore::new();
    store.seed(Reference::Contact, CONTACT, "contact-1");
    store.seed(Reference::Calendar, CALENDAR, "calendar-1");
    store.seed(Reference::Pipeline, PIPELINE, "pipeline-1");
    let state = AppState::new(store, notifier);
    let store = state.store.clone();
    (router(state), store)
}

pub async fn call(app: &Router, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    let res = app.clone().oneshot(request).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    call(app, Method::POST, uri, Body::from(body.to_string())).await
}
