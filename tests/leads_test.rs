mod common;

use axum::{
    body::Body,
    http::{Method, StatusCode},
};
use common::{app, call, post, PIPELINE};
use serde_json::json;

#[tokio::test]
async fn creates_lead_with_defaults() {
    let (app, store) = app();
    let (status, body) = post(
        &app,
        "/leads/upsert",
        json!({"name": "Ana Souza", "phone": "5511999990000", "pipeline": PIPELINE}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Lead created successfully");
    let lead = &body["data"];
    assert_eq!(lead["stage"], "New");
    assert_eq!(lead["score"], 0);
    assert_eq!(lead["source"], "Website");
    assert_eq!(lead["pipeline_id"], "pipeline-1");
    assert_eq!(lead["contact_id"], json!(null));
    assert_eq!(store.count("leads"), 1);
}

#[tokio::test]
async fn existing_phone_updates_instead_of_duplicating() {
    let (app, store) = app();
    let (_, first) = post(
        &app,
        "/leads/upsert",
        json!({"name": "Ana", "phone": "5511999990000", "email": "ana@example.com", "score": 10}),
    )
    .await;
    let (status, second) = post(
        &app,
        "/leads/upsert",
        json!({"name": "Ana Souza", "phone": "5511999990000", "stage": "Qualified", "score": "55"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["message"], "Lead updated successfully");
    assert_eq!(store.count("leads"), 1);
    let lead = &second["data"];
    assert_eq!(lead["id"], first["data"]["id"]);
    assert_eq!(lead["name"], "Ana Souza");
    assert_eq!(lead["stage"], "Qualified");
    assert_eq!(lead["score"], 55);
    // 没有提交的字段保持原值
    assert_eq!(lead["email"], "ana@example.com");
    assert_eq!(lead["created_at"], first["data"]["created_at"]);
}

#[tokio::test]
async fn phone_only_update_keeps_other_fields() {
    let (app, store) = app();
    let (_, first) = post(
        &app,
        "/leads/upsert",
        json!({"name": "Ana", "phone": "77", "email": "ana@example.com", "pipeline": PIPELINE}),
    )
    .await;

    let (status, body) = post(&app, "/leads/upsert", json!({"phone": "77", "stage": "Won"})).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let lead = &body["data"];
    assert_eq!(lead["stage"], "Won");
    assert_eq!(lead["name"], "Ana");
    assert_eq!(lead["email"], "ana@example.com");
    assert_eq!(lead["pipeline_id"], first["data"]["pipeline_id"]);
    assert_eq!(store.count("leads"), 1);
}

#[tokio::test]
async fn name_is_required_for_new_lead() {
    let (app, store) = app();
    let (status, body) = post(&app, "/leads/upsert", json!({"phone": "78", "stage": "Won"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["missing"], json!(["name"]));
    assert_eq!(store.count("leads"), 0);
}

#[tokio::test]
async fn phone_is_always_required() {
    let (app, store) = app();
    let (status, body) = post(&app, "/leads/upsert", json!({"email": "x@example.com"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Missing required fields: phone");
    assert_eq!(body["data"]["missing"], json!(["phone"]));
    assert_eq!(store.count("leads"), 0);
}

#[tokio::test]
async fn unknown_stage_returns_allow_list() {
    let (app, _) = app();
    let (status, body) = post(
        &app,
        "/leads/upsert",
        json!({"name": "Ana", "phone": "1", "stage": "Hot"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["data"]["valid_values"],
        json!(["New", "Contacted", "Qualified", "Proposal", "Negotiation", "Won", "Lost"])
    );
    assert_eq!(body["data"]["field"], "stage");
}

#[tokio::test]
async fn score_is_bounded() {
    let (app, _) = app();
    for score in [json!(-1), json!(101), json!("abc")] {
        let (status, body) = post(
            &app,
            "/leads/upsert",
            json!({"name": "Ana", "phone": "1", "score": score}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    }
}

#[tokio::test]
async fn unknown_references_become_null() {
    let (app, _) = app();
    let (status, body) = post(
        &app,
        "/leads/upsert",
        json!({"name": "Ana", "phone": "1", "pipeline": "Nope", "contact_id": "missing"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["pipeline_id"], json!(null));
    assert_eq!(body["data"]["contact_id"], json!(null));
}

#[tokio::test]
async fn get_by_phone() {
    let (app, _) = app();
    let (status, body) = post(&app, "/leads/get", json!({"phone": "42"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Lead 42 not found");

    post(&app, "/leads/upsert", json!({"name": "Ana", "phone": 42})).await;
    let (status, body) = post(&app, "/leads/get", json!({"phone": "42"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ana");
}

#[tokio::test]
async fn only_post_and_options_are_accepted() {
    let (app, _) = app();
    let (status, body) = call(&app, Method::GET, "/leads/upsert", Body::empty()).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);

    let (status, _) = call(&app, Method::OPTIONS, "/leads/upsert", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let (app, _) = app();
    let (status, body) = call(&app, Method::POST, "/leads/upsert", Body::from("{\"name\":")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = call(&app, Method::POST, "/leads/upsert", Body::empty()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_check() {
    let (app, _) = app();
    let (status, body) = call(&app, Method::GET, "/health", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}
