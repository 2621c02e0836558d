mod common;

use axum::http::StatusCode;
use common::{app, post};
use serde_json::json;

#[tokio::test]
async fn upsert_by_phone_with_role_permissions() {
    let (app, store) = app();
    let (status, body) = post(
        &app,
        "/team-members/upsert",
        json!({"name": "Caio", "phone": "200", "email": "Caio@Example.com"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let member = &body["data"];
    assert_eq!(member["role"], "Agent");
    assert_eq!(member["email"], "caio@example.com");
    assert_eq!(member["permissions"]["leads"], json!(["view", "create", "update"]));
    assert!(member["permissions"].get("automations").is_none());

    let (status, body) = post(
        &app,
        "/team-members/upsert",
        json!({"name": "Caio Lima", "phone": "200", "role": "Manager"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated = &body["data"];
    assert_eq!(updated["id"], member["id"]);
    assert_eq!(updated["name"], "Caio Lima");
    assert_eq!(updated["role"], "Manager");
    assert_eq!(updated["email"], "caio@example.com");
    assert!(updated["permissions"]["automations"].is_array());
    assert_eq!(store.count("team_members"), 1);
}

#[tokio::test]
async fn phone_only_update_keeps_name_and_email() {
    let (app, store) = app();
    post(
        &app,
        "/team-members/upsert",
        json!({"name": "Iara", "phone": "210", "email": "iara@example.com"}),
    )
    .await;

    let (status, body) = post(
        &app,
        "/team-members/upsert",
        json!({"phone": "210", "role": "Viewer"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let member = &body["data"];
    assert_eq!(member["role"], "Viewer");
    assert_eq!(member["name"], "Iara");
    assert_eq!(member["email"], "iara@example.com");
    assert_eq!(member["permissions"]["leads"], json!(["view"]));
    assert_eq!(store.count("team_members"), 1);

    let (status, body) = post(&app, "/team-members/upsert", json!({"phone": "211"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["missing"], json!(["name"]));
}

#[tokio::test]
async fn explicit_permissions_are_kept() {
    let (app, _) = app();
    let (_, body) = post(
        &app,
        "/team-members/upsert",
        json!({"name": "Duda", "phone": "300", "role": "Viewer", "permissions": {"leads": ["view", "export"]}}),
    )
    .await;
    assert_eq!(body["data"]["permissions"], json!({"leads": ["view", "export"]}));

    let (status, body) = post(
        &app,
        "/team-members/upsert",
        json!({"name": "Duda", "phone": "300", "permissions": ["view"]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn invalid_role_lists_roles() {
    let (app, _) = app();
    let (status, body) = post(
        &app,
        "/team-members/upsert",
        json!({"name": "Eva", "phone": "400", "role": "Owner"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["data"]["valid_values"],
        json!(["Admin", "Manager", "Agent", "Viewer"])
    );
}

#[tokio::test]
async fn email_cannot_move_between_phones() {
    let (app, _) = app();
    post(
        &app,
        "/team-members/upsert",
        json!({"name": "Eva", "phone": "400", "email": "eva@example.com"}),
    )
    .await;
    let (status, _) = post(
        &app,
        "/team-members/upsert",
        json!({"name": "Eva 2", "phone": "401", "email": "eva@example.com"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_only_rejects_existing_email() {
    let (app, store) = app();
    let member = json!({"name": "Fabi", "phone": "500", "email": "fabi@example.com", "role": "Admin"});
    let (status, body) = post(&app, "/team-members/create", member.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["permissions"]["team"].as_array().unwrap().len(), 5);

    let (status, body) = post(&app, "/team-members/create", member).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "A team member with email fabi@example.com already exists");

    let (status, body) = post(
        &app,
        "/team-members/create",
        json!({"name": "Gui", "phone": "500", "email": "gui@example.com"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "A team member with phone 500 already exists");
    assert_eq!(store.count("team_members"), 1);

    let (status, body) = post(&app, "/team-members/create", json!({"name": "Gui"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["missing"], json!(["email", "phone"]));
}

#[tokio::test]
async fn get_member_by_phone() {
    let (app, _) = app();
    post(&app, "/team-members/upsert", json!({"name": "Hugo", "phone": "600"})).await;
    let (status, body) = post(&app, "/team-members/get", json!({"phone": 600})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Hugo");

    let (status, _) = post(&app, "/team-members/get", json!({"phone": "601"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
