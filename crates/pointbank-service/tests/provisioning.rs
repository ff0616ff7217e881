//! Provisioning integration tests (service API key).

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use pointbank_core::{Actor, UserId};
use pointbank_store::Store;
use serde_json::json;

#[tokio::test]
async fn provisioning_requires_service_key() {
    let harness = TestHarness::new();

    harness
        .server
        .post("/v1/admin/users")
        .json(&json!({ "scan_id": "qr-1", "name": "Ada" }))
        .await
        .assert_status_unauthorized();

    harness
        .server
        .post("/v1/admin/users")
        .add_header("x-api-key", "wrong-key")
        .json(&json!({ "scan_id": "qr-1", "name": "Ada" }))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn create_user_starts_at_zero() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/admin/users")
        .add_header("x-api-key", &harness.service_api_key)
        .add_header("x-service-name", "registration")
        .json(&json!({ "scan_id": "qr-1", "name": "Ada" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["scan_id"], "qr-1");
    assert_eq!(body["points"], 0);
    assert_eq!(body["status"]["state"], "active");

    let id: UserId = body["id"].as_str().unwrap().parse().unwrap();
    assert_eq!(harness.balance(&id), 0);
}

#[tokio::test]
async fn duplicate_scan_id_conflicts() {
    let harness = TestHarness::new();
    harness.seed_user("qr-1");

    harness
        .server
        .post("/v1/admin/users")
        .add_header("x-api-key", &harness.service_api_key)
        .json(&json!({ "scan_id": "qr-1", "name": "Copy" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    harness
        .server
        .post("/v1/admin/users")
        .add_header("x-api-key", &harness.service_api_key)
        .json(&json!({ "scan_id": "  ", "name": "Blank" }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn created_admin_can_grant_from_starting_pool() {
    let harness = TestHarness::new();
    let user = harness.seed_user("qr-1");

    let response = harness
        .server
        .post("/v1/admin/admins")
        .add_header("x-api-key", &harness.service_api_key)
        .json(&json!({ "name": "Grace", "available_to_grant": 300 }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    let admin_id = body["id"].as_str().unwrap().parse().unwrap();

    harness
        .server
        .post("/v1/grants")
        .add_header("authorization", TestHarness::auth_header(&Actor::Admin(admin_id)))
        .json(&json!({ "recipient_id": user.id.to_string(), "amount": 300 }))
        .await
        .assert_status_ok();

    assert_eq!(harness.admin_pool(&admin_id), 0);
    assert_eq!(harness.balance(&user.id), 300);
}

#[tokio::test]
async fn negative_starting_pool_is_rejected() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/admin/admins")
        .add_header("x-api-key", &harness.service_api_key)
        .json(&json!({ "name": "Grace", "available_to_grant": -1 }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn facilitator_needs_existing_user() {
    let harness = TestHarness::new();
    let user = harness.seed_user("qr-1");

    harness
        .server
        .post("/v1/admin/facilitators")
        .add_header("x-api-key", &harness.service_api_key)
        .json(&json!({
            "user_id": UserId::generate().to_string(),
            "name": "Ghost",
            "available_to_grant": 10
        }))
        .await
        .assert_status_not_found();

    harness
        .server
        .post("/v1/admin/facilitators")
        .add_header("x-api-key", &harness.service_api_key)
        .json(&json!({
            "user_id": user.id.to_string(),
            "name": "Volunteer",
            "available_to_grant": 10
        }))
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn event_creation_validates_award() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/admin/events")
        .add_header("x-api-key", &harness.service_api_key)
        .json(&json!({ "title": "Hackday", "point_amount": 40 }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["point_amount"], 40);

    harness
        .server
        .post("/v1/admin/events")
        .add_header("x-api-key", &harness.service_api_key)
        .json(&json!({ "title": "Freebie", "point_amount": 0 }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn deleted_user_keeps_history_but_cannot_receive() {
    let harness = TestHarness::new();
    let admin = harness.seed_admin(500);
    let admin_actor = Actor::Admin(admin.id);
    let user = harness.seed_user("qr-1");

    harness
        .server
        .post("/v1/grants")
        .add_header("authorization", TestHarness::auth_header(&admin_actor))
        .json(&json!({ "recipient_id": user.id.to_string(), "amount": 50 }))
        .await
        .assert_status_ok();

    harness
        .server
        .delete(&format!("/v1/admin/users/{}", user.id))
        .add_header("x-api-key", &harness.service_api_key)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let stored = harness.store.get_user(&user.id).unwrap().unwrap();
    assert!(!stored.status.is_active());

    harness
        .server
        .post("/v1/grants")
        .add_header("authorization", TestHarness::auth_header(&admin_actor))
        .json(&json!({ "recipient_id": user.id.to_string(), "amount": 50 }))
        .await
        .assert_status_not_found();
    assert_eq!(harness.admin_pool(&admin.id), 450);

    let response = harness
        .server
        .get(&format!("/v1/users/{}/transactions", user.id))
        .add_header("authorization", TestHarness::auth_header(&admin_actor))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);
}
