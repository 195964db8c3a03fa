mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{read_json, TestApp};
use woolchain_api::middleware_helpers::request_id::REQUEST_ID_HEADER;

fn actor(user: &Value) -> Value {
    json!({
        "user_id": user["id"],
        "name": user["name"],
        "role": user["role"],
    })
}

/// Registers an admin and a farmer, then an approved farm, through the API.
async fn onboard(app: &TestApp) -> (Value, Value, Value) {
    let admin = app
        .request(
            Method::POST,
            "/api/v1/users",
            Some(json!({
                "name": "Ada Admin",
                "email": "ADA@woolchain.test",
                "password": "correct-horse-battery",
                "role": "admin"
            })),
        )
        .await;
    assert_eq!(admin.status(), StatusCode::OK);
    let admin = read_json(admin).await["data"].clone();
    assert_eq!(admin["email"], "ada@woolchain.test");
    assert!(admin.get("password_hash").is_none());

    let farmer = app
        .request(
            Method::POST,
            "/api/v1/users",
            Some(json!({
                "name": "Fern Farmer",
                "email": "fern@woolchain.test",
                "password": "correct-horse-battery",
                "role": "farmer"
            })),
        )
        .await;
    let farmer = read_json(farmer).await["data"].clone();

    let farm = app
        .request(
            Method::POST,
            "/api/v1/farms",
            Some(json!({
                "name": "Glenmore Station",
                "owner_id": farmer["id"],
                "location": { "city": "Twizel", "country": "New Zealand" }
            })),
        )
        .await;
    assert_eq!(farm.status(), StatusCode::OK);
    let farm = read_json(farm).await["data"].clone();
    assert_eq!(farm["approval_status"], "Pending");

    let approved = app
        .request(
            Method::POST,
            &format!("/api/v1/farms/{}/approval", farm["id"].as_str().unwrap()),
            Some(json!({ "actor_id": admin["id"], "status": "Approved" })),
        )
        .await;
    assert_eq!(approved.status(), StatusCode::OK);
    let farm = read_json(approved).await["data"].clone();

    (admin, farmer, farm)
}

#[tokio::test]
async fn health_reports_database_and_assigns_request_id() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(REQUEST_ID_HEADER).is_some());
    let body = read_json(response).await;
    assert_eq!(body["data"]["checks"]["database"], "healthy");
    assert!(body["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn errors_carry_code_and_caller_request_id() {
    let app = TestApp::new().await;

    let response = app
        .request_with_headers(
            Method::GET,
            "/api/v1/batches/6f1c1c1e-0000-4000-8000-000000000000",
            None,
            &[(REQUEST_ID_HEADER, "trace-42")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), "trace-42");
    let body = read_json(response).await;
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["request_id"], "trace-42");
}

#[tokio::test]
async fn unknown_snapshot_period_is_a_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/analytics/compute/fortnightly", None)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["code"], "validation_error");
}

#[tokio::test]
async fn batch_lifecycle_over_http() {
    let app = TestApp::new().await;
    let (_admin, farmer, farm) = onboard(&app).await;

    let created = app
        .request(
            Method::POST,
            "/api/v1/batches",
            Some(json!({
                "farm_id": farm["id"],
                "weight": { "value": 320.5 },
                "shearing_date": "2024-01-10T09:00:00Z",
                "created_by": actor(&farmer)
            })),
        )
        .await;
    assert_eq!(created.status(), StatusCode::OK);
    let batch = read_json(created).await["data"].clone();
    let id = batch["id"].as_str().unwrap().to_string();
    assert_eq!(batch["current_stage"], "Shearing");
    assert_eq!(batch["version"], 1);

    let advance = json!({
        "stage": "Cleaning",
        "status": "In Progress",
        "updated_by": actor(&farmer),
        "timestamp": "2024-01-12T09:00:00Z",
        "notes": "scoured"
    });
    let accepted = app
        .request(
            Method::POST,
            &format!("/api/v1/batches/{id}/updates?expected_version=1"),
            Some(advance.clone()),
        )
        .await;
    assert_eq!(accepted.status(), StatusCode::OK);
    assert_eq!(read_json(accepted).await["data"]["version"], 2);

    let stale = app
        .request(
            Method::POST,
            &format!("/api/v1/batches/{id}/updates?expected_version=1"),
            Some(advance),
        )
        .await;
    assert_eq!(stale.status(), StatusCode::CONFLICT);
    assert_eq!(read_json(stale).await["code"], "concurrent_modification");

    let skipped = app
        .request(
            Method::POST,
            &format!("/api/v1/batches/{id}/updates"),
            Some(json!({
                "stage": "Spinning",
                "status": "In Progress",
                "updated_by": actor(&farmer),
                "timestamp": "2024-01-13T09:00:00Z"
            })),
        )
        .await;
    assert_eq!(skipped.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(read_json(skipped).await["code"], "invalid_transition");

    let timeline = app
        .request(Method::GET, &format!("/api/v1/batches/{id}/timeline"), None)
        .await;
    assert_eq!(timeline.status(), StatusCode::OK);
    let events = read_json(timeline).await["data"]["events"].clone();
    assert_eq!(events.as_array().unwrap().len(), 2);
    assert_eq!(events[1]["stage"], "Cleaning");

    let listed = app
        .request(Method::GET, "/api/v1/batches?stage=Cleaning&limit=5", None)
        .await;
    let listed = read_json(listed).await["data"].clone();
    assert_eq!(listed["total"], 1);
    assert_eq!(listed["limit"], 5);
}

#[tokio::test]
async fn pending_farm_cannot_register_batches_over_http() {
    let app = TestApp::new().await;
    let farm = app.pending_farm("Waiting Downs").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/batches",
            Some(json!({
                "farm_id": farm.id,
                "weight": { "value": 100.0, "unit": "kg" },
                "shearing_date": "2024-01-10T09:00:00Z",
                "created_by": {
                    "user_id": farm.owner_id,
                    "name": "Owner",
                    "role": "farmer"
                }
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(read_json(response).await["code"], "farm_not_approved");
}

#[tokio::test]
async fn non_admin_cannot_approve_farms() {
    let app = TestApp::new().await;
    let (_admin, farmer, farm) = onboard(&app).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/farms/{}/approval", farm["id"].as_str().unwrap()),
            Some(json!({ "actor_id": farmer["id"], "status": "Suspended", "reason": "audit" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_checks_password() {
    let app = TestApp::new().await;
    onboard(&app).await;

    let ok = app
        .request(
            Method::POST,
            "/api/v1/users/login",
            Some(json!({ "email": "ada@woolchain.test", "password": "correct-horse-battery" })),
        )
        .await;
    assert_eq!(ok.status(), StatusCode::OK);
    assert!(read_json(ok).await["data"]["last_login"].is_string());

    let bad = app
        .request(
            Method::POST,
            "/api/v1/users/login",
            Some(json!({ "email": "ada@woolchain.test", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json(bad).await["code"], "unauthorized");
}

#[tokio::test]
async fn analytics_endpoints_handle_missing_history() {
    let app = TestApp::new().await;

    let latest = app
        .request(Method::GET, "/api/v1/analytics/snapshots/monthly/latest", None)
        .await;
    assert_eq!(latest.status(), StatusCode::NOT_FOUND);

    let trend = app.request(Method::GET, "/api/v1/analytics/trend/monthly", None).await;
    assert_eq!(trend.status(), StatusCode::OK);
    assert!(read_json(trend).await["data"].is_null());

    let generated = app
        .request(
            Method::POST,
            "/api/v1/analytics/snapshots",
            Some(json!({ "period": "Monthly", "as_of": "2024-03-31T00:00:00Z" })),
        )
        .await;
    assert_eq!(generated.status(), StatusCode::OK);
    let snapshot = read_json(generated).await["data"].clone();
    assert_eq!(snapshot["date"], "2024-03-31");
    assert_eq!(snapshot["calculated_by"], "api");

    let range = app
        .request(
            Method::GET,
            "/api/v1/analytics/snapshots/monthly?from=2024-01-01&to=2024-12-31",
            None,
        )
        .await;
    assert_eq!(read_json(range).await["data"].as_array().unwrap().len(), 1);
}
