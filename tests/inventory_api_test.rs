mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use medipos_api::tenant::TenantContext;
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn items_can_be_created_and_listed() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory",
            Some(json!({
                "name": "Paracetamol 500mg",
                "unit_price": "4.50",
                "quantity": 100,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["data"]["name"], json!("Paracetamol 500mg"));
    assert_eq!(body["data"]["unit_price"], json!("4.50"));
    assert_eq!(body["data"]["quantity"], json!(100));

    let response = app.request(Method::GET, "/api/v1/inventory", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], json!(1));
    assert_eq!(body["data"]["items"][0]["name"], json!("Paracetamol 500mg"));
}

#[tokio::test]
async fn duplicate_item_names_conflict_within_a_hospital() {
    let app = TestApp::new().await;
    app.seed_item("Amoxicillin 250mg", dec!(12.00), 10).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory",
            Some(json!({
                "name": "Amoxicillin 250mg",
                "unit_price": "11.00",
                "quantity": 5,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // A different hospital may use the same name
    let other = TenantContext::new(Uuid::new_v4(), Uuid::new_v4());
    let response = app
        .request_as(
            Method::POST,
            "/api/v1/inventory",
            Some(json!({
                "name": "Amoxicillin 250mg",
                "unit_price": "11.00",
                "quantity": 5,
            })),
            Some(other),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn item_updates_apply_selected_fields() {
    let app = TestApp::new().await;
    let item = app.seed_item("Ibuprofen 200mg", dec!(3.00), 50).await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/inventory/{}", item.id),
            Some(json!({"unit_price": "3.25"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["unit_price"], json!("3.25"));
    assert_eq!(body["data"]["quantity"], json!(50));
    assert_eq!(body["data"]["name"], json!("Ibuprofen 200mg"));
}

#[tokio::test]
async fn negative_quantities_are_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory",
            Some(json!({
                "name": "Cetirizine 10mg",
                "unit_price": "2.00",
                "quantity": -1,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn items_are_scoped_to_the_hospital() {
    let app = TestApp::new().await;
    let item = app.seed_item("Insulin 10ml", dec!(80.00), 5).await;

    let other = TenantContext::new(Uuid::new_v4(), Uuid::new_v4());
    let response = app
        .request_as(
            Method::GET,
            &format!("/api/v1/inventory/{}", item.id),
            None,
            Some(other),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .request(Method::GET, &format!("/api/v1/inventory/{}", item.id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn inventory_requires_tenant_headers() {
    let app = TestApp::new().await;

    let response = app
        .request_as(Method::GET, "/api/v1/inventory", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn patients_can_be_registered_and_fetched() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/patients",
            Some(json!({
                "full_name": "Amina Yusuf",
                "phone": "+260971234567",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let patient_id = body["data"]["id"].as_str().expect("patient id").to_string();
    assert_eq!(body["data"]["phone"], json!("+260971234567"));

    let response = app
        .request(Method::GET, &format!("/api/v1/patients/{}", patient_id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["full_name"], json!("Amina Yusuf"));
}

#[tokio::test]
async fn blank_patient_names_are_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/patients",
            Some(json!({"full_name": ""})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_and_health_endpoints_respond() {
    let app = TestApp::new().await;

    let response = app
        .request_as(Method::GET, "/api/v1/status", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], json!("ok"));

    let response = app
        .request_as(Method::GET, "/api/v1/health", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["checks"]["database"], json!("healthy"));
}
