mod common;

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use medipos_api::{
    entities::sale::SaleStatus,
    errors::ServiceError,
    services::sales::{CartLine, CreateSale},
    tenant::TenantContext,
};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

fn cart(lines: Vec<(Uuid, i32)>) -> Vec<CartLine> {
    lines
        .into_iter()
        .map(|(item_id, quantity)| CartLine { item_id, quantity })
        .collect()
}

#[tokio::test]
async fn completed_sale_decrements_stock_and_records_lines() {
    let app = TestApp::new().await;
    let item = app.seed_item("Paracetamol 500mg", dec!(4.50), 10).await;
    let patient = app.seed_patient("Amina Yusuf").await;

    let details = app
        .state
        .sale_service()
        .create_sale(
            app.tenant,
            CreateSale {
                patient_id: patient.id,
                cart_lines: cart(vec![(item.id, 3)]),
                payment_method: "cash".to_string(),
                status: SaleStatus::Paid,
            },
        )
        .await
        .expect("sale should succeed");

    assert_eq!(details.sale.total_amount, dec!(13.50));
    assert_eq!(details.sale.status, SaleStatus::Paid);
    assert_eq!(details.sale.issued_by, app.tenant.staff_id);
    assert!(details.sale.sale_number.starts_with("INV-"));
    assert_eq!(details.sale.sale_number.len(), "INV-".len() + 8);

    assert_eq!(details.lines.len(), 1);
    let line = &details.lines[0];
    assert_eq!(line.item_name, "Paracetamol 500mg");
    assert_eq!(line.unit_price, dec!(4.50));
    assert_eq!(line.quantity, 3);
    assert_eq!(line.line_total, dec!(13.50));

    assert_eq!(app.stock_of(item.id).await, 7);
}

#[tokio::test]
async fn insufficient_stock_rejects_the_whole_sale() {
    let app = TestApp::new().await;
    let item = app.seed_item("Amoxicillin 250mg", dec!(12.00), 2).await;
    let patient = app.seed_patient("Joseph Banda").await;

    let err = app
        .state
        .sale_service()
        .create_sale(
            app.tenant,
            CreateSale {
                patient_id: patient.id,
                cart_lines: cart(vec![(item.id, 5)]),
                payment_method: "cash".to_string(),
                status: SaleStatus::Paid,
            },
        )
        .await
        .expect_err("sale should be rejected");

    assert_matches!(err, ServiceError::InsufficientStock(_));
    assert_eq!(app.stock_of(item.id).await, 2);

    let (sales, total) = app
        .state
        .sale_service()
        .list_sales(app.tenant, 1, 20)
        .await
        .expect("listing should work");
    assert!(sales.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn failing_line_rolls_back_earlier_decrements() {
    let app = TestApp::new().await;
    let plenty = app.seed_item("Ibuprofen 200mg", dec!(3.00), 10).await;
    let scarce = app.seed_item("Insulin 10ml", dec!(80.00), 1).await;
    let patient = app.seed_patient("Grace Mwangi").await;

    let err = app
        .state
        .sale_service()
        .create_sale(
            app.tenant,
            CreateSale {
                patient_id: patient.id,
                cart_lines: cart(vec![(plenty.id, 2), (scarce.id, 3)]),
                payment_method: "card".to_string(),
                status: SaleStatus::Paid,
            },
        )
        .await
        .expect_err("second line should sink the sale");

    assert_matches!(err, ServiceError::InsufficientStock(_));
    // The first line's decrement must not survive the rollback
    assert_eq!(app.stock_of(plenty.id).await, 10);
    assert_eq!(app.stock_of(scarce.id).await, 1);
}

#[tokio::test]
async fn sale_requires_a_registered_patient() {
    let app = TestApp::new().await;
    let item = app.seed_item("Cetirizine 10mg", dec!(2.00), 5).await;

    let err = app
        .state
        .sale_service()
        .create_sale(
            app.tenant,
            CreateSale {
                patient_id: Uuid::new_v4(),
                cart_lines: cart(vec![(item.id, 1)]),
                payment_method: "cash".to_string(),
                status: SaleStatus::Paid,
            },
        )
        .await
        .expect_err("unknown patient should be rejected");

    assert_matches!(err, ServiceError::NotFound(_));
    assert_eq!(app.stock_of(item.id).await, 5);
}

#[tokio::test]
async fn concurrent_sales_never_oversell() {
    let app = TestApp::new().await;
    let item = app.seed_item("Morphine 10mg", dec!(25.00), 5).await;
    let patient = app.seed_patient("Daniel Okoro").await;

    let service = app.state.sale_service();
    let order = |qty: i32| CreateSale {
        patient_id: patient.id,
        cart_lines: cart(vec![(item.id, qty)]),
        payment_method: "cash".to_string(),
        status: SaleStatus::Paid,
    };

    let (first, second) = tokio::join!(
        service.create_sale(app.tenant, order(3)),
        service.create_sale(app.tenant, order(3)),
    );

    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "only one of the competing sales may succeed");

    let loser = if first.is_ok() { second } else { first };
    assert_matches!(
        loser.expect_err("loser should fail"),
        ServiceError::InsufficientStock(_)
    );
    assert_eq!(app.stock_of(item.id).await, 2);
}

#[tokio::test]
async fn sales_are_scoped_to_the_hospital() {
    let app = TestApp::new().await;
    let item = app.seed_item("Omeprazole 20mg", dec!(6.00), 8).await;
    let patient = app.seed_patient("Lydia Chileshe").await;

    let details = app
        .state
        .sale_service()
        .create_sale(
            app.tenant,
            CreateSale {
                patient_id: patient.id,
                cart_lines: cart(vec![(item.id, 1)]),
                payment_method: "cash".to_string(),
                status: SaleStatus::Paid,
            },
        )
        .await
        .expect("sale should succeed");

    let other_hospital = TenantContext::new(Uuid::new_v4(), Uuid::new_v4());
    let err = app
        .state
        .sale_service()
        .get_sale(other_hospital, details.sale.id)
        .await
        .expect_err("foreign tenant must not see the sale");
    assert_matches!(err, ServiceError::NotFound(_));

    let (sales, total) = app
        .state
        .sale_service()
        .list_sales(other_hospital, 1, 20)
        .await
        .expect("listing should work");
    assert!(sales.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn sale_endpoint_creates_and_serves_sales() {
    let app = TestApp::new().await;
    let item = app.seed_item("Vitamin C 500mg", dec!(1.50), 20).await;
    let patient = app.seed_patient("Peter Phiri").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/sales",
            Some(json!({
                "patient_id": patient.id,
                "cart_lines": [{"item_id": item.id, "quantity": 4}],
                "payment_method": "mobile_money",
                "status": "paid",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["total_amount"], json!("6.00"));
    assert_eq!(body["data"]["status"], json!("paid"));
    let sale_number = body["data"]["sale_number"]
        .as_str()
        .expect("sale number present")
        .to_string();

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/sales/by-number/{}", sale_number),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["sale_number"], json!(sale_number));
    assert_eq!(body["data"]["lines"][0]["item_name"], json!("Vitamin C 500mg"));
}

#[tokio::test]
async fn sale_endpoint_rejects_missing_tenant_headers() {
    let app = TestApp::new().await;

    let response = app
        .request_as(
            Method::POST,
            "/api/v1/sales",
            Some(json!({
                "patient_id": Uuid::new_v4(),
                "cart_lines": [{"item_id": Uuid::new_v4(), "quantity": 1}],
                "payment_method": "cash",
                "status": "paid",
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn sale_endpoint_rejects_empty_cart() {
    let app = TestApp::new().await;
    let patient = app.seed_patient("Esther Moyo").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/sales",
            Some(json!({
                "patient_id": patient.id,
                "cart_lines": [],
                "payment_method": "cash",
                "status": "paid",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn insufficient_stock_maps_to_unprocessable_entity() {
    let app = TestApp::new().await;
    let item = app.seed_item("Diazepam 5mg", dec!(9.00), 1).await;
    let patient = app.seed_patient("Samuel Ncube").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/sales",
            Some(json!({
                "patient_id": patient.id,
                "cart_lines": [{"item_id": item.id, "quantity": 2}],
                "payment_method": "cash",
                "status": "paid",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_json(response).await;
    assert_eq!(body["error"], json!("Unprocessable Entity"));
    let message = body["message"].as_str().expect("message present");
    assert!(message.contains("Not enough stock"));
}
