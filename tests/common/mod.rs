use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use medipos_api::{
    config::AppConfig,
    db,
    entities::{inventory_item, patient},
    events::{self, EventSender},
    handlers::AppServices,
    services::inventory::CreateItem,
    services::patients::RegisterPatient,
    tenant::{TenantContext, HOSPITAL_ID_HEADER, STAFF_ID_HEADER},
    AppState,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Helper harness for spinning up an application state backed by an in-memory
/// SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    /// Default tenant scope used by the seed helpers and header-based requests
    pub tenant: TenantContext,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single pooled connection keeps the in-memory database alive for
        // the lifetime of the test.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db_arc.clone(), event_sender.clone());
        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", medipos_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            tenant: TenantContext::new(Uuid::new_v4(), Uuid::new_v4()),
            _event_task: event_task,
        }
    }

    /// Send a request against the router with explicit tenant headers.
    #[allow(dead_code)]
    pub async fn request_as(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        tenant: Option<TenantContext>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(ctx) = tenant {
            builder = builder
                .header(HOSPITAL_ID_HEADER, ctx.hospital_id.to_string())
                .header(STAFF_ID_HEADER, ctx.staff_id.to_string());
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience helper: request as the harness's default tenant.
    #[allow(dead_code)]
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request_as(method, uri, body, Some(self.tenant)).await
    }

    /// Seed an inventory item for the default tenant.
    #[allow(dead_code)]
    pub async fn seed_item(
        &self,
        name: &str,
        unit_price: Decimal,
        quantity: i32,
    ) -> inventory_item::Model {
        self.state
            .inventory_service()
            .create_item(
                self.tenant,
                CreateItem {
                    name: name.to_string(),
                    unit_price,
                    quantity,
                },
            )
            .await
            .expect("seed inventory item for tests")
    }

    /// Seed a patient for the default tenant.
    #[allow(dead_code)]
    pub async fn seed_patient(&self, full_name: &str) -> patient::Model {
        self.state
            .patient_service()
            .register_patient(
                self.tenant,
                RegisterPatient {
                    full_name: full_name.to_string(),
                    phone: None,
                },
            )
            .await
            .expect("seed patient for tests")
    }

    /// Current on-hand quantity for an item, as the default tenant sees it.
    #[allow(dead_code)]
    pub async fn stock_of(&self, item_id: Uuid) -> i32 {
        self.state
            .inventory_service()
            .get_item(self.tenant, item_id)
            .await
            .expect("item should exist")
            .quantity
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Read a JSON body from a response.
#[allow(dead_code)]
pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body should be valid json")
}
