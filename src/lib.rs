//! MediPOS API Library
//!
//! This crate provides the core functionality for the MediPOS pharmacy
//! point-of-sale backend
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tenant;

use axum::{extract::State, response::Json, routing::get, routing::post, routing::put, Router};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn sale_service(&self) -> Arc<services::sales::SaleService> {
        self.services.sales.clone()
    }

    pub fn return_service(&self) -> Arc<services::returns::ReturnService> {
        self.services.returns.clone()
    }

    pub fn inventory_service(&self) -> Arc<services::inventory::InventoryService> {
        self.services.inventory.clone()
    }

    pub fn patient_service(&self) -> Arc<services::patients::PatientService> {
        self.services.patients.clone()
    }
}

// Common response wrappers
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        // Sales API
        .route("/sales", post(handlers::sales::create_sale))
        .route("/sales", get(handlers::sales::list_sales))
        .route("/sales/:id", get(handlers::sales::get_sale))
        .route(
            "/sales/by-number/:sale_number",
            get(handlers::sales::get_sale_by_number),
        )
        // Returns API
        .route("/returns", post(handlers::returns::create_return))
        .route("/returns", get(handlers::returns::list_returns))
        .route("/returns/:id", get(handlers::returns::get_return))
        // Inventory API
        .route("/inventory", post(handlers::inventory::create_item))
        .route("/inventory", get(handlers::inventory::list_items))
        .route("/inventory/:id", put(handlers::inventory::update_item))
        .route("/inventory/:id", get(handlers::inventory::get_item))
        // Patients API
        .route("/patients", post(handlers::patients::register_patient))
        .route("/patients", get(handlers::patients::list_patients))
        .route("/patients/:id", get(handlers::patients::get_patient))
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "medipos-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
