use crate::{
    entities::inventory_item,
    errors::ServiceError,
    services::inventory::{CreateItem, UpdateItem},
    tenant::TenantContext,
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, message = "Item name cannot be empty"))]
    pub name: String,
    pub unit_price: Decimal,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub unit_price: Option<Decimal>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct InventoryListQuery {
    /// Page number (1-indexed)
    pub page: Option<u64>,
    /// Page size (max 100)
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryItemResponse {
    pub id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<inventory_item::Model> for InventoryItemResponse {
    fn from(model: inventory_item::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            unit_price: model.unit_price,
            quantity: model.quantity,
            created_at: to_utc(model.created_at),
            updated_at: to_utc(model.updated_at),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory",
    summary = "Create inventory item",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = ApiResponse<InventoryItemResponse>),
        (status = 400, description = "Invalid item data", body = crate::errors::ErrorResponse),
        (status = 409, description = "Item name already exists", body = crate::errors::ErrorResponse),
    ),
    tag = "Inventory"
)]
pub async fn create_item(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InventoryItemResponse>>), ServiceError> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let input = CreateItem {
        name: payload.name.clone(),
        unit_price: payload.unit_price,
        quantity: payload.quantity,
    };

    let item = state.inventory_service().create_item(ctx, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(InventoryItemResponse::from(item))),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/inventory/{id}",
    summary = "Update inventory item",
    params(("id" = Uuid, Path, description = "Item id")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ApiResponse<InventoryItemResponse>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Item name already exists", body = crate::errors::ErrorResponse),
    ),
    tag = "Inventory"
)]
pub async fn update_item(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemRequest>,
) -> ApiResult<InventoryItemResponse> {
    let input = UpdateItem {
        name: payload.name,
        unit_price: payload.unit_price,
        quantity: payload.quantity,
    };

    let item = state.inventory_service().update_item(ctx, id, input).await?;
    Ok(Json(ApiResponse::success(InventoryItemResponse::from(
        item,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    summary = "List inventory",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Inventory retrieved", body = ApiResponse<PaginatedResponse<InventoryItemResponse>>),
    ),
    tag = "Inventory"
)]
pub async fn list_items(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<InventoryListQuery>,
) -> ApiResult<PaginatedResponse<InventoryItemResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let (records, total) = state
        .inventory_service()
        .list_items(ctx, page, limit)
        .await?;
    let items: Vec<InventoryItemResponse> = records
        .into_iter()
        .map(InventoryItemResponse::from)
        .collect();
    let total_pages = (total + limit - 1) / limit;

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        total,
        page,
        limit,
        total_pages,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/{id}",
    summary = "Get inventory item",
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item retrieved", body = ApiResponse<InventoryItemResponse>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Inventory"
)]
pub async fn get_item(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<InventoryItemResponse> {
    let item = state.inventory_service().get_item(ctx, id).await?;
    Ok(Json(ApiResponse::success(InventoryItemResponse::from(
        item,
    ))))
}

fn to_utc(dt: NaiveDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc)
}
