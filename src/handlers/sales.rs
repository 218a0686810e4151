use crate::{
    entities::sale::{self, SaleStatus},
    errors::ServiceError,
    services::sales::{CartLine, CreateSale, SaleDetails},
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

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CartLineRequest {
    pub item_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSaleRequest {
    pub patient_id: Uuid,
    #[validate(length(min = 1, message = "Cart cannot be empty"))]
    pub cart_lines: Vec<CartLineRequest>,
    #[validate(length(min = 1, message = "Payment method cannot be empty"))]
    pub payment_method: String,
    /// Payment state at time of sale: "paid" or "unpaid"
    pub status: SaleStatus,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct SaleListQuery {
    /// Page number (1-indexed)
    pub page: Option<u64>,
    /// Page size (max 100)
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleLineResponse {
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleResponse {
    pub id: Uuid,
    pub sale_number: String,
    pub patient_id: Uuid,
    pub issued_by: Uuid,
    pub payment_method: String,
    pub status: SaleStatus,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<SaleLineResponse>,
}

impl From<SaleDetails> for SaleResponse {
    fn from(details: SaleDetails) -> Self {
        Self {
            id: details.sale.id,
            sale_number: details.sale.sale_number,
            patient_id: details.sale.patient_id,
            issued_by: details.sale.issued_by,
            payment_method: details.sale.payment_method,
            status: details.sale.status,
            total_amount: details.sale.total_amount,
            created_at: to_utc(details.sale.created_at),
            lines: details
                .lines
                .into_iter()
                .map(|line| SaleLineResponse {
                    item_id: line.item_id,
                    item_name: line.item_name,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    line_total: line.line_total,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleSummary {
    pub id: Uuid,
    pub sale_number: String,
    pub patient_id: Uuid,
    pub status: SaleStatus,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<sale::Model> for SaleSummary {
    fn from(model: sale::Model) -> Self {
        Self {
            id: model.id,
            sale_number: model.sale_number,
            patient_id: model.patient_id,
            status: model.status,
            total_amount: model.total_amount,
            created_at: to_utc(model.created_at),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/sales",
    summary = "Create sale",
    description = "Process a point-of-sale transaction: decrement stock and persist the sale",
    request_body = CreateSaleRequest,
    responses(
        (status = 201, description = "Sale created", body = ApiResponse<SaleResponse>),
        (status = 400, description = "Invalid cart or payment data", body = crate::errors::ErrorResponse),
        (status = 403, description = "Missing tenant context", body = crate::errors::ErrorResponse),
        (status = 404, description = "Patient or item not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse),
    ),
    tag = "Sales"
)]
pub async fn create_sale(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SaleResponse>>), ServiceError> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let input = CreateSale {
        patient_id: payload.patient_id,
        cart_lines: payload
            .cart_lines
            .iter()
            .map(|line| CartLine {
                item_id: line.item_id,
                quantity: line.quantity,
            })
            .collect(),
        payment_method: payload.payment_method.clone(),
        status: payload.status,
    };

    let created = state.sale_service().create_sale(ctx, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(SaleResponse::from(created))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/sales",
    summary = "List sales",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Sales retrieved", body = ApiResponse<PaginatedResponse<SaleSummary>>),
    ),
    tag = "Sales"
)]
pub async fn list_sales(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<SaleListQuery>,
) -> ApiResult<PaginatedResponse<SaleSummary>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let (records, total) = state.sale_service().list_sales(ctx, page, limit).await?;
    let items: Vec<SaleSummary> = records.into_iter().map(SaleSummary::from).collect();
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
    path = "/api/v1/sales/{id}",
    summary = "Get sale",
    params(("id" = Uuid, Path, description = "Sale id")),
    responses(
        (status = 200, description = "Sale retrieved", body = ApiResponse<SaleResponse>),
        (status = 404, description = "Sale not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Sales"
)]
pub async fn get_sale(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<SaleResponse> {
    let details = state.sale_service().get_sale(ctx, id).await?;
    Ok(Json(ApiResponse::success(SaleResponse::from(details))))
}

#[utoipa::path(
    get,
    path = "/api/v1/sales/by-number/{sale_number}",
    summary = "Get sale by number",
    params(("sale_number" = String, Path, description = "Public sale number (e.g., INV-7Q2MZK4P)")),
    responses(
        (status = 200, description = "Sale retrieved", body = ApiResponse<SaleResponse>),
        (status = 404, description = "Sale not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Sales"
)]
pub async fn get_sale_by_number(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(sale_number): Path<String>,
) -> ApiResult<SaleResponse> {
    let details = state
        .sale_service()
        .get_sale_by_number(ctx, &sale_number)
        .await?;
    Ok(Json(ApiResponse::success(SaleResponse::from(details))))
}

fn to_utc(dt: NaiveDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc)
}
