use crate::{
    entities::sale_return,
    errors::ServiceError,
    services::returns::{CreateReturn, ReturnDetails, ReturnLineRequest},
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
pub struct ReturnLineBody {
    pub item_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReturnRequest {
    pub sale_id: Uuid,
    #[validate(length(min = 1, message = "Return must include at least one line"))]
    pub return_lines: Vec<ReturnLineBody>,
    #[validate(length(min = 1, message = "Reason cannot be empty"))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct ReturnListQuery {
    /// Page number (1-indexed)
    pub page: Option<u64>,
    /// Page size (max 100)
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReturnLineResponse {
    pub item_id: Uuid,
    pub quantity: i32,
    pub refund_amount: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReturnResponse {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub processed_by: Uuid,
    pub reason: String,
    pub total_refund: Decimal,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<ReturnLineResponse>,
}

impl From<ReturnDetails> for ReturnResponse {
    fn from(details: ReturnDetails) -> Self {
        Self {
            id: details.record.id,
            sale_id: details.record.sale_id,
            processed_by: details.record.processed_by,
            reason: details.record.reason,
            total_refund: details.record.total_refund,
            created_at: to_utc(details.record.created_at),
            lines: details
                .lines
                .into_iter()
                .map(|line| ReturnLineResponse {
                    item_id: line.item_id,
                    quantity: line.quantity,
                    refund_amount: line.refund_amount,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReturnSummary {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub reason: String,
    pub total_refund: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<sale_return::Model> for ReturnSummary {
    fn from(model: sale_return::Model) -> Self {
        Self {
            id: model.id,
            sale_id: model.sale_id,
            reason: model.reason,
            total_refund: model.total_refund,
            created_at: to_utc(model.created_at),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/returns",
    summary = "Create return",
    description = "Reverse part or all of a sale: restore stock, record the refund, and update the sale's fulfillment status",
    request_body = CreateReturnRequest,
    responses(
        (status = 201, description = "Return processed", body = ApiResponse<ReturnResponse>),
        (status = 400, description = "Invalid return data or over-return", body = crate::errors::ErrorResponse),
        (status = 403, description = "Missing tenant context", body = crate::errors::ErrorResponse),
        (status = 404, description = "Sale not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Returns"
)]
pub async fn create_return(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<CreateReturnRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReturnResponse>>), ServiceError> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let input = CreateReturn {
        sale_id: payload.sale_id,
        return_lines: payload
            .return_lines
            .iter()
            .map(|line| ReturnLineRequest {
                item_id: line.item_id,
                quantity: line.quantity,
            })
            .collect(),
        reason: payload.reason.clone(),
    };

    let created = state.return_service().create_return(ctx, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ReturnResponse::from(created))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/returns",
    summary = "List returns",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Returns retrieved", body = ApiResponse<PaginatedResponse<ReturnSummary>>),
    ),
    tag = "Returns"
)]
pub async fn list_returns(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ReturnListQuery>,
) -> ApiResult<PaginatedResponse<ReturnSummary>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let (records, total) = state.return_service().list_returns(ctx, page, limit).await?;
    let items: Vec<ReturnSummary> = records.into_iter().map(ReturnSummary::from).collect();
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
    path = "/api/v1/returns/{id}",
    summary = "Get return",
    params(("id" = Uuid, Path, description = "Return id")),
    responses(
        (status = 200, description = "Return retrieved", body = ApiResponse<ReturnResponse>),
        (status = 404, description = "Return not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Returns"
)]
pub async fn get_return(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<ReturnResponse> {
    let details = state.return_service().get_return(ctx, id).await?;
    Ok(Json(ApiResponse::success(ReturnResponse::from(details))))
}

fn to_utc(dt: NaiveDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc)
}
