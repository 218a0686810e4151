use crate::{
    entities::patient,
    errors::ServiceError,
    services::patients::RegisterPatient,
    tenant::TenantContext,
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterPatientRequest {
    #[validate(length(min = 1, message = "Patient name cannot be empty"))]
    pub full_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct PatientListQuery {
    /// Page number (1-indexed)
    pub page: Option<u64>,
    /// Page size (max 100)
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientResponse {
    pub id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<patient::Model> for PatientResponse {
    fn from(model: patient::Model) -> Self {
        Self {
            id: model.id,
            full_name: model.full_name,
            phone: model.phone,
            created_at: to_utc(model.created_at),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/patients",
    summary = "Register patient",
    request_body = RegisterPatientRequest,
    responses(
        (status = 201, description = "Patient registered", body = ApiResponse<PatientResponse>),
        (status = 400, description = "Invalid patient data", body = crate::errors::ErrorResponse),
    ),
    tag = "Patients"
)]
pub async fn register_patient(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<RegisterPatientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PatientResponse>>), ServiceError> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let input = RegisterPatient {
        full_name: payload.full_name.clone(),
        phone: payload.phone.clone(),
    };

    let patient = state.patient_service().register_patient(ctx, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(PatientResponse::from(patient))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients",
    summary = "List patients",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Patients retrieved", body = ApiResponse<PaginatedResponse<PatientResponse>>),
    ),
    tag = "Patients"
)]
pub async fn list_patients(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<PatientListQuery>,
) -> ApiResult<PaginatedResponse<PatientResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let (records, total) = state
        .patient_service()
        .list_patients(ctx, page, limit)
        .await?;
    let items: Vec<PatientResponse> = records.into_iter().map(PatientResponse::from).collect();
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
    path = "/api/v1/patients/{id}",
    summary = "Get patient",
    params(("id" = Uuid, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient retrieved", body = ApiResponse<PatientResponse>),
        (status = 404, description = "Patient not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Patients"
)]
pub async fn get_patient(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<PatientResponse> {
    let patient = state.patient_service().get_patient(ctx, id).await?;
    Ok(Json(ApiResponse::success(PatientResponse::from(patient))))
}

fn to_utc(dt: NaiveDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc)
}
