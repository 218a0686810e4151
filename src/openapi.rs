use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MediPOS API",
        version = "1.0.0",
        description = r#"
# MediPOS Pharmacy Point-of-Sale API

Backend for hospital pharmacy counters: inventory tracking, sale processing, and
return handling, scoped per hospital.

## Tenancy

Every request carries the acting hospital and staff member in headers:

```
x-hospital-id: <uuid>
x-staff-id: <uuid>
```

Requests without both headers are rejected with 403.

## Error Handling

Errors use a consistent response format with appropriate HTTP status codes:

```json
{
  "error": "Unprocessable Entity",
  "message": "Insufficient stock: Not enough stock for Paracetamol 500mg. Available: 3, Requested: 5",
  "timestamp": "2026-01-15T10:30:00+00:00"
}
```

## Pagination

List endpoints accept `page` (default: 1) and `limit` (default: 20, max: 100).
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Sales", description = "Point-of-sale transaction endpoints"),
        (name = "Returns", description = "Return processing endpoints"),
        (name = "Inventory", description = "Inventory management endpoints"),
        (name = "Patients", description = "Patient directory endpoints"),
    ),
    paths(
        // Sales
        crate::handlers::sales::create_sale,
        crate::handlers::sales::list_sales,
        crate::handlers::sales::get_sale,
        crate::handlers::sales::get_sale_by_number,

        // Returns
        crate::handlers::returns::create_return,
        crate::handlers::returns::list_returns,
        crate::handlers::returns::get_return,

        // Inventory
        crate::handlers::inventory::create_item,
        crate::handlers::inventory::update_item,
        crate::handlers::inventory::list_items,
        crate::handlers::inventory::get_item,

        // Patients
        crate::handlers::patients::register_patient,
        crate::handlers::patients::list_patients,
        crate::handlers::patients::get_patient,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,

            crate::handlers::sales::CreateSaleRequest,
            crate::handlers::sales::CartLineRequest,
            crate::handlers::sales::SaleResponse,
            crate::handlers::sales::SaleLineResponse,
            crate::handlers::sales::SaleSummary,
            crate::entities::sale::SaleStatus,

            crate::handlers::returns::CreateReturnRequest,
            crate::handlers::returns::ReturnLineBody,
            crate::handlers::returns::ReturnResponse,
            crate::handlers::returns::ReturnLineResponse,
            crate::handlers::returns::ReturnSummary,

            crate::handlers::inventory::CreateItemRequest,
            crate::handlers::inventory::UpdateItemRequest,
            crate::handlers::inventory::InventoryItemResponse,

            crate::handlers::patients::RegisterPatientRequest,
            crate::handlers::patients::PatientResponse,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
