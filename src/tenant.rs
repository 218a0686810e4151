use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::ServiceError;

pub const HOSPITAL_ID_HEADER: &str = "x-hospital-id";
pub const STAFF_ID_HEADER: &str = "x-staff-id";

/// Tenant scope for a request: which hospital the data belongs to and which
/// staff member is acting. Populated by the authentication layer upstream;
/// here it is read from trusted headers so every service call carries an
/// explicit tenant rather than ad hoc per-query checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub hospital_id: Uuid,
    pub staff_id: Uuid,
}

impl TenantContext {
    pub fn new(hospital_id: Uuid, staff_id: Uuid) -> Self {
        Self {
            hospital_id,
            staff_id,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let hospital_id = header_uuid(parts, HOSPITAL_ID_HEADER)?;
        let staff_id = header_uuid(parts, STAFF_ID_HEADER)?;
        Ok(Self {
            hospital_id,
            staff_id,
        })
    }
}

fn header_uuid(parts: &Parts, name: &str) -> Result<Uuid, ServiceError> {
    let raw = parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ServiceError::Forbidden(format!("Missing {} header", name)))?;

    Uuid::parse_str(raw)
        .map_err(|_| ServiceError::Forbidden(format!("Invalid {} header", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn extracts_tenant_from_headers() {
        let hospital = Uuid::new_v4();
        let staff = Uuid::new_v4();
        let request = Request::builder()
            .header(HOSPITAL_ID_HEADER, hospital.to_string())
            .header(STAFF_ID_HEADER, staff.to_string())
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let ctx = TenantContext::from_request_parts(&mut parts, &())
            .await
            .expect("tenant context");
        assert_eq!(ctx.hospital_id, hospital);
        assert_eq!(ctx.staff_id, staff);
    }

    #[tokio::test]
    async fn missing_header_is_forbidden() {
        let request = Request::builder().body(()).unwrap();
        let (mut parts, _) = request.into_parts();

        let err = TenantContext::from_request_parts(&mut parts, &())
            .await
            .expect_err("should reject");
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }
}
