use crate::{
    entities::patient::{self, Entity as Patient},
    errors::ServiceError,
    events::{Event, EventSender},
    tenant::TenantContext,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{error, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RegisterPatient {
    pub full_name: String,
    pub phone: Option<String>,
}

/// Patient directory. The sale processor only needs buyer existence checks;
/// this service carries the registration surface that feeds it.
#[derive(Clone)]
pub struct PatientService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl PatientService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(hospital_id = %ctx.hospital_id))]
    pub async fn register_patient(
        &self,
        ctx: TenantContext,
        input: RegisterPatient,
    ) -> Result<patient::Model, ServiceError> {
        let full_name = input.full_name.trim();
        if full_name.is_empty() {
            return Err(ServiceError::ValidationError(
                "Patient name cannot be empty".to_string(),
            ));
        }

        let model = patient::ActiveModel {
            id: Set(Uuid::new_v4()),
            hospital_id: Set(ctx.hospital_id),
            full_name: Set(full_name.to_string()),
            phone: Set(input.phone.filter(|p| !p.trim().is_empty())),
            created_at: Set(Utc::now().naive_utc()),
        };
        let registered = model.insert(&*self.db).await?;

        if let Err(e) = self
            .event_sender
            .send(Event::PatientRegistered(registered.id))
            .await
        {
            error!("Failed to send patient registered event: {}", e);
        }

        Ok(registered)
    }

    pub async fn get_patient(
        &self,
        ctx: TenantContext,
        patient_id: Uuid,
    ) -> Result<patient::Model, ServiceError> {
        Patient::find_by_id(patient_id)
            .filter(patient::Column::HospitalId.eq(ctx.hospital_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Patient {} not found", patient_id)))
    }

    #[instrument(skip(self), fields(hospital_id = %ctx.hospital_id))]
    pub async fn list_patients(
        &self,
        ctx: TenantContext,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<patient::Model>, u64), ServiceError> {
        let paginator = Patient::find()
            .filter(patient::Column::HospitalId.eq(ctx.hospital_id))
            .order_by_asc(patient::Column::FullName)
            .paginate(&*self.db, limit);

        let total = paginator.num_items().await?;
        let patients = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((patients, total))
    }
}
