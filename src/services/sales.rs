use crate::{
    entities::{
        patient::{self, Entity as Patient},
        sale::{self, Entity as Sale, SaleStatus},
        sale_line::{self, Entity as SaleLine},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::inventory::InventoryService,
    tenant::TenantContext,
};
use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

const SALE_NUMBER_PREFIX: &str = "INV-";
const SALE_NUMBER_CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SALE_NUMBER_LEN: usize = 8;
const SALE_NUMBER_ATTEMPTS: usize = 5;

/// A requested (item, quantity) pair submitted for sale
#[derive(Debug, Clone)]
pub struct CartLine {
    pub item_id: Uuid,
    pub quantity: i32,
}

/// Input for the sale transaction processor
#[derive(Debug, Clone)]
pub struct CreateSale {
    pub patient_id: Uuid,
    pub cart_lines: Vec<CartLine>,
    pub payment_method: String,
    pub status: SaleStatus,
}

/// A persisted sale together with its lines
#[derive(Debug, Clone)]
pub struct SaleDetails {
    pub sale: sale::Model,
    pub lines: Vec<sale_line::Model>,
}

/// Sale transaction processor: converts a cart into a persisted sale while
/// enforcing stock sufficiency. All stock decrements and the record inserts
/// happen in one transaction; a failure on any line leaves the ledger
/// untouched.
#[derive(Clone)]
pub struct SaleService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl SaleService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(hospital_id = %ctx.hospital_id))]
    pub async fn create_sale(
        &self,
        ctx: TenantContext,
        input: CreateSale,
    ) -> Result<SaleDetails, ServiceError> {
        if input.cart_lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "Cart cannot be empty".to_string(),
            ));
        }
        for line in &input.cart_lines {
            if line.quantity <= 0 {
                return Err(ServiceError::ValidationError(format!(
                    "Quantity for item {} must be a positive integer",
                    line.item_id
                )));
            }
        }
        if input.payment_method.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Payment method cannot be empty".to_string(),
            ));
        }
        if !matches!(input.status, SaleStatus::Paid | SaleStatus::Unpaid) {
            return Err(ServiceError::ValidationError(
                "A new sale must be recorded as paid or unpaid".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        Patient::find_by_id(input.patient_id)
            .filter(patient::Column::HospitalId.eq(ctx.hospital_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Patient {} not found", input.patient_id))
            })?;

        let sale_id = Uuid::new_v4();
        let mut total_amount = Decimal::ZERO;
        let mut line_models = Vec::with_capacity(input.cart_lines.len());

        for line in &input.cart_lines {
            let item =
                InventoryService::reserve_stock(&txn, ctx.hospital_id, line.item_id, line.quantity)
                    .await?;

            let line_total = item.unit_price * Decimal::from(line.quantity);
            total_amount += line_total;

            line_models.push(sale_line::ActiveModel {
                id: Set(Uuid::new_v4()),
                sale_id: Set(sale_id),
                item_id: Set(item.id),
                item_name: Set(item.name),
                quantity: Set(line.quantity),
                unit_price: Set(item.unit_price),
                line_total: Set(line_total),
            });
        }

        let sale = sale::ActiveModel {
            id: Set(sale_id),
            sale_number: NotSet,
            hospital_id: Set(ctx.hospital_id),
            patient_id: Set(input.patient_id),
            issued_by: Set(ctx.staff_id),
            payment_method: Set(input.payment_method.trim().to_string()),
            status: Set(input.status),
            total_amount: Set(total_amount),
            created_at: Set(Utc::now().naive_utc()),
        };
        let sale = insert_sale_with_unique_number(&txn, sale, random_sale_number).await?;

        SaleLine::insert_many(line_models).exec(&txn).await?;
        let lines = SaleLine::find()
            .filter(sale_line::Column::SaleId.eq(sale.id))
            .all(&txn)
            .await?;

        txn.commit().await?;

        info!(
            sale_id = %sale.id,
            sale_number = %sale.sale_number,
            total_amount = %sale.total_amount,
            line_count = lines.len(),
            "Sale created"
        );

        if let Err(e) = self
            .event_sender
            .send(Event::SaleCompleted {
                sale_id: sale.id,
                sale_number: sale.sale_number.clone(),
                hospital_id: ctx.hospital_id,
                total_amount: sale.total_amount,
            })
            .await
        {
            error!("Failed to send sale completed event: {}", e);
        }

        Ok(SaleDetails { sale, lines })
    }

    /// Fetches a sale with its lines, scoped to the tenant
    pub async fn get_sale(
        &self,
        ctx: TenantContext,
        sale_id: Uuid,
    ) -> Result<SaleDetails, ServiceError> {
        let sale = Sale::find_by_id(sale_id)
            .filter(sale::Column::HospitalId.eq(ctx.hospital_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Sale {} not found", sale_id)))?;

        self.with_lines(sale).await
    }

    /// Fetches a sale by its public sale number
    pub async fn get_sale_by_number(
        &self,
        ctx: TenantContext,
        sale_number: &str,
    ) -> Result<SaleDetails, ServiceError> {
        let sale = Sale::find()
            .filter(sale::Column::HospitalId.eq(ctx.hospital_id))
            .filter(sale::Column::SaleNumber.eq(sale_number))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Sale {} not found", sale_number)))?;

        self.with_lines(sale).await
    }

    /// Lists the tenant's sales, newest first
    #[instrument(skip(self), fields(hospital_id = %ctx.hospital_id))]
    pub async fn list_sales(
        &self,
        ctx: TenantContext,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<sale::Model>, u64), ServiceError> {
        let paginator = Sale::find()
            .filter(sale::Column::HospitalId.eq(ctx.hospital_id))
            .order_by_desc(sale::Column::CreatedAt)
            .paginate(&*self.db, limit);

        let total = paginator.num_items().await?;
        let sales = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((sales, total))
    }

    async fn with_lines(&self, sale: sale::Model) -> Result<SaleDetails, ServiceError> {
        let lines = SaleLine::find()
            .filter(sale_line::Column::SaleId.eq(sale.id))
            .all(&*self.db)
            .await?;
        Ok(SaleDetails { sale, lines })
    }
}

/// Inserts the sale under a freshly drawn sale number, retrying a bounded
/// number of times when the unique index reports a collision, then surfacing
/// a conflict. Uniqueness is enforced by the index rather than a pre-insert
/// read, so two concurrent sales drawing the same number cannot both pass; a
/// savepoint per attempt keeps a rejected insert from poisoning the outer
/// transaction.
async fn insert_sale_with_unique_number(
    txn: &DatabaseTransaction,
    mut sale: sale::ActiveModel,
    mut next_number: impl FnMut() -> String,
) -> Result<sale::Model, ServiceError> {
    for _ in 0..SALE_NUMBER_ATTEMPTS {
        sale.sale_number = Set(next_number());
        let attempt = txn.begin().await?;
        match sale.clone().insert(&attempt).await {
            Ok(inserted) => {
                attempt.commit().await?;
                return Ok(inserted);
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                attempt.rollback().await?;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(ServiceError::Conflict(
        "Could not allocate a unique sale number".to_string(),
    ))
}

fn random_sale_number() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SALE_NUMBER_LEN)
        .map(|_| SALE_NUMBER_CHARSET[rng.gen_range(0..SALE_NUMBER_CHARSET.len())] as char)
        .collect();
    format!("{}{}", SALE_NUMBER_PREFIX, suffix)
}
