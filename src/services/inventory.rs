use crate::{
    entities::inventory_item::{self, Entity as InventoryItem},
    errors::ServiceError,
    events::{Event, EventSender},
    tenant::TenantContext,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{error, instrument, warn};
use uuid::Uuid;

/// Input for creating a catalog item
#[derive(Debug, Clone)]
pub struct CreateItem {
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}

/// Input for editing a catalog item. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateItem {
    pub name: Option<String>,
    pub unit_price: Option<Decimal>,
    pub quantity: Option<i32>,
}

/// Inventory ledger: authoritative on-hand quantities plus the catalog
/// management surface. The two ledger primitives (`reserve_stock`,
/// `restore_stock`) run on whatever connection the caller passes, so the
/// sale/return processors can keep them inside their own transaction.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl InventoryService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Atomically decrements on-hand quantity for an item, failing when the
    /// item is missing from the tenant's catalog or stock is short.
    ///
    /// The sufficiency check and the decrement are a single conditional
    /// UPDATE (`... AND quantity >= requested`), so two concurrent callers
    /// can never both succeed past the point where combined decrements would
    /// drive the quantity negative. Returns the pre-decrement row so callers
    /// can snapshot name and unit price.
    pub async fn reserve_stock<C: ConnectionTrait>(
        conn: &C,
        hospital_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<inventory_item::Model, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::ValidationError(format!(
                "Quantity for item {} must be a positive integer",
                item_id
            )));
        }

        let item = InventoryItem::find_by_id(item_id)
            .filter(inventory_item::Column::HospitalId.eq(hospital_id))
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Inventory item {} not found", item_id))
            })?;

        let update = InventoryItem::update_many()
            .col_expr(
                inventory_item::Column::Quantity,
                Expr::col(inventory_item::Column::Quantity).sub(quantity),
            )
            .col_expr(
                inventory_item::Column::UpdatedAt,
                Expr::value(Utc::now().naive_utc()),
            )
            .filter(inventory_item::Column::Id.eq(item_id))
            .filter(inventory_item::Column::HospitalId.eq(hospital_id))
            .filter(inventory_item::Column::Quantity.gte(quantity))
            .exec(conn)
            .await?;

        if update.rows_affected == 0 {
            // Lost the race or never had enough; re-read for an accurate message
            let available = InventoryItem::find_by_id(item_id)
                .filter(inventory_item::Column::HospitalId.eq(hospital_id))
                .one(conn)
                .await?
                .map(|current| current.quantity)
                .unwrap_or(0);
            warn!(
                item_id = %item_id,
                available,
                requested = quantity,
                "Stock reservation rejected"
            );
            return Err(ServiceError::InsufficientStock(format!(
                "Not enough stock for {}. Available: {}, Requested: {}",
                item.name, available, quantity
            )));
        }

        Ok(item)
    }

    /// Increments on-hand quantity for an item. No upper bound is enforced;
    /// fails only when the item does not exist within the tenant.
    pub async fn restore_stock<C: ConnectionTrait>(
        conn: &C,
        hospital_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<(), ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::ValidationError(format!(
                "Quantity for item {} must be a positive integer",
                item_id
            )));
        }

        let update = InventoryItem::update_many()
            .col_expr(
                inventory_item::Column::Quantity,
                Expr::col(inventory_item::Column::Quantity).add(quantity),
            )
            .col_expr(
                inventory_item::Column::UpdatedAt,
                Expr::value(Utc::now().naive_utc()),
            )
            .filter(inventory_item::Column::Id.eq(item_id))
            .filter(inventory_item::Column::HospitalId.eq(hospital_id))
            .exec(conn)
            .await?;

        if update.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Inventory item {} not found",
                item_id
            )));
        }

        Ok(())
    }

    /// Adds an item to the tenant's catalog
    #[instrument(skip(self, input), fields(hospital_id = %ctx.hospital_id))]
    pub async fn create_item(
        &self,
        ctx: TenantContext,
        input: CreateItem,
    ) -> Result<inventory_item::Model, ServiceError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "Item name cannot be empty".to_string(),
            ));
        }
        if input.unit_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Unit price for {} cannot be negative",
                name
            )));
        }
        if input.quantity < 0 {
            return Err(ServiceError::ValidationError(format!(
                "Quantity for {} cannot be negative",
                name
            )));
        }

        let existing = InventoryItem::find()
            .filter(inventory_item::Column::HospitalId.eq(ctx.hospital_id))
            .filter(inventory_item::Column::Name.eq(name))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Inventory item '{}' already exists",
                name
            )));
        }

        let now = Utc::now().naive_utc();
        let item = inventory_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            hospital_id: Set(ctx.hospital_id),
            name: Set(name.to_string()),
            unit_price: Set(input.unit_price),
            quantity: Set(input.quantity),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let item = item.insert(&*self.db).await?;

        if let Err(e) = self
            .event_sender
            .send(Event::InventoryItemCreated(item.id))
            .await
        {
            error!("Failed to send inventory item created event: {}", e);
        }

        Ok(item)
    }

    /// Edits name, price, or quantity of a catalog item
    #[instrument(skip(self, input), fields(hospital_id = %ctx.hospital_id))]
    pub async fn update_item(
        &self,
        ctx: TenantContext,
        item_id: Uuid,
        input: UpdateItem,
    ) -> Result<inventory_item::Model, ServiceError> {
        let item = self.get_item(ctx, item_id).await?;

        if let Some(price) = input.unit_price {
            if price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Unit price for {} cannot be negative",
                    item.name
                )));
            }
        }
        if let Some(quantity) = input.quantity {
            if quantity < 0 {
                return Err(ServiceError::ValidationError(format!(
                    "Quantity for {} cannot be negative",
                    item.name
                )));
            }
        }

        let mut update: inventory_item::ActiveModel = item.into();
        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Item name cannot be empty".to_string(),
                ));
            }
            let clash = InventoryItem::find()
                .filter(inventory_item::Column::HospitalId.eq(ctx.hospital_id))
                .filter(inventory_item::Column::Name.eq(name.as_str()))
                .filter(inventory_item::Column::Id.ne(item_id))
                .one(&*self.db)
                .await?;
            if clash.is_some() {
                return Err(ServiceError::Conflict(format!(
                    "Inventory item '{}' already exists",
                    name
                )));
            }
            update.name = Set(name);
        }
        if let Some(price) = input.unit_price {
            update.unit_price = Set(price);
        }
        if let Some(quantity) = input.quantity {
            update.quantity = Set(quantity);
        }
        update.updated_at = Set(Utc::now().naive_utc());

        let item = update.update(&*self.db).await?;

        if let Err(e) = self
            .event_sender
            .send(Event::InventoryItemUpdated(item.id))
            .await
        {
            error!("Failed to send inventory item updated event: {}", e);
        }

        Ok(item)
    }

    /// Fetches a single item within the tenant
    pub async fn get_item(
        &self,
        ctx: TenantContext,
        item_id: Uuid,
    ) -> Result<inventory_item::Model, ServiceError> {
        InventoryItem::find_by_id(item_id)
            .filter(inventory_item::Column::HospitalId.eq(ctx.hospital_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Inventory item {} not found", item_id)))
    }

    /// Lists the tenant's catalog with pagination
    #[instrument(skip(self), fields(hospital_id = %ctx.hospital_id))]
    pub async fn list_items(
        &self,
        ctx: TenantContext,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<inventory_item::Model>, u64), ServiceError> {
        let paginator = InventoryItem::find()
            .filter(inventory_item::Column::HospitalId.eq(ctx.hospital_id))
            .order_by_asc(inventory_item::Column::Name)
            .paginate(&*self.db, limit);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }
}
