use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Fulfillment status of a sale.
///
/// A sale starts as `Paid` or `Unpaid` (caller-supplied at creation) and moves
/// to `PartiallyReturned` / `Returned` as return transactions are processed.
/// `Returned` and `Cancelled` are terminal; `Cancelled` is only set by
/// administrative tooling, never by the return processor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "partially_returned")]
    PartiallyReturned,
    #[sea_orm(string_value = "returned")]
    Returned,
}

/// A completed point-of-sale transaction. Immutable after creation except for
/// `status`, which the return processor recomputes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sale_number: String,
    pub hospital_id: Uuid,
    pub patient_id: Uuid,
    pub issued_by: Uuid,
    pub payment_method: String,
    pub status: SaleStatus,
    pub total_amount: Decimal,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sale_line::Entity")]
    SaleLines,
    #[sea_orm(has_many = "super::sale_return::Entity")]
    SaleReturns,
}

impl Related<super::sale_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleLines.def()
    }
}

impl Related<super::sale_return::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleReturns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
