use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A processed return against a sale. Immutable once created.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sale_returns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sale_id: Uuid,
    pub hospital_id: Uuid,
    pub processed_by: Uuid,
    pub reason: String,
    pub total_refund: Decimal,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sale::Entity",
        from = "Column::SaleId",
        to = "super::sale::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Sale,
    #[sea_orm(has_many = "super::return_line::Entity")]
    ReturnLines,
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sale.def()
    }
}

impl Related<super::return_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReturnLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
