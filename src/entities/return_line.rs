use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One returned item on a return record. Refund amount is computed from the
/// originating sale line's unit price snapshot.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "return_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub return_id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
    pub refund_amount: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sale_return::Entity",
        from = "Column::ReturnId",
        to = "super::sale_return::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    SaleReturn,
}

impl Related<super::sale_return::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleReturn.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
