use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_inventory_items_table::Migration),
            Box::new(m20260101_000002_create_patients_table::Migration),
            Box::new(m20260101_000003_create_sales_tables::Migration),
            Box::new(m20260101_000004_create_returns_tables::Migration),
        ]
    }
}

mod m20260101_000001_create_inventory_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000001_create_inventory_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::HospitalId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::Name).string().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::UnitPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // One catalog entry per item name within a hospital
            manager
                .create_index(
                    Index::create()
                        .name("idx_inventory_items_hospital_name")
                        .table(InventoryItems::Table)
                        .col(InventoryItems::HospitalId)
                        .col(InventoryItems::Name)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum InventoryItems {
        Table,
        Id,
        HospitalId,
        Name,
        UnitPrice,
        Quantity,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20260101_000002_create_patients_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000002_create_patients_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Patients::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Patients::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Patients::HospitalId).uuid().not_null())
                        .col(ColumnDef::new(Patients::FullName).string().not_null())
                        .col(ColumnDef::new(Patients::Phone).string().null())
                        .col(ColumnDef::new(Patients::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_patients_hospital")
                        .table(Patients::Table)
                        .col(Patients::HospitalId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Patients::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Patients {
        Table,
        Id,
        HospitalId,
        FullName,
        Phone,
        CreatedAt,
    }
}

mod m20260101_000003_create_sales_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000003_create_sales_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Sales::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Sales::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Sales::SaleNumber).string().not_null())
                        .col(ColumnDef::new(Sales::HospitalId).uuid().not_null())
                        .col(ColumnDef::new(Sales::PatientId).uuid().not_null())
                        .col(ColumnDef::new(Sales::IssuedBy).uuid().not_null())
                        .col(ColumnDef::new(Sales::PaymentMethod).string().not_null())
                        .col(ColumnDef::new(Sales::Status).string().not_null())
                        .col(ColumnDef::new(Sales::TotalAmount).decimal().not_null())
                        .col(ColumnDef::new(Sales::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            // Sale numbers are globally unique, not per tenant
            manager
                .create_index(
                    Index::create()
                        .name("idx_sales_sale_number")
                        .table(Sales::Table)
                        .col(Sales::SaleNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_sales_hospital_created")
                        .table(Sales::Table)
                        .col(Sales::HospitalId)
                        .col(Sales::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SaleLines::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(SaleLines::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(SaleLines::SaleId).uuid().not_null())
                        .col(ColumnDef::new(SaleLines::ItemId).uuid().not_null())
                        .col(ColumnDef::new(SaleLines::ItemName).string().not_null())
                        .col(ColumnDef::new(SaleLines::Quantity).integer().not_null())
                        .col(ColumnDef::new(SaleLines::UnitPrice).decimal().not_null())
                        .col(ColumnDef::new(SaleLines::LineTotal).decimal().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sale_lines_sale_id")
                                .from(SaleLines::Table, SaleLines::SaleId)
                                .to(Sales::Table, Sales::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_sale_lines_sale")
                        .table(SaleLines::Table)
                        .col(SaleLines::SaleId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SaleLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Sales::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Sales {
        Table,
        Id,
        SaleNumber,
        HospitalId,
        PatientId,
        IssuedBy,
        PaymentMethod,
        Status,
        TotalAmount,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub enum SaleLines {
        Table,
        Id,
        SaleId,
        ItemId,
        ItemName,
        Quantity,
        UnitPrice,
        LineTotal,
    }
}

mod m20260101_000004_create_returns_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000004_create_returns_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SaleReturns::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SaleReturns::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SaleReturns::SaleId).uuid().not_null())
                        .col(ColumnDef::new(SaleReturns::HospitalId).uuid().not_null())
                        .col(ColumnDef::new(SaleReturns::ProcessedBy).uuid().not_null())
                        .col(ColumnDef::new(SaleReturns::Reason).text().not_null())
                        .col(
                            ColumnDef::new(SaleReturns::TotalRefund)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SaleReturns::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sale_returns_sale_id")
                                .from(SaleReturns::Table, SaleReturns::SaleId)
                                .to(
                                    super::m20260101_000003_create_sales_tables::Sales::Table,
                                    super::m20260101_000003_create_sales_tables::Sales::Id,
                                )
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_sale_returns_sale")
                        .table(SaleReturns::Table)
                        .col(SaleReturns::SaleId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ReturnLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReturnLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ReturnLines::ReturnId).uuid().not_null())
                        .col(ColumnDef::new(ReturnLines::ItemId).uuid().not_null())
                        .col(ColumnDef::new(ReturnLines::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(ReturnLines::RefundAmount)
                                .decimal()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_return_lines_return_id")
                                .from(ReturnLines::Table, ReturnLines::ReturnId)
                                .to(SaleReturns::Table, SaleReturns::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_return_lines_return")
                        .table(ReturnLines::Table)
                        .col(ReturnLines::ReturnId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ReturnLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SaleReturns::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum SaleReturns {
        Table,
        Id,
        SaleId,
        HospitalId,
        ProcessedBy,
        Reason,
        TotalRefund,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub enum ReturnLines {
        Table,
        Id,
        ReturnId,
        ItemId,
        Quantity,
        RefundAmount,
    }
}
