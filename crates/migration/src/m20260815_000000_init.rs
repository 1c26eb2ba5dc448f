//! Initial schema migration.
//!
//! Creates the single `activities` table: one row per construction expense
//! with its total cost and the two per-couple payment accumulators, all in
//! integer centavos.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Activities {
    Table,
    Id,
    Name,
    Sector,
    TotalCostCents,
    PaidAlexRuteCents,
    PaidDiegoAnaCents,
    Status,
    PaymentDate,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Activities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Activities::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Activities::Name).string().not_null())
                    .col(ColumnDef::new(Activities::Sector).string())
                    .col(
                        ColumnDef::new(Activities::TotalCostCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Activities::PaidAlexRuteCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Activities::PaidDiegoAnaCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Activities::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Activities::PaymentDate).string())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Activities::Table).to_owned())
            .await?;
        Ok(())
    }
}
