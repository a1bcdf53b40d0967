//! Ledger schema.
//!
//! One append-only table with the sheet columns `date`, `kind`, `amount`,
//! `description`, stored as text and parsed by the engine on read. `id`
//! gives the storage order.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum LedgerRows {
    Table,
    Id,
    Date,
    Kind,
    Amount,
    Description,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LedgerRows::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerRows::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerRows::Date).string().not_null())
                    .col(ColumnDef::new(LedgerRows::Kind).string().not_null())
                    .col(ColumnDef::new(LedgerRows::Amount).string().not_null())
                    .col(ColumnDef::new(LedgerRows::Description).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_rows-date")
                    .table(LedgerRows::Table)
                    .col(LedgerRows::Date)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LedgerRows::Table).to_owned())
            .await
    }
}
