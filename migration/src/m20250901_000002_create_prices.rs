use sea_orm_migration::prelude::*;

use crate::m20250901_000001_create_items::Items;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Prices::Table)
                    .if_not_exists()
                    .col(
                        // One price row per item, upserted in place
                        ColumnDef::new(Prices::ItemId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Prices::HighPrice).big_integer().null())
                    .col(ColumnDef::new(Prices::HighTime).big_integer().null())
                    .col(ColumnDef::new(Prices::LowPrice).big_integer().null())
                    .col(ColumnDef::new(Prices::LowTime).big_integer().null())
                    .col(
                        ColumnDef::new(Prices::LastUpdated)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_prices_item_id")
                            .from(Prices::Table, Prices::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Prices::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Prices {
    Table,
    ItemId,
    HighPrice,
    HighTime,
    LowPrice,
    LowTime,
    LastUpdated,
}
