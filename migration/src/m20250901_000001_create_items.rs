use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(
                        // Item id comes from the upstream mapping feed, not a sequence
                        ColumnDef::new(Items::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Items::Name).string().not_null())
                    .col(ColumnDef::new(Items::Examine).text().null())
                    .col(
                        ColumnDef::new(Items::Members)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Items::Lowalch).integer().null())
                    .col(ColumnDef::new(Items::Highalch).integer().null())
                    .col(ColumnDef::new(Items::LimitValue).integer().null())
                    .col(ColumnDef::new(Items::Value).integer().null())
                    .col(ColumnDef::new(Items::Icon).string().null())
                    .col(
                        ColumnDef::new(Items::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Listings are served ordered by name
        manager
            .create_index(
                Index::create()
                    .name("idx_items_name")
                    .table(Items::Table)
                    .col(Items::Name)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Items {
    Table,
    Id,
    Name,
    Examine,
    Members,
    Lowalch,
    Highalch,
    LimitValue,
    Value,
    Icon,
    UpdatedAt,
}
