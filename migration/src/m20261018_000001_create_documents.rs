use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Document::Table)
                    .if_not_exists()
                    .col(string(Document::Collection))
                    .col(string(Document::Id))
                    .col(json_binary(Document::Data))
                    .col(
                        timestamp_with_time_zone(Document::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Document::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_document")
                            .col(Document::Collection)
                            .col(Document::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing a collection is the hot path
        manager
            .create_index(
                Index::create()
                    .name("idx_document_collection_created")
                    .table(Document::Table)
                    .col(Document::Collection)
                    .col(Document::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Document::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Document {
    Table,
    Collection,
    Id,
    Data,
    CreatedAt,
    UpdatedAt,
}
