use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClientStorage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClientStorage::Key)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClientStorage::Value).text().not_null())
                    .col(
                        ColumnDef::new(ClientStorage::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClientStorage::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ClientStorage {
    Table,
    Key,
    Value,
    UpdatedAt,
}
