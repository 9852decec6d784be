//! Schema migrations for [`SeaOrmStorage`](crate::SeaOrmStorage).

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_client_storage_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    // Own tracking table so the host application's migrations are unaffected
    fn migration_table_name() -> sea_orm::DynIden {
        Alias::new("signage_client_migrations").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(
            m20240101_000001_create_client_storage_table::Migration,
        )]
    }
}
