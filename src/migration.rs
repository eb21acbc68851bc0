//! Schema migrations for applications that manage their database with
//! `sea-orm-migration` rather than letting the controller create the table.

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_sessions_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    // Override the name of migration table to avoid conflicts
    fn migration_table_name() -> sea_orm::DynIden {
        Alias::new("gears_session_migrations").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_create_sessions_table::Migration)]
    }
}
