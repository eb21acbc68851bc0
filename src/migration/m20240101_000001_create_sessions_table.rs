use sea_orm_migration::prelude::*;

use crate::config::DEFAULT_TABLE;
use crate::database_store::{
    last_activity_index_name, last_activity_index_statement, table_create_statement,
};

/// Creates the default `sessions` table and its `last_activity` index.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(table_create_statement(DEFAULT_TABLE))
            .await?;

        let index = last_activity_index_name(DEFAULT_TABLE);
        if !manager.has_index(DEFAULT_TABLE, &index).await? {
            manager
                .create_index(last_activity_index_statement(DEFAULT_TABLE))
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new(DEFAULT_TABLE)).to_owned())
            .await
    }
}
