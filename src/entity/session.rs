//! Session entity model for Sea-ORM database interaction.

use sea_orm::entity::prelude::*;

/// Sea-ORM entity model representing a session row.
///
/// # Database Schema
///
/// | Column        | Type               | Description                         |
/// |---------------|--------------------|-------------------------------------|
/// | id            | TEXT (Primary Key) | Session ID                          |
/// | payload       | BLOB / BYTEA       | MessagePack serialized session data |
/// | last_activity | BIGINT             | Unix timestamp of the last write    |
///
/// `sessions` is only the default table name; [`DatabaseStore`](crate::DatabaseStore)
/// queries whichever table it was configured with.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,

    /// Nullable on read so rows written by other tools can be recognised as
    /// having no payload.
    pub payload: Option<Vec<u8>>,

    pub last_activity: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
