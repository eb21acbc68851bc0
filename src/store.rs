use std::fmt::Debug;

use async_trait::async_trait;

use crate::entity::session;
use crate::error::StoreError;

/// A stored session row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: String,
    /// Serialized session data. `None` when the row exists without a payload.
    pub payload: Option<Vec<u8>>,
    /// Unix timestamp, in seconds, of the last write.
    pub last_activity: i64,
}

impl From<session::Model> for SessionRecord {
    fn from(model: session::Model) -> Self {
        Self {
            id: model.id,
            payload: model.payload,
            last_activity: model.last_activity,
        }
    }
}

/// Persistence for session records.
///
/// Each call must be atomic with respect to a single record; the controller
/// adds no locking of its own.
#[async_trait]
pub trait PayloadStore: Debug + Send + Sync + 'static {
    /// Loads the record with the given id.
    async fn find(&self, id: &str) -> Result<Option<SessionRecord>, StoreError>;

    /// Inserts or replaces the whole record.
    async fn upsert(
        &self,
        id: &str,
        payload: &[u8],
        last_activity: i64,
    ) -> Result<(), StoreError>;

    /// Deletes the record, succeeding if it does not exist.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Deletes every record with `last_activity < cutoff` in one statement,
    /// returning the number removed.
    async fn delete_expired(&self, cutoff: i64) -> Result<u64, StoreError>;
}
