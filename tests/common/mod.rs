#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use gears_session::{DatabaseStore, IdGenerator, PayloadStore, SessionRecord, StoreError};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use time::OffsetDateTime;

pub const TEST_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

/// A fresh in-memory SQLite database. A single pooled connection keeps every
/// query on the same database.
pub async fn sqlite_conn() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    Database::connect(opt).await.unwrap()
}

pub async fn sqlite_store() -> DatabaseStore {
    let store = DatabaseStore::new(sqlite_conn().await);
    store.create_table().await.unwrap();
    store
}

/// Yields `N1`, `N2`, ...
pub fn sequential_ids() -> impl IdGenerator {
    let counter = Arc::new(AtomicUsize::new(0));
    move || format!("N{}", counter.fetch_add(1, Ordering::SeqCst) + 1)
}

pub fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// A store whose backend is down.
#[derive(Debug)]
pub struct UnreachableStore;

fn refused() -> StoreError {
    StoreError::Backend("connection refused".into())
}

#[async_trait]
impl PayloadStore for UnreachableStore {
    async fn find(&self, _id: &str) -> Result<Option<SessionRecord>, StoreError> {
        Err(refused())
    }

    async fn upsert(&self, _id: &str, _payload: &[u8], _at: i64) -> Result<(), StoreError> {
        Err(refused())
    }

    async fn delete(&self, _id: &str) -> Result<(), StoreError> {
        Err(refused())
    }

    async fn delete_expired(&self, _cutoff: i64) -> Result<u64, StoreError> {
        Err(refused())
    }
}
