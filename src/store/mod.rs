use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::catalog::EntityKind;
use crate::query::compiler::OrderBy;
use crate::query::params::Pagination;
use crate::query::predicate::Predicate;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Entities are generic JSON records; the relational schema is owned
/// elsewhere and consumed by reference.
pub type Record = serde_json::Map<String, Value>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

/// The persistence seam. All reads take a [`Predicate`] compiled by the
/// query layer; each implementation owns the translation to its native form.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_one(&self, kind: EntityKind, predicate: &Predicate) -> Result<Option<Record>, StoreError>;

    async fn find_all(
        &self,
        kind: EntityKind,
        predicate: &Predicate,
        order: &OrderBy,
        window: &Pagination,
    ) -> Result<Vec<Record>, StoreError>;

    async fn count(&self, kind: EntityKind, predicate: &Predicate) -> Result<i64, StoreError>;

    async fn create(&self, kind: EntityKind, record: Record) -> Result<Record, StoreError>;

    async fn update(&self, kind: EntityKind, id: &str, changes: Record) -> Result<Record, StoreError>;

    async fn destroy(&self, kind: EntityKind, id: &str) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
