use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::catalog::EntityKind;
use crate::query::compiler::OrderBy;
use crate::query::params::{Pagination, SortOrder};
use crate::query::predicate::Predicate;

use super::{Record, Store, StoreError};

/// In-memory store used by the test suites and by DATABASE_URL-less
/// development. Read operations are counted per kind so tests can observe
/// that a short-circuited guard chain never touched storage.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<EntityKind, Vec<Record>>>,
    reads: Mutex<HashMap<EntityKind, usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing the `Store` interface.
    pub fn insert(&self, kind: EntityKind, record: Record) {
        self.data.write().unwrap().entry(kind).or_default().push(record);
    }

    /// Number of read operations (find/count) issued against a kind.
    pub fn read_count(&self, kind: EntityKind) -> usize {
        *self.reads.lock().unwrap().get(&kind).unwrap_or(&0)
    }

    fn bump(&self, kind: EntityKind) {
        *self.reads.lock().unwrap().entry(kind).or_insert(0) += 1;
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn value_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a)
            .cmp(&type_rank(b))
            .then_with(|| a.to_string().cmp(&b.to_string())),
    }
}

fn record_id(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_one(&self, kind: EntityKind, predicate: &Predicate) -> Result<Option<Record>, StoreError> {
        self.bump(kind);
        let data = self.data.read().unwrap();
        Ok(data
            .get(&kind)
            .and_then(|rows| rows.iter().find(|r| predicate.matches(r)).cloned()))
    }

    async fn find_all(
        &self,
        kind: EntityKind,
        predicate: &Predicate,
        order: &OrderBy,
        window: &Pagination,
    ) -> Result<Vec<Record>, StoreError> {
        self.bump(kind);
        let data = self.data.read().unwrap();
        let mut rows: Vec<Record> = data
            .get(&kind)
            .map(|rows| rows.iter().filter(|r| predicate.matches(r)).cloned().collect())
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            let av = a.get(&order.attribute).unwrap_or(&Value::Null);
            let bv = b.get(&order.attribute).unwrap_or(&Value::Null);
            let primary = match order.order {
                SortOrder::Asc => value_cmp(av, bv),
                SortOrder::Desc => value_cmp(bv, av),
            };
            // deterministic tiebreak for stable pagination
            primary.then_with(|| {
                value_cmp(
                    a.get("id").unwrap_or(&Value::Null),
                    b.get("id").unwrap_or(&Value::Null),
                )
            })
        });

        let offset = window.offset.max(0) as usize;
        let limit = window.limit.max(0) as usize;
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, kind: EntityKind, predicate: &Predicate) -> Result<i64, StoreError> {
        self.bump(kind);
        let data = self.data.read().unwrap();
        Ok(data
            .get(&kind)
            .map(|rows| rows.iter().filter(|r| predicate.matches(r)).count())
            .unwrap_or(0) as i64)
    }

    async fn create(&self, kind: EntityKind, record: Record) -> Result<Record, StoreError> {
        self.data.write().unwrap().entry(kind).or_default().push(record.clone());
        Ok(record)
    }

    async fn update(&self, kind: EntityKind, id: &str, changes: Record) -> Result<Record, StoreError> {
        let mut data = self.data.write().unwrap();
        let rows = data
            .get_mut(&kind)
            .ok_or_else(|| StoreError::Query(format!("no such row in {}", kind.table())))?;
        let row = rows
            .iter_mut()
            .find(|r| record_id(r) == Some(id))
            .ok_or_else(|| StoreError::Query(format!("no such row in {}", kind.table())))?;
        for (key, value) in changes {
            row.insert(key, value);
        }
        Ok(row.clone())
    }

    async fn destroy(&self, kind: EntityKind, id: &str) -> Result<(), StoreError> {
        let mut data = self.data.write().unwrap();
        if let Some(rows) = data.get_mut(&kind) {
            rows.retain(|r| record_id(r) != Some(id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
