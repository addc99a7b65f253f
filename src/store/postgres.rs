use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::{PgPool, Row};

use crate::catalog::EntityKind;
use crate::config;
use crate::query::compiler::OrderBy;
use crate::query::params::Pagination;
use crate::query::predicate::Predicate;

use super::{Record, Store, StoreError};

/// PostgreSQL-backed store. Predicates compile to parameterized SQL with
/// `$n` placeholders; identifiers are validated before quoting.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let cfg = &config::config().database;
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn quote_ident(name: &str) -> Result<String, StoreError> {
    if !crate::query::is_identifier(name) {
        return Err(StoreError::Query(format!("invalid identifier: {}", name)));
    }
    Ok(format!("\"{}\"", name))
}

fn escape_like(needle: &str) -> String {
    needle.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Single translation point from [`Predicate`] to SQL text plus bind values.
fn render_predicate(predicate: &Predicate, params: &mut Vec<Value>) -> Result<String, StoreError> {
    match predicate {
        Predicate::True => Ok("TRUE".to_string()),
        Predicate::Eq(field, value) => {
            let column = quote_ident(field)?;
            if value.is_null() {
                Ok(format!("{} IS NULL", column))
            } else {
                params.push(value.clone());
                Ok(format!("{} = ${}", column, params.len()))
            }
        }
        Predicate::ILike(field, needle) => {
            let column = quote_ident(field)?;
            params.push(Value::String(format!("%{}%", escape_like(needle))));
            Ok(format!("{} ILIKE ${}", column, params.len()))
        }
        Predicate::And(parts) => {
            let rendered: Result<Vec<String>, StoreError> = parts
                .iter()
                .map(|p| render_predicate(p, params).map(|s| format!("({})", s)))
                .collect();
            Ok(rendered?.join(" AND "))
        }
        Predicate::Or(parts) => {
            let rendered: Result<Vec<String>, StoreError> = parts
                .iter()
                .map(|p| render_predicate(p, params).map(|s| format!("({})", s)))
                .collect();
            Ok(rendered?.join(" OR "))
        }
    }
}

fn render_order(order: &OrderBy) -> Result<String, StoreError> {
    // secondary id tiebreak keeps pagination reproducible for equal keys
    Ok(format!(
        "ORDER BY {} {}, \"id\" ASC",
        quote_ident(&order.attribute)?,
        order.order.as_sql()
    ))
}

fn bind_value<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    value: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match value {
        Value::Null => {
            let none: Option<String> = None;
            query.bind(none)
        }
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                query.bind(i)
            } else if let Some(f) = n.as_f64() {
                query.bind(f)
            } else {
                query.bind(n.to_string())
            }
        }
        Value::String(s) => query.bind(s),
        // arrays and objects go through as JSONB
        other => query.bind(other.clone()),
    }
}

fn row_to_record(row: sqlx::postgres::PgRow) -> Result<Record, StoreError> {
    let value: Value = row
        .try_get("row")
        .map_err(|e| StoreError::Query(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Query(format!("expected row object, got {}", other))),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_one(&self, kind: EntityKind, predicate: &Predicate) -> Result<Option<Record>, StoreError> {
        let mut params = Vec::new();
        let where_sql = render_predicate(predicate, &mut params)?;
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"{}\" WHERE {} LIMIT 1) t",
            kind.table(),
            where_sql
        );

        let mut query = sqlx::query(&sql);
        for value in &params {
            query = bind_value(query, value);
        }
        query
            .fetch_optional(&self.pool)
            .await?
            .map(row_to_record)
            .transpose()
    }

    async fn find_all(
        &self,
        kind: EntityKind,
        predicate: &Predicate,
        order: &OrderBy,
        window: &Pagination,
    ) -> Result<Vec<Record>, StoreError> {
        let mut params = Vec::new();
        let where_sql = render_predicate(predicate, &mut params)?;
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"{}\" WHERE {} {} LIMIT {} OFFSET {}) t",
            kind.table(),
            where_sql,
            render_order(order)?,
            window.limit.max(0),
            window.offset.max(0)
        );

        let mut query = sqlx::query(&sql);
        for value in &params {
            query = bind_value(query, value);
        }
        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(row_to_record)
            .collect()
    }

    async fn count(&self, kind: EntityKind, predicate: &Predicate) -> Result<i64, StoreError> {
        let mut params = Vec::new();
        let where_sql = render_predicate(predicate, &mut params)?;
        let sql = format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", kind.table(), where_sql);

        let mut query = sqlx::query(&sql);
        for value in &params {
            query = bind_value(query, value);
        }
        let row = query.fetch_one(&self.pool).await?;
        row.try_get("count").map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn create(&self, kind: EntityKind, record: Record) -> Result<Record, StoreError> {
        let mut columns = Vec::with_capacity(record.len());
        let mut placeholders = Vec::with_capacity(record.len());
        let mut params = Vec::with_capacity(record.len());
        for (key, value) in &record {
            columns.push(quote_ident(key)?);
            params.push(value.clone());
            placeholders.push(format!("${}", params.len()));
        }

        let table = kind.table();
        let sql = format!(
            "INSERT INTO \"{table}\" ({}) VALUES ({}) RETURNING row_to_json(\"{table}\") AS row",
            columns.join(", "),
            placeholders.join(", ")
        );

        let mut query = sqlx::query(&sql);
        for value in &params {
            query = bind_value(query, value);
        }
        row_to_record(query.fetch_one(&self.pool).await?)
    }

    async fn update(&self, kind: EntityKind, id: &str, changes: Record) -> Result<Record, StoreError> {
        let mut assignments = Vec::with_capacity(changes.len());
        let mut params = Vec::with_capacity(changes.len() + 1);
        for (key, value) in &changes {
            params.push(value.clone());
            assignments.push(format!("{} = ${}", quote_ident(key)?, params.len()));
        }
        params.push(Value::String(id.to_string()));

        let table = kind.table();
        let sql = format!(
            "UPDATE \"{table}\" SET {} WHERE \"id\" = ${} RETURNING row_to_json(\"{table}\") AS row",
            assignments.join(", "),
            params.len()
        );

        let mut query = sqlx::query(&sql);
        for value in &params {
            query = bind_value(query, value);
        }
        query
            .fetch_optional(&self.pool)
            .await?
            .map(row_to_record)
            .transpose()?
            .ok_or_else(|| StoreError::Query(format!("no such row in {}", table)))
    }

    async fn destroy(&self, kind: EntityKind, id: &str) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM \"{}\" WHERE \"id\" = $1", kind.table());
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
