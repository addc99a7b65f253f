use std::time::Duration;

use serde_json::Value;

use crate::catalog::{self, EntityKind};
use crate::config;
use crate::error::ApiError;
use crate::guard::RequestContext;
use crate::query::compiler::{compile, Scope};
use crate::query::pagination::{self, PaginationMeta};
use crate::store::Store;

#[derive(Debug)]
pub struct ListOutcome {
    pub rows: Vec<Value>,
    pub pagination: PaginationMeta,
}

/// Answer a "list entities, optionally scoped to a parent" request.
///
/// Compiles the request's filter/search/sort into a predicate, injects the
/// scope, then issues a count and a windowed fetch. The two reads are
/// independent round trips; a count/row mismatch under concurrent writes is
/// an accepted staleness artifact of the read-only pair.
pub async fn list(
    store: &dyn Store,
    kind: EntityKind,
    ctx: &RequestContext,
    scope: Option<Scope>,
    path: &str,
    raw_query: &str,
) -> Result<ListOutcome, ApiError> {
    let (predicate, ordering) = compile(&ctx.params, kind.list_spec(), scope.as_ref())?;
    let window = ctx.params.pagination.clone();

    let deadline = Duration::from_millis(config::config().api.request_timeout_ms);
    let (total, records) = tokio::time::timeout(
        deadline,
        futures::future::try_join(
            store.count(kind, &predicate),
            store.find_all(kind, &predicate, &ordering, &window),
        ),
    )
    .await
    .map_err(|_| ApiError::storage("storage query exceeded the request deadline"))??;

    tracing::debug!(
        "listed {} of {} {} rows (limit {}, offset {})",
        records.len(),
        total,
        kind.table(),
        window.limit,
        window.offset
    );

    let mut rows = Vec::with_capacity(records.len());
    for mut record in records {
        catalog::decorate(store, kind, &mut record).await?;
        rows.push(Value::Object(record));
    }

    let pagination = pagination::build(total, window.limit, window.offset, path, raw_query);
    Ok(ListOutcome { rows, pagination })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::Principal;
    use crate::query::params::ListParams;
    use crate::store::{MemoryStore, Record};
    use serde_json::json;
    use uuid::Uuid;

    fn context(query: &str) -> RequestContext {
        let principal = Principal {
            user_id: Uuid::new_v4(),
            handle: "tester".into(),
            role: "user".into(),
        };
        RequestContext::new(principal, ListParams::parse(query))
    }

    fn team(id: &str, name: &str, stamp: &str) -> Record {
        let mut record = Record::new();
        record.insert("id".into(), json!(id));
        record.insert("name".into(), json!(name));
        record.insert("createdAt".into(), json!(stamp));
        record.insert("updatedAt".into(), json!(stamp));
        record
    }

    #[tokio::test]
    async fn lists_with_metadata_and_decoration() {
        let store = MemoryStore::new();
        store.insert(EntityKind::Team, team("t-1", "ops", "2024-01-02T00:00:00Z"));
        store.insert(EntityKind::Team, team("t-2", "dev", "2024-01-01T00:00:00Z"));
        for (id, team_id) in [("m-1", "t-1"), ("m-2", "t-1")] {
            let mut m = Record::new();
            m.insert("id".into(), json!(id));
            m.insert("teamId".into(), json!(team_id));
            m.insert("userId".into(), json!(Uuid::new_v4().to_string()));
            m.insert("role".into(), json!("member"));
            store.insert(EntityKind::Membership, m);
        }

        let ctx = context("");
        let outcome = list(&store, EntityKind::Team, &ctx, None, "/api/teams", "")
            .await
            .unwrap();

        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.pagination.total, 2);
        assert_eq!(outcome.pagination.pages, 1);
        // newest first, member counts attached
        assert_eq!(outcome.rows[0]["name"], json!("ops"));
        assert_eq!(outcome.rows[0]["memberCount"], json!(2));
        assert_eq!(outcome.rows[1]["memberCount"], json!(0));
    }

    #[tokio::test]
    async fn empty_result_is_not_an_error() {
        let store = MemoryStore::new();
        let ctx = context("");
        let outcome = list(&store, EntityKind::Project, &ctx, None, "/api/projects", "")
            .await
            .unwrap();
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.pagination.total, 0);
        assert_eq!(outcome.pagination.pages, 0);
        assert_eq!(outcome.pagination.limit, 20);
    }

    #[tokio::test]
    async fn scope_restricts_rows_even_with_client_filters() {
        let store = MemoryStore::new();
        store.insert(EntityKind::Project, {
            let mut p = Record::new();
            p.insert("id".into(), json!("p-1"));
            p.insert("teamId".into(), json!("t-1"));
            p.insert("name".into(), json!("site"));
            p.insert("updatedAt".into(), json!("2024-01-01T00:00:00Z"));
            p
        });
        store.insert(EntityKind::Project, {
            let mut p = Record::new();
            p.insert("id".into(), json!("p-2"));
            p.insert("teamId".into(), json!("t-2"));
            p.insert("name".into(), json!("site"));
            p.insert("updatedAt".into(), json!("2024-01-01T00:00:00Z"));
            p
        });

        // client tries to filter into the other team
        let ctx = context("teamId=t-2&name=site");
        let scope = Scope::new("teamId", json!("t-1"));
        let outcome = list(&store, EntityKind::Project, &ctx, Some(scope), "/x", "")
            .await
            .unwrap();
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0]["id"], json!("p-1"));
    }

    #[tokio::test]
    async fn unknown_sort_attribute_is_a_validation_error() {
        let store = MemoryStore::new();
        let ctx = context("@sort=secretColumn");
        let err = list(&store, EntityKind::Team, &ctx, None, "/x", "")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
