use serde_json::Value;

use super::error::QueryError;
use super::params::{ListParams, SortOrder};
use super::predicate::Predicate;

/// Per-entity declaration of what the list machinery may do.
///
/// `sortable` is the sort allow-list (unknown attributes fail closed).
/// `searchable` is the set of fields `@search` matches against; an empty set
/// means the endpoint does not honor search at all.
#[derive(Debug)]
pub struct ListSpec {
    pub sortable: &'static [&'static str],
    pub searchable: &'static [&'static str],
}

impl ListSpec {
    pub fn supports_search(&self) -> bool {
        !self.searchable.is_empty()
    }
}

/// Parent-resource constraint injected by the orchestrator on nested routes.
/// Applied after everything client-supplied, so it can never be overridden.
#[derive(Debug, Clone)]
pub struct Scope {
    pub field: &'static str,
    pub value: Value,
}

impl Scope {
    pub fn new(field: &'static str, value: Value) -> Self {
        Self { field, value }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub attribute: String,
    pub order: SortOrder,
}

/// Turn normalized request parameters into a storage predicate and ordering.
///
/// An active search replaces the equality filters wholesale with an OR of
/// substring matches over the entity's searchable fields. The scope predicate
/// is ANDed on last in every mode; a scoped list can never leak rows from
/// another parent.
pub fn compile(
    params: &ListParams,
    spec: &ListSpec,
    scope: Option<&Scope>,
) -> Result<(Predicate, OrderBy), QueryError> {
    if !spec.sortable.contains(&params.sort.attribute.as_str()) {
        return Err(QueryError::UnsortableAttribute(params.sort.attribute.clone()));
    }

    let base = if !params.search.is_empty() && spec.supports_search() {
        Predicate::or(
            spec.searchable
                .iter()
                .map(|field| Predicate::ilike(*field, params.search.clone()))
                .collect(),
        )
    } else {
        Predicate::and(
            params
                .filter
                .iter()
                .filter(|(key, _)| scope.map_or(true, |s| s.field != key.as_str()))
                .map(|(key, value)| Predicate::eq(key.clone(), Value::String(value.clone())))
                .collect(),
        )
    };

    let predicate = match scope {
        Some(s) => Predicate::and(vec![base, Predicate::eq(s.field, s.value.clone())]),
        None => base,
    };

    let ordering = OrderBy {
        attribute: params.sort.attribute.clone(),
        order: params.sort.order,
    };

    Ok((predicate, ordering))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SPEC: ListSpec = ListSpec {
        sortable: &["displayName", "email", "role", "createdAt", "updatedAt"],
        searchable: &["displayName", "email", "handle"],
    };

    const NO_SEARCH_SPEC: ListSpec = ListSpec {
        sortable: &["name", "createdAt", "updatedAt"],
        searchable: &[],
    };

    #[test]
    fn filters_compile_to_equality_and() {
        let params = ListParams::parse("role=admin&email=a%40b.c");
        let (predicate, ordering) = compile(&params, &SPEC, None).unwrap();
        assert_eq!(
            predicate,
            Predicate::And(vec![
                Predicate::eq("email", json!("a@b.c")),
                Predicate::eq("role", json!("admin")),
            ])
        );
        assert_eq!(ordering.attribute, "updatedAt");
        assert_eq!(ordering.order, SortOrder::Desc);
    }

    #[test]
    fn search_replaces_filters() {
        let params = ListParams::parse("@search=ali&role=admin");
        let (predicate, _) = compile(&params, &SPEC, None).unwrap();
        assert_eq!(
            predicate,
            Predicate::Or(vec![
                Predicate::ilike("displayName", "ali"),
                Predicate::ilike("email", "ali"),
                Predicate::ilike("handle", "ali"),
            ])
        );
    }

    #[test]
    fn search_is_ignored_when_endpoint_does_not_support_it() {
        let params = ListParams::parse("@search=ali&name=ops&@sort=name");
        let (predicate, _) = compile(&params, &NO_SEARCH_SPEC, None).unwrap();
        assert_eq!(predicate, Predicate::eq("name", json!("ops")));
    }

    #[test]
    fn scope_is_anded_even_in_search_mode() {
        let params = ListParams::parse("@search=ali");
        let scope = Scope::new("teamId", json!("team-1"));
        let (predicate, _) = compile(&params, &SPEC, Some(&scope)).unwrap();
        match predicate {
            Predicate::And(parts) => {
                assert_eq!(parts.len(), 2);
                assert!(matches!(parts[0], Predicate::Or(_)));
                assert_eq!(parts[1], Predicate::eq("teamId", json!("team-1")));
            }
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn client_cannot_override_the_scope_key() {
        let params = ListParams::parse("teamId=team-2");
        let scope = Scope::new("teamId", json!("team-1"));
        let (predicate, _) = compile(&params, &SPEC, Some(&scope)).unwrap();
        assert_eq!(predicate, Predicate::eq("teamId", json!("team-1")));
    }

    #[test]
    fn unknown_sort_attribute_fails_closed() {
        let params = ListParams::parse("@sort=passwordHash");
        let err = compile(&params, &SPEC, None).unwrap_err();
        assert!(err.to_string().contains("passwordHash"));
    }
}
