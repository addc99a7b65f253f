use std::collections::HashMap;

use serde_json::Value;

use crate::catalog::EntityKind;
use crate::error::ApiError;
use crate::middleware::auth::Principal;
use crate::query::params::ListParams;
use crate::store::Record;

/// Per-request state. Created after authentication, populated by the guard
/// chain as it resolves entities, read by the handler, dropped with the
/// request. Never shared across requests.
#[derive(Debug)]
pub struct RequestContext {
    pub principal: Principal,
    pub params: ListParams,
    path_params: HashMap<&'static str, String>,
    resolved: HashMap<EntityKind, Record>,
}

impl RequestContext {
    pub fn new(principal: Principal, params: ListParams) -> Self {
        Self {
            principal,
            params,
            path_params: HashMap::new(),
            resolved: HashMap::new(),
        }
    }

    pub fn with_path_param(mut self, name: &'static str, value: String) -> Self {
        self.path_params.insert(name, value);
        self
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    pub fn resolve(&mut self, kind: EntityKind, record: Record) {
        self.resolved.insert(kind, record);
    }

    pub fn resolved(&self, kind: EntityKind) -> Option<&Record> {
        self.resolved.get(&kind)
    }

    /// Access a resolved entity a later guard or handler depends on. A miss
    /// means the route's guard chain is misdeclared.
    pub fn expect_resolved(&self, kind: EntityKind) -> Result<&Record, ApiError> {
        self.resolved.get(&kind).ok_or_else(|| {
            ApiError::precondition(format!("{} was not resolved before use", kind.label()))
        })
    }

    /// The `id` of a resolved entity, cloned for predicate building.
    pub fn resolved_id(&self, kind: EntityKind) -> Result<Value, ApiError> {
        self.expect_resolved(kind)?
            .get("id")
            .cloned()
            .ok_or_else(|| ApiError::precondition(format!("resolved {} record has no id", kind.label())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn context() -> RequestContext {
        let principal = Principal {
            user_id: Uuid::new_v4(),
            handle: "alice".into(),
            role: "user".into(),
        };
        RequestContext::new(principal, ListParams::default())
    }

    #[test]
    fn path_params_round_trip() {
        let ctx = context().with_path_param("teamId", "t-1".into());
        assert_eq!(ctx.path_param("teamId"), Some("t-1"));
        assert_eq!(ctx.path_param("userId"), None);
    }

    #[test]
    fn expect_resolved_fails_as_precondition() {
        let mut ctx = context();
        let err = ctx.expect_resolved(EntityKind::Team).unwrap_err();
        assert!(matches!(err, ApiError::Precondition(_)));

        let mut record = Record::new();
        record.insert("id".into(), json!("t-1"));
        ctx.resolve(EntityKind::Team, record);
        assert_eq!(ctx.resolved_id(EntityKind::Team).unwrap(), json!("t-1"));
    }
}
