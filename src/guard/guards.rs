use serde_json::Value;

use crate::catalog::EntityKind;
use crate::error::ApiError;
use crate::query::predicate::Predicate;
use crate::store::Store;

use super::context::RequestContext;

/// One authorization/existence check. Guards are declared per route and run
/// in order by [`super::GuardChain`]; each declares the entities it needs
/// resolved beforehand and the entity it resolves on success.
#[derive(Debug, Clone)]
pub enum Guard {
    /// Fetch the entity named by a route parameter; resolve it on hit.
    ResourceExists { kind: EntityKind, id_param: &'static str },
    /// Resolved child must reference the resolved parent.
    BelongsToParent { child: EntityKind, parent: EntityKind },
    /// Authenticated principal must hold a global role.
    RequesterHasRole { role: &'static str },
    /// Principal must appear in the parent's membership records with a role.
    RequesterIsMemberWithRole { parent: EntityKind, role: &'static str },
    /// Resolved child must appear in the parent's membership records.
    ResourceIsMemberOfParent { child: EntityKind, parent: EntityKind },
}

impl Guard {
    pub fn resource_exists(kind: EntityKind, id_param: &'static str) -> Self {
        Guard::ResourceExists { kind, id_param }
    }

    pub fn belongs_to_parent(child: EntityKind, parent: EntityKind) -> Self {
        Guard::BelongsToParent { child, parent }
    }

    pub fn requester_has_role(role: &'static str) -> Self {
        Guard::RequesterHasRole { role }
    }

    pub fn requester_is_member_with_role(parent: EntityKind, role: &'static str) -> Self {
        Guard::RequesterIsMemberWithRole { parent, role }
    }

    pub fn resource_is_member_of_parent(child: EntityKind, parent: EntityKind) -> Self {
        Guard::ResourceIsMemberOfParent { child, parent }
    }

    /// Entities that must already be resolved when this guard runs.
    pub fn requires(&self) -> Vec<EntityKind> {
        match self {
            Guard::ResourceExists { .. } | Guard::RequesterHasRole { .. } => vec![],
            Guard::BelongsToParent { child, parent } => vec![*child, *parent],
            Guard::RequesterIsMemberWithRole { parent, .. } => vec![*parent],
            Guard::ResourceIsMemberOfParent { child, parent } => vec![*child, *parent],
        }
    }

    /// Entity this guard resolves into the context on success.
    pub fn provides(&self) -> Option<EntityKind> {
        match self {
            Guard::ResourceExists { kind, .. } => Some(*kind),
            // the membership record is stashed for handlers that act on it
            Guard::ResourceIsMemberOfParent { parent, .. } => parent.membership_link(),
            _ => None,
        }
    }

    pub async fn check(&self, store: &dyn Store, ctx: &mut RequestContext) -> Result<(), ApiError> {
        match self {
            Guard::ResourceExists { kind, id_param } => {
                let id = ctx
                    .path_param(id_param)
                    .ok_or_else(|| ApiError::precondition(format!("route parameter '{}' is missing", id_param)))?
                    .to_string();
                let predicate = Predicate::eq("id", Value::String(id));
                match store.find_one(*kind, &predicate).await? {
                    Some(record) => {
                        ctx.resolve(*kind, record);
                        Ok(())
                    }
                    None => Err(ApiError::not_found(kind.label())),
                }
            }

            Guard::BelongsToParent { child, parent } => {
                let parent_id = ctx.resolved_id(*parent)?;
                let child_fk = ctx.expect_resolved(*child)?.get(parent.scope_field()).cloned();
                if child_fk.as_ref() == Some(&parent_id) {
                    Ok(())
                } else {
                    tracing::warn!(
                        "{} {:?} does not reference {} {:?}",
                        child.label(),
                        ctx.resolved_id(*child).ok(),
                        parent.label(),
                        parent_id
                    );
                    Err(ApiError::forbidden(format!(
                        "{} does not belong to {}",
                        child.label(),
                        parent.label()
                    )))
                }
            }

            Guard::RequesterHasRole { role } => {
                if ctx.principal.role == *role {
                    Ok(())
                } else {
                    tracing::warn!(
                        "user {} has role '{}', needs '{}'",
                        ctx.principal.user_id,
                        ctx.principal.role,
                        role
                    );
                    Err(ApiError::forbidden(format!("requires {} privilege", role)))
                }
            }

            Guard::RequesterIsMemberWithRole { parent, role } => {
                let link = parent.membership_link().ok_or_else(|| {
                    ApiError::precondition(format!("{} has no membership records", parent.label()))
                })?;
                let parent_id = ctx.resolved_id(*parent)?;
                let predicate = Predicate::and(vec![
                    Predicate::eq(parent.scope_field(), parent_id),
                    Predicate::eq("userId", Value::String(ctx.principal.user_id.to_string())),
                ]);
                let membership = store.find_one(link, &predicate).await?;
                let has_role = membership
                    .as_ref()
                    .and_then(|m| m.get("role"))
                    .and_then(Value::as_str)
                    == Some(*role);
                if has_role {
                    Ok(())
                } else {
                    Err(ApiError::forbidden(format!(
                        "not a {} in this {}",
                        role,
                        parent.label().to_lowercase()
                    )))
                }
            }

            Guard::ResourceIsMemberOfParent { child, parent } => {
                let link = parent.membership_link().ok_or_else(|| {
                    ApiError::precondition(format!("{} has no membership records", parent.label()))
                })?;
                let parent_id = ctx.resolved_id(*parent)?;
                let child_id = ctx.resolved_id(*child)?;
                let predicate = Predicate::and(vec![
                    Predicate::eq(parent.scope_field(), parent_id),
                    Predicate::eq(child.scope_field(), child_id),
                ]);
                match store.find_one(link, &predicate).await? {
                    Some(record) => {
                        ctx.resolve(link, record);
                        Ok(())
                    }
                    None => Err(ApiError::forbidden(format!(
                        "{} is not a member of {}",
                        child.label(),
                        parent.label()
                    ))),
                }
            }
        }
    }
}
