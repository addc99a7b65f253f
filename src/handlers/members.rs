use axum::extract::{Extension, OriginalUri, Path, State};
use serde_json::{json, Value};

use crate::catalog::EntityKind;
use crate::error::ApiError;
use crate::guard::{Guard, GuardChain, RequestContext};
use crate::middleware::auth::Principal;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::orchestrator;
use crate::query::compiler::Scope;
use crate::query::params::ListParams;
use crate::state::AppState;

/// GET /api/teams/:teamId/members - list a team's memberships
pub async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(team_id): Path<String>,
    Extension(principal): Extension<Principal>,
    params: ListParams,
) -> ApiResult<Value> {
    let mut ctx = RequestContext::new(principal, params).with_path_param("teamId", team_id);
    GuardChain::new(vec![Guard::resource_exists(EntityKind::Team, "teamId")])
        .run(state.store.as_ref(), &mut ctx)
        .await?;

    let scope = Scope::new("teamId", ctx.resolved_id(EntityKind::Team)?);
    let outcome = orchestrator::list(
        state.store.as_ref(),
        EntityKind::Membership,
        &ctx,
        Some(scope),
        uri.path(),
        uri.query().unwrap_or(""),
    )
    .await?;
    Ok(ApiResponse::paginated(Value::Array(outcome.rows), outcome.pagination))
}

/// DELETE /api/teams/:teamId/members/:userId - remove a member (team lead only)
pub async fn remove(
    State(state): State<AppState>,
    Path((team_id, user_id)): Path<(String, String)>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Value> {
    let mut ctx = RequestContext::new(principal, ListParams::default())
        .with_path_param("teamId", team_id)
        .with_path_param("userId", user_id);
    GuardChain::new(vec![
        Guard::resource_exists(EntityKind::Team, "teamId"),
        Guard::resource_exists(EntityKind::User, "userId"),
        Guard::resource_is_member_of_parent(EntityKind::User, EntityKind::Team),
        Guard::requester_is_member_with_role(EntityKind::Team, "lead"),
    ])
    .run(state.store.as_ref(), &mut ctx)
    .await?;

    // the membership guard resolved the link record for us
    let membership_id = ctx.resolved_id(EntityKind::Membership)?;
    let membership_id = membership_id
        .as_str()
        .ok_or_else(|| ApiError::precondition("resolved Membership id is not a string"))?;
    state.store.destroy(EntityKind::Membership, membership_id).await?;
    tracing::info!(
        "membership {} removed by {}",
        membership_id,
        ctx.principal.user_id
    );

    Ok(ApiResponse::success(json!({ "removed": true })))
}
