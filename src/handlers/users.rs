use axum::extract::{Extension, OriginalUri, Path, State};
use serde_json::{json, Value};

use crate::catalog::EntityKind;
use crate::error::ApiError;
use crate::guard::{Guard, GuardChain, RequestContext};
use crate::middleware::auth::Principal;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::orchestrator;
use crate::query::params::ListParams;
use crate::state::AppState;

/// GET /api/users - list users, with `@search` over name/email/handle
pub async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Extension(principal): Extension<Principal>,
    params: ListParams,
) -> ApiResult<Value> {
    let ctx = RequestContext::new(principal, params);
    let outcome = orchestrator::list(
        state.store.as_ref(),
        EntityKind::User,
        &ctx,
        None,
        uri.path(),
        uri.query().unwrap_or(""),
    )
    .await?;
    Ok(ApiResponse::paginated(Value::Array(outcome.rows), outcome.pagination))
}

/// DELETE /api/users/:userId - remove a user (admin only)
pub async fn remove(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Value> {
    let mut ctx = RequestContext::new(principal, ListParams::default())
        .with_path_param("userId", user_id);
    GuardChain::new(vec![
        Guard::requester_has_role("admin"),
        Guard::resource_exists(EntityKind::User, "userId"),
    ])
    .run(state.store.as_ref(), &mut ctx)
    .await?;

    let id = ctx.resolved_id(EntityKind::User)?;
    let id = id
        .as_str()
        .ok_or_else(|| ApiError::precondition("resolved User id is not a string"))?;
    state.store.destroy(EntityKind::User, id).await?;
    tracing::info!("user {} removed by {}", id, ctx.principal.user_id);

    Ok(ApiResponse::success(json!({ "removed": true })))
}
