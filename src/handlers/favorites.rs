use axum::extract::{Extension, OriginalUri, Path, State};
use serde_json::Value;

use crate::catalog::EntityKind;
use crate::guard::{Guard, GuardChain, RequestContext};
use crate::middleware::auth::Principal;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::orchestrator;
use crate::query::compiler::Scope;
use crate::query::params::ListParams;
use crate::state::AppState;

/// GET /api/users/:userId/favorites - list a user's favorites
pub async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(user_id): Path<String>,
    Extension(principal): Extension<Principal>,
    params: ListParams,
) -> ApiResult<Value> {
    let mut ctx = RequestContext::new(principal, params).with_path_param("userId", user_id);
    GuardChain::new(vec![Guard::resource_exists(EntityKind::User, "userId")])
        .run(state.store.as_ref(), &mut ctx)
        .await?;

    let scope = Scope::new("userId", ctx.resolved_id(EntityKind::User)?);
    let outcome = orchestrator::list(
        state.store.as_ref(),
        EntityKind::Favorite,
        &ctx,
        Some(scope),
        uri.path(),
        uri.query().unwrap_or(""),
    )
    .await?;
    Ok(ApiResponse::paginated(Value::Array(outcome.rows), outcome.pagination))
}
