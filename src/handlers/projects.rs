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

/// GET /api/teams/:teamId/projects - list a team's projects
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
        EntityKind::Project,
        &ctx,
        Some(scope),
        uri.path(),
        uri.query().unwrap_or(""),
    )
    .await?;
    Ok(ApiResponse::paginated(Value::Array(outcome.rows), outcome.pagination))
}
