use axum::extract::{Extension, OriginalUri, State};
use serde_json::Value;

use crate::catalog::EntityKind;
use crate::guard::RequestContext;
use crate::middleware::auth::Principal;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::orchestrator;
use crate::query::params::ListParams;
use crate::state::AppState;

/// GET /api/teams - list teams with member counts
pub async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Extension(principal): Extension<Principal>,
    params: ListParams,
) -> ApiResult<Value> {
    let ctx = RequestContext::new(principal, params);
    let outcome = orchestrator::list(
        state.store.as_ref(),
        EntityKind::Team,
        &ctx,
        None,
        uri.path(),
        uri.query().unwrap_or(""),
    )
    .await?;
    Ok(ApiResponse::paginated(Value::Array(outcome.rows), outcome.pagination))
}
