use axum::extract::{Extension, Json, OriginalUri, Path, State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::catalog::EntityKind;
use crate::error::ApiError;
use crate::guard::{Guard, GuardChain, RequestContext};
use crate::integrations::ProviderKind;
use crate::middleware::auth::Principal;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::orchestrator;
use crate::query::compiler::Scope;
use crate::query::params::ListParams;
use crate::state::AppState;
use crate::store::Record;

/// GET /api/teams/:teamId/accounts - list a team's external accounts
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
        EntityKind::Account,
        &ctx,
        Some(scope),
        uri.path(),
        uri.query().unwrap_or(""),
    )
    .await?;
    Ok(ApiResponse::paginated(Value::Array(outcome.rows), outcome.pagination))
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub options: Value,
}

/// POST /api/teams/:teamId/accounts - provision an external account (team lead only)
pub async fn create(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateAccountRequest>,
) -> ApiResult<Value> {
    let mut ctx = RequestContext::new(principal, ListParams::default())
        .with_path_param("teamId", team_id);
    GuardChain::new(vec![
        Guard::resource_exists(EntityKind::Team, "teamId"),
        Guard::requester_is_member_with_role(EntityKind::Team, "lead"),
    ])
    .run(state.store.as_ref(), &mut ctx)
    .await?;

    let kind = ProviderKind::parse(&payload.kind)
        .ok_or_else(|| ApiError::validation("Account kind must be one of: chat, tracker, repo."))?;
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Account name is required."));
    }

    let provisioned = state.providers.create(kind, &payload.name, &payload.options).await;
    if !provisioned.ok {
        tracing::error!(
            "provisioning {} account '{}' failed: {:?}",
            kind.as_str(),
            payload.name,
            provisioned.detail
        );
        return Err(ApiError::upstream("Account provisioning failed."));
    }

    let now = Utc::now().to_rfc3339();
    let mut record = Record::new();
    record.insert("id".to_string(), json!(Uuid::new_v4().to_string()));
    record.insert("teamId".to_string(), ctx.resolved_id(EntityKind::Team)?);
    record.insert("kind".to_string(), json!(kind.as_str()));
    record.insert("name".to_string(), json!(payload.name));
    record.insert("createdAt".to_string(), json!(now));
    record.insert("updatedAt".to_string(), json!(now));

    let created = state.store.create(EntityKind::Account, record).await?;
    Ok(ApiResponse::success(Value::Object(created)))
}

/// GET /api/teams/:teamId/accounts/:accountId/members - list an account's members
pub async fn member_list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path((team_id, account_id)): Path<(String, String)>,
    Extension(principal): Extension<Principal>,
    params: ListParams,
) -> ApiResult<Value> {
    let mut ctx = RequestContext::new(principal, params)
        .with_path_param("teamId", team_id)
        .with_path_param("accountId", account_id);
    GuardChain::new(vec![
        Guard::resource_exists(EntityKind::Team, "teamId"),
        Guard::resource_exists(EntityKind::Account, "accountId"),
        Guard::belongs_to_parent(EntityKind::Account, EntityKind::Team),
    ])
    .run(state.store.as_ref(), &mut ctx)
    .await?;

    let scope = Scope::new("accountId", ctx.resolved_id(EntityKind::Account)?);
    let outcome = orchestrator::list(
        state.store.as_ref(),
        EntityKind::AccountMember,
        &ctx,
        Some(scope),
        uri.path(),
        uri.query().unwrap_or(""),
    )
    .await?;
    Ok(ApiResponse::paginated(Value::Array(outcome.rows), outcome.pagination))
}
