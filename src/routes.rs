use axum::{
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config;
use crate::handlers::{accounts, auth, favorites, members, projects, requests, teams, users};
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        // Protected API
        .merge(api_routes());

    if config::config().api.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Users
        .route("/api/users", get(users::list))
        .route("/api/users/:userId", delete(users::remove))
        .route("/api/users/:userId/favorites", get(favorites::list))
        // Teams and nested resources
        .route("/api/teams", get(teams::list))
        .route("/api/teams/:teamId/members", get(members::list))
        .route("/api/teams/:teamId/members/:userId", delete(members::remove))
        .route(
            "/api/teams/:teamId/accounts",
            get(accounts::list).post(accounts::create),
        )
        .route(
            "/api/teams/:teamId/accounts/:accountId/members",
            get(accounts::member_list),
        )
        .route("/api/teams/:teamId/projects", get(projects::list))
        .route("/api/teams/:teamId/requests", get(requests::list))
        .route_layer(axum_middleware::from_fn(auth_middleware))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "data": {
            "name": "TeamHub API",
            "version": version,
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/login (public - token acquisition)",
                "users": "/api/users (protected)",
                "teams": "/api/teams (protected)",
                "members": "/api/teams/:teamId/members (protected)",
                "accounts": "/api/teams/:teamId/accounts (protected)",
                "projects": "/api/teams/:teamId/projects (protected)",
                "requests": "/api/teams/:teamId/requests (protected, team lead)",
                "favorites": "/api/users/:userId/favorites (protected)",
            }
        },
        "errors": null,
        "meta": {},
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "data": { "status": "ok", "timestamp": now, "storage": "ok" },
                "errors": null,
                "meta": {},
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "data": null,
                "errors": [format!("storage unavailable: {}", e)],
                "meta": {},
            })),
        ),
    }
}
