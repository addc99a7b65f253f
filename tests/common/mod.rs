#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use teamhub_api::auth::{self, Claims};
use teamhub_api::catalog::EntityKind;
use teamhub_api::routes;
use teamhub_api::state::AppState;
use teamhub_api::store::{MemoryStore, Record};

pub const PASSWORD: &str = "hunter2";

/// The router plus a handle on the seeded in-memory store.
pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryStore>,
}

pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let app = routes::app(AppState::new(store.clone()));
    TestApp { app, store }
}

pub fn record(pairs: &[(&str, Value)]) -> Record {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

pub fn seed_user(
    store: &MemoryStore,
    display_name: &str,
    email: &str,
    handle: &str,
    role: &str,
    stamp: &str,
) -> String {
    let id = Uuid::new_v4().to_string();
    store.insert(
        EntityKind::User,
        record(&[
            ("id", json!(id)),
            ("displayName", json!(display_name)),
            ("email", json!(email)),
            ("handle", json!(handle)),
            ("role", json!(role)),
            ("passwordHash", json!(auth::password_digest(PASSWORD))),
            ("createdAt", json!(stamp)),
            ("updatedAt", json!(stamp)),
        ]),
    );
    id
}

pub fn seed_team(store: &MemoryStore, name: &str, stamp: &str) -> String {
    let id = Uuid::new_v4().to_string();
    store.insert(
        EntityKind::Team,
        record(&[
            ("id", json!(id)),
            ("name", json!(name)),
            ("createdAt", json!(stamp)),
            ("updatedAt", json!(stamp)),
        ]),
    );
    id
}

pub fn seed_membership(
    store: &MemoryStore,
    team_id: &str,
    user_id: &str,
    role: &str,
    stamp: &str,
) -> String {
    let id = Uuid::new_v4().to_string();
    store.insert(
        EntityKind::Membership,
        record(&[
            ("id", json!(id)),
            ("teamId", json!(team_id)),
            ("userId", json!(user_id)),
            ("role", json!(role)),
            ("createdAt", json!(stamp)),
            ("updatedAt", json!(stamp)),
        ]),
    );
    id
}

pub fn seed_account(store: &MemoryStore, team_id: &str, kind: &str, name: &str, stamp: &str) -> String {
    let id = Uuid::new_v4().to_string();
    store.insert(
        EntityKind::Account,
        record(&[
            ("id", json!(id)),
            ("teamId", json!(team_id)),
            ("kind", json!(kind)),
            ("name", json!(name)),
            ("createdAt", json!(stamp)),
            ("updatedAt", json!(stamp)),
        ]),
    );
    id
}

pub fn seed_account_member(store: &MemoryStore, account_id: &str, user_id: &str, stamp: &str) -> String {
    let id = Uuid::new_v4().to_string();
    store.insert(
        EntityKind::AccountMember,
        record(&[
            ("id", json!(id)),
            ("accountId", json!(account_id)),
            ("userId", json!(user_id)),
            ("createdAt", json!(stamp)),
            ("updatedAt", json!(stamp)),
        ]),
    );
    id
}

pub fn seed_project(store: &MemoryStore, team_id: &str, name: &str, stamp: &str) -> String {
    let id = Uuid::new_v4().to_string();
    store.insert(
        EntityKind::Project,
        record(&[
            ("id", json!(id)),
            ("teamId", json!(team_id)),
            ("name", json!(name)),
            ("createdAt", json!(stamp)),
            ("updatedAt", json!(stamp)),
        ]),
    );
    id
}

pub fn seed_request(store: &MemoryStore, team_id: &str, user_id: &str, status: &str, stamp: &str) -> String {
    let id = Uuid::new_v4().to_string();
    store.insert(
        EntityKind::MembershipRequest,
        record(&[
            ("id", json!(id)),
            ("teamId", json!(team_id)),
            ("userId", json!(user_id)),
            ("status", json!(status)),
            ("createdAt", json!(stamp)),
            ("updatedAt", json!(stamp)),
        ]),
    );
    id
}

pub fn seed_favorite(store: &MemoryStore, user_id: &str, target_kind: &str, target_id: &str, stamp: &str) -> String {
    let id = Uuid::new_v4().to_string();
    store.insert(
        EntityKind::Favorite,
        record(&[
            ("id", json!(id)),
            ("userId", json!(user_id)),
            ("targetKind", json!(target_kind)),
            ("targetId", json!(target_id)),
            ("createdAt", json!(stamp)),
            ("updatedAt", json!(stamp)),
        ]),
    );
    id
}

pub fn token_for(user_id: &str, handle: &str, role: &str) -> String {
    let claims = Claims::new(Uuid::parse_str(user_id).unwrap(), handle.to_string(), role.to_string());
    auth::issue_token(&claims).expect("dev secret is configured")
}

pub async fn request(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (u16, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub async fn get(app: &Router, path: &str, token: &str) -> (u16, Value) {
    request(app, "GET", path, Some(token), None).await
}

/// Names from a list response's rows, in order.
pub fn field_values(payload: &Value, field: &str) -> Vec<String> {
    payload["data"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|r| r.get(field).and_then(Value::as_str).map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub fn errors(payload: &Value) -> Vec<String> {
    payload["errors"]
        .as_array()
        .map(|errs| {
            errs.iter()
                .filter_map(|e| e.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
