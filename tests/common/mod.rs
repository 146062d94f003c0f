#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use workbench_client::cache::QueryCache;
use workbench_client::http::HttpClient;
use workbench_client::{Tokens, WorkbenchApi};

/// Request bookkeeping shared between the mock routes and the test body
#[derive(Default)]
struct Recorded {
    hits: HashMap<String, usize>,
    last_authorization: Option<String>,
    last_query: HashMap<String, String>,
    workspaces: Vec<Value>,
    next_id: usize,
}

#[derive(Clone, Default)]
pub struct MockState {
    inner: Arc<Mutex<Recorded>>,
}

impl MockState {
    fn record(&self, key: &str, headers: &HeaderMap) -> bool {
        let mut inner = self.inner.lock().unwrap();
        *inner.hits.entry(key.to_string()).or_default() += 1;
        inner.last_authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        inner.last_authorization.is_some()
    }

    /// Requests seen for `"METHOD /path"`, with route params as sent
    pub fn hits(&self, key: &str) -> usize {
        self.inner.lock().unwrap().hits.get(key).copied().unwrap_or(0)
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.inner.lock().unwrap().last_authorization.clone()
    }

    pub fn last_query(&self, name: &str) -> Option<String> {
        self.inner.lock().unwrap().last_query.get(name).cloned()
    }

    pub fn seed_workspace(&self, id: &str, name: &str) {
        self.inner.lock().unwrap().workspaces.push(json!({
            "WorkspaceId": id,
            "WorkspaceName": name,
            "WorkspaceStatus": "Active",
            "CreatedAt": "2026-01-05T09:00:00Z"
        }));
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: MockState,
}

impl MockBackend {
    /// API client pointed at this backend with caching on
    pub fn api(&self) -> Result<WorkbenchApi> {
        let http = HttpClient::new(&self.base_url, Duration::from_secs(5))?;
        Ok(WorkbenchApi::new(http, QueryCache::new(true)))
    }
}

/// Start an in-process mock of the workbench API on a free port
pub async fn spawn_backend() -> Result<MockBackend> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind mock backend")?;

    let state = MockState::default();
    state.seed_workspace("w1", "Analytics");
    state.seed_workspace("w2", "Forecasting");
    state.seed_workspace("w3", "Archive");

    let app = router(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(MockBackend {
        base_url: format!("http://127.0.0.1:{}", port),
        state,
    })
}

/// Identity provider tokens for `username` carrying `role`
pub fn tokens_for(username: &str, role: &str) -> Tokens {
    let claims = json!({
        "cognito:username": username,
        "email": format!("{}@example.com", username),
        "custom:role": role,
        "sub": format!("sub-{}", username),
        "exp": 4_102_444_800i64,
    });
    let id_token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"mock-idp"))
        .expect("failed to sign identity token");
    Tokens {
        access_token: format!("access-{}", username),
        id_token,
    }
}

fn router(state: MockState) -> Router {
    Router::new()
        .route("/roles/:name", get(get_role))
        .route("/workspaces", get(list_workspaces).post(create_workspace))
        .route(
            "/workspaces/:id",
            get(get_workspace).put(update_workspace).delete(delete_workspace),
        )
        .route("/workspaces/:id/costs", get(workspace_costs))
        .route("/datasources", get(list_datasources))
        .with_state(state)
}

fn error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

async fn get_role(State(state): State<MockState>, headers: HeaderMap, Path(name): Path<String>) -> Response {
    state.record(&format!("GET /roles/{}", name), &headers);
    let permissions = match name.as_str() {
        "Default" => json!(["workspaces.view", "costs.view"]),
        "Admin" => json!([
            "workspaces.fullaccess",
            "solutions.fullaccess",
            "datasources.manage",
            "roles.fullaccess",
            "users.view",
            "executions.view",
            "activity_logs.view",
            "costs.view"
        ]),
        "Auditor" => json!(["workspaces.view", "workspaces.delete", "costs.veiw"]),
        _ => return error(StatusCode::NOT_FOUND, json!({ "message": "Role not found" })),
    };
    Json(json!({ "Role": name, "Permissions": permissions })).into_response()
}

async fn list_workspaces(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !state.record("GET /workspaces", &headers) {
        return error(StatusCode::UNAUTHORIZED, json!({ "message": "Missing bearer token" }));
    }

    let mut inner = state.inner.lock().unwrap();
    inner.last_query = params.clone();

    let limit: usize = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(10);
    let page: usize = params.get("offset").and_then(|v| v.parse().ok()).unwrap_or(1);
    let total = inner.workspaces.len();
    let data: Vec<Value> = inner
        .workspaces
        .iter()
        .skip((page.max(1) - 1) * limit)
        .take(limit)
        .cloned()
        .collect();

    Json(json!({
        "Data": data,
        "Pagination": {
            "Count": data.len(),
            "TotalCount": total,
            "NextAvailable": page * limit < total
        }
    }))
    .into_response()
}

async fn get_workspace(State(state): State<MockState>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    state.record(&format!("GET /workspaces/{}", id), &headers);
    if id == "slow" {
        tokio::time::sleep(Duration::from_secs(3)).await;
    }

    let inner = state.inner.lock().unwrap();
    match inner.workspaces.iter().find(|w| w["WorkspaceId"] == id.as_str()) {
        Some(workspace) => Json(workspace.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, json!({ "message": "Workspace not found" })),
    }
}

async fn create_workspace(State(state): State<MockState>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    state.record("POST /workspaces", &headers);
    let mut inner = state.inner.lock().unwrap();
    inner.next_id += 1;
    let workspace = json!({
        "WorkspaceId": format!("new-{}", inner.next_id),
        "WorkspaceName": body["WorkspaceName"],
        "Description": body.get("Description").cloned().unwrap_or(Value::Null),
        "WorkspaceStatus": "Draft"
    });
    inner.workspaces.push(workspace.clone());
    (StatusCode::CREATED, Json(workspace)).into_response()
}

async fn update_workspace(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state.record(&format!("PUT /workspaces/{}", id), &headers);
    if body["WorkspaceName"] == "taken" {
        return error(
            StatusCode::CONFLICT,
            json!({ "Message": "Workspace name already taken" }),
        );
    }

    let mut inner = state.inner.lock().unwrap();
    match inner.workspaces.iter_mut().find(|w| w["WorkspaceId"] == id.as_str()) {
        Some(workspace) => {
            if let Some(name) = body.get("WorkspaceName") {
                workspace["WorkspaceName"] = name.clone();
            }
            if let Some(description) = body.get("Description") {
                workspace["Description"] = description.clone();
            }
            Json(workspace.clone()).into_response()
        }
        None => error(StatusCode::NOT_FOUND, json!({ "message": "Workspace not found" })),
    }
}

async fn delete_workspace(State(state): State<MockState>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    state.record(&format!("DELETE /workspaces/{}", id), &headers);
    let mut inner = state.inner.lock().unwrap();
    inner.workspaces.retain(|w| w["WorkspaceId"] != id.as_str());
    StatusCode::NO_CONTENT.into_response()
}

async fn workspace_costs(State(state): State<MockState>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    state.record(&format!("GET /workspaces/{}/costs", id), &headers);
    Json(json!({
        "TotalCost": "128.40",
        "Currency": "USD",
        "Breakdown": [
            { "Service": "Glue", "Cost": "20.15" },
            { "Service": "Redshift", "Cost": 101.75 },
            { "Service": "S3", "Cost": "6.50" }
        ]
    }))
    .into_response()
}

async fn list_datasources(State(state): State<MockState>, headers: HeaderMap) -> Response {
    state.record("GET /datasources", &headers);
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}
