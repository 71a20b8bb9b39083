use crate::{
    config::Config,
    errors::{into_response, AppError},
    mcp::{
        registry::{ReadRequest, ReadResponse, ResourceRegistry},
        types::{Catalog, ErrorObj},
    },
    security,
    session::SessionHandle,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub registry: Arc<ResourceRegistry>,
    pub session: SessionHandle,
    pub rls: Arc<security::RateLimiters>,
}

pub async fn serve(
    cfg: Config,
    registry: ResourceRegistry,
    session: SessionHandle,
) -> anyhow::Result<()> {
    let shared = AppState {
        cfg: Arc::new(cfg),
        registry: Arc::new(registry),
        session,
        rls: Arc::new(security::RateLimiters::new(20, 40, 10, 20)),
    };

    let app = build_router(shared.clone());

    let addr: std::net::SocketAddr =
        format!("{}:{}", shared.cfg.server.bind_addr, shared.cfg.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(shared: AppState) -> Router {
    let base = shared.cfg.server.base_path.clone();
    use tower_http::limit::RequestBodyLimitLayer;
    let limit_bytes = shared.cfg.limits.max_request_kb * 1024;
    Router::new()
        .route("/healthz", get(health))
        .route(&format!("{base}/resources"), get(catalog))
        .route(
            &format!("{base}/read"),
            post(read_resource).layer(RequestBodyLimitLayer::new(limit_bytes)),
        )
        .route(
            &format!("{base}/project"),
            post(establish_project).layer(RequestBodyLimitLayer::new(limit_bytes)),
        )
        .with_state(shared)
}

async fn health(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    match authorize(&state, &headers) {
        Ok(()) => (StatusCode::OK, Json(json!({"status":"ok"}))).into_response(),
        Err(e) => into_response(e).into_response(),
    }
}

async fn catalog(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(e) = authorize(&state, &headers) {
        return into_response(e).into_response();
    }
    let (resources, templates) = state.registry.catalog();
    let catalog = Catalog {
        protocol_version: "2024-11-05",
        resources,
        templates,
    };
    (StatusCode::OK, Json(catalog)).into_response()
}

async fn read_resource(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ReadRequest>,
) -> Response {
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();
    let origin = headers
        .get("Origin")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let token = security::extract_bearer(&headers);
    let token_present = token.is_some();

    if let Err(e) = authorize(&state, &headers) {
        audit_end(
            &request_id,
            &origin,
            token_present,
            &req.uri,
            "deny",
            e.code(),
            started.elapsed().as_millis() as u64,
            0,
        );
        return into_response(e).into_response();
    }
    if let Err(e) = security::content_length_ok(&headers, state.cfg.limits.max_request_kb) {
        audit_end(
            &request_id,
            &origin,
            token_present,
            &req.uri,
            "deny",
            e.code(),
            started.elapsed().as_millis() as u64,
            0,
        );
        return into_response(e).into_response();
    }
    if let Err(e) = state.rls.check(token.as_deref()) {
        audit_end(
            &request_id,
            &origin,
            token_present,
            &req.uri,
            "deny",
            e.code(),
            started.elapsed().as_millis() as u64,
            0,
        );
        return into_response(e).into_response();
    }

    let Some((resource, arg)) = state.registry.match_uri(&req.uri) else {
        audit_end(
            &request_id,
            &origin,
            token_present,
            &req.uri,
            "deny",
            AppError::NotFound.code(),
            started.elapsed().as_millis() as u64,
            0,
        );
        return into_response(AppError::NotFound).into_response();
    };

    match resource.read(arg.as_deref()).await {
        Ok(result) => {
            let payload = ReadResponse {
                id: req.id,
                result: Some(result),
                error: None,
            };
            let bytes_out = serde_json::to_vec(&payload).map(|v| v.len()).unwrap_or(0) as u64;
            audit_end(
                &request_id,
                &origin,
                token_present,
                &req.uri,
                "allow",
                "OK",
                started.elapsed().as_millis() as u64,
                bytes_out,
            );
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(e) => {
            let payload = ReadResponse {
                id: req.id,
                result: None,
                error: Some(ErrorObj {
                    code: e.code().to_string(),
                    message: e.to_string(),
                }),
            };
            let bytes_out = serde_json::to_vec(&payload).map(|v| v.len()).unwrap_or(0) as u64;
            audit_end(
                &request_id,
                &origin,
                token_present,
                &req.uri,
                "error",
                e.code(),
                started.elapsed().as_millis() as u64,
                bytes_out,
            );
            (e.status(), Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub path: String,
}

async fn establish_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ProjectRequest>,
) -> Response {
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();
    let origin = headers
        .get("Origin")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let token = security::extract_bearer(&headers);
    let token_present = token.is_some();

    if let Err(e) = authorize(&state, &headers) {
        audit_end(
            &request_id,
            &origin,
            token_present,
            "project",
            "deny",
            e.code(),
            started.elapsed().as_millis() as u64,
            0,
        );
        return into_response(e).into_response();
    }
    if let Err(e) = security::content_length_ok(&headers, state.cfg.limits.max_request_kb) {
        audit_end(
            &request_id,
            &origin,
            token_present,
            "project",
            "deny",
            e.code(),
            started.elapsed().as_millis() as u64,
            0,
        );
        return into_response(e).into_response();
    }
    if let Err(e) = state.rls.check(token.as_deref()) {
        audit_end(
            &request_id,
            &origin,
            token_present,
            "project",
            "deny",
            e.code(),
            started.elapsed().as_millis() as u64,
            0,
        );
        return into_response(e).into_response();
    }
    match state.session.establish(Path::new(&req.path)) {
        Ok(project) => {
            audit_end(
                &request_id,
                &origin,
                token_present,
                "project",
                "allow",
                "OK",
                started.elapsed().as_millis() as u64,
                0,
            );
            (
                StatusCode::OK,
                Json(json!({
                    "root": project.root.display().to_string(),
                    "name": project.name,
                })),
            )
                .into_response()
        }
        Err(e) => {
            audit_end(
                &request_id,
                &origin,
                token_present,
                "project",
                "error",
                e.code(),
                started.elapsed().as_millis() as u64,
                0,
            );
            into_response(e).into_response()
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn audit_end(
    request_id: &str,
    origin: &str,
    token_present: bool,
    uri: &str,
    decision: &str,
    code: &str,
    duration_ms: u64,
    bytes_out: u64,
) {
    tracing::info!(
        request_id = request_id,
        origin = origin,
        token_present = token_present,
        uri = uri,
        decision = decision,
        code = code,
        duration_ms = duration_ms,
        bytes_out = bytes_out,
        "audit"
    );
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    security::require_bearer(headers, &state.cfg.auth.bearer_token)?;
    security::check_origin(headers, &state.cfg.auth.allowed_origins)?;
    Ok(())
}
