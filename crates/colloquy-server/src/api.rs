use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use colloquy_core::{CommentPayload, CommentStatus};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::identity::resolve_caller;
use crate::projection::{self, CommentView, ThreadNodeView};
use crate::service::{CommentService, CreateComment};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CommentService>,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/threads/:post_id/comments",
            post(create_comment).get(list_thread),
        )
        .route(
            "/comments/:id",
            get(get_comment).patch(edit_comment).delete(delete_comment),
        )
        .route("/comments/:id/status", patch(moderate_comment))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Deserialize)]
struct CreateCommentRequest {
    content: String,
    parent_id: Option<Uuid>,
    name: Option<String>,
    email: Option<String>,
    website: Option<String>,
}

#[derive(Deserialize)]
struct EditCommentRequest {
    content: String,
}

#[derive(Deserialize)]
struct ModerateCommentRequest {
    status: String,
}

#[derive(Deserialize)]
struct ListQuery {
    status: Option<String>,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentView>), ApiError> {
    let caller = resolve_caller(&headers, &state.config);

    let create = CreateComment {
        post_id,
        parent_id: req.parent_id,
        payload: CommentPayload {
            content: req.content,
            name: req.name,
            email: req.email,
            website: req.website,
        },
        ip_address: client_ip(&headers),
        user_agent: client_user_agent(&headers),
    };

    let comment = state.service.create(create, &caller).await?;

    Ok((
        StatusCode::CREATED,
        Json(projection::comment_view(&comment, &caller)),
    ))
}

async fn list_thread(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<ThreadNodeView>>, ApiError> {
    let caller = resolve_caller(&headers, &state.config);

    let status_filter = match query.status.as_deref() {
        Some(s) => {
            Some(CommentStatus::parse(s).ok_or_else(|| ApiError::InvalidStatus(s.to_string()))?)
        }
        None => None,
    };

    let forest = state
        .service
        .list_thread(post_id, &caller, status_filter)
        .await?;

    Ok(Json(projection::thread_view(&forest, &caller)))
}

async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<CommentView>, ApiError> {
    let caller = resolve_caller(&headers, &state.config);
    let comment = state.service.get(id, &caller).await?;
    Ok(Json(projection::comment_view(&comment, &caller)))
}

async fn edit_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<EditCommentRequest>,
) -> Result<Json<CommentView>, ApiError> {
    let caller = resolve_caller(&headers, &state.config);
    let comment = state.service.edit(id, req.content, &caller).await?;
    Ok(Json(projection::comment_view(&comment, &caller)))
}

async fn moderate_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<ModerateCommentRequest>,
) -> Result<Json<CommentView>, ApiError> {
    let caller = resolve_caller(&headers, &state.config);

    let status = CommentStatus::parse(&req.status)
        .ok_or_else(|| ApiError::InvalidStatus(req.status.clone()))?;

    let comment = state.service.moderate(id, status, &caller).await?;
    Ok(Json(projection::comment_view(&comment, &caller)))
}

async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let caller = resolve_caller(&headers, &state.config);
    state.service.delete(id, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Client IP as reported by the reverse proxy: the first hop of
/// `x-forwarded-for`, then `x-real-ip`, then `"unknown"`.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .unwrap_or("unknown")
        .to_string()
}

fn client_user_agent(headers: &HeaderMap) -> String {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
