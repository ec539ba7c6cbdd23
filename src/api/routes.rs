//! Axum router and handlers.
//!
//! Every response carries a `success` flag. Failures are reported as
//! `{"success": false, "error": ...}` with status 500; the only 400 is a chat
//! request without a message.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::assistant::{Assistant, ChatReply};
use crate::error::Error;
use crate::store::TodoStore;
use crate::todos::validate_text;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    pub assistant: Arc<Assistant>,
}

/// Build the Axum router with the todo and chat routes.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/search", get(search_todos))
        .route("/api/todos/{id}", delete(delete_todo))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Envelopes ───────────────────────────────────────────────────────────

fn failure(err: Error) -> Response {
    error!(kind = err.kind(), error = %err, "Request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": err.to_string(),
            "kind": err.kind(),
        })),
    )
        .into_response()
}

#[derive(Serialize)]
struct ChatResponse {
    success: bool,
    #[serde(flatten)]
    reply: ChatReply,
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "todo-assist"
    }))
}

// ── Chat ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let message = match body {
        Ok(Json(ChatRequest {
            message: Some(message),
        })) if !message.trim().is_empty() => message,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"success": false, "error": "Message is required"})),
            )
                .into_response();
        }
    };

    match state.assistant.handle(&message).await {
        Ok(reply) => Json(ChatResponse {
            success: true,
            reply,
        })
        .into_response(),
        Err(err) => {
            error!(kind = err.kind(), error = %err, "Error processing chat request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": "Failed to process request",
                    "details": err.to_string(),
                    "kind": err.kind(),
                })),
            )
                .into_response()
        }
    }
}

// ── Todos ───────────────────────────────────────────────────────────────

async fn list_todos(State(state): State<AppState>) -> Response {
    match state.store.list_todos().await {
        Ok(todos) => Json(json!({"success": true, "todos": todos})).into_response(),
        Err(e) => failure(e.into()),
    }
}

#[derive(Deserialize)]
struct CreateTodoRequest {
    #[serde(default)]
    todo: Option<String>,
}

async fn create_todo(
    State(state): State<AppState>,
    body: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return failure(Error::Validation(format!(
                "invalid request body: {}",
                rejection.body_text()
            )));
        }
    };

    let text = match validate_text(request.todo.as_deref()) {
        Ok(text) => text,
        Err(e) => return failure(e),
    };

    match state.store.create_todo(text).await {
        Ok(id) => {
            info!(id, "Todo created via API");
            Json(json!({"success": true, "id": id})).into_response()
        }
        Err(e) => failure(e.into()),
    }
}

async fn delete_todo(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id: i64 = match id.trim().parse() {
        Ok(id) => id,
        Err(_) => return failure(Error::Validation(format!("invalid todo id: {id:?}"))),
    };

    match state.store.delete_todo(id).await {
        Ok(()) => {
            info!(id, "Todo deleted via API");
            Json(json!({"success": true})).into_response()
        }
        Err(e) => failure(e.into()),
    }
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: Option<String>,
}

async fn search_todos(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let Some(q) = params.q else {
        return failure(Error::Validation("query parameter q is required".to_string()));
    };

    match state.store.search_todos(&q).await {
        Ok(todos) => Json(json!({"success": true, "todos": todos})).into_response(),
        Err(e) => failure(e.into()),
    }
}
