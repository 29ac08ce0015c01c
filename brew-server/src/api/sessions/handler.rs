//! Session API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{Session, SessionClose, SessionOpen, SessionSummary};
use shared::response::ClosedSession;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult, ErrorCode};

const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct ActiveQuery {
    #[serde(default)]
    pub terminal_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

pub async fn open(
    State(state): State<ServerState>,
    Json(req): Json<SessionOpen>,
) -> AppResult<Json<Session>> {
    Ok(Json(state.ledger().open(req)?))
}

pub async fn close(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(req): Json<SessionClose>,
) -> AppResult<Json<ClosedSession>> {
    let summary = state.ledger().close(&id, req)?;
    let session = state
        .ledger()
        .get(&id)?
        .ok_or_else(|| AppError::new(ErrorCode::SessionNotFound))?;
    Ok(Json(ClosedSession { session, summary }))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Session>> {
    let session = state.ledger().get(&id)?.ok_or_else(|| {
        AppError::with_message(ErrorCode::SessionNotFound, format!("Session {id} not found"))
    })?;
    Ok(Json(session))
}

/// `null` when nothing is open
pub async fn active(
    State(state): State<ServerState>,
    Query(query): Query<ActiveQuery>,
) -> AppResult<Json<Option<Session>>> {
    if query.terminal_id.is_none() && query.user_id.is_none() {
        return Err(AppError::validation("terminal_id or user_id is required"));
    }
    let session = state
        .ledger()
        .get_active(query.terminal_id.as_deref(), query.user_id.as_deref())?;
    Ok(Json(session))
}

pub async fn summary(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<SessionSummary>> {
    Ok(Json(state.ledger().summary(&id)?))
}

pub async fn history(
    State(state): State<ServerState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<Session>>> {
    Ok(Json(state.ledger().history(query.limit)?))
}
