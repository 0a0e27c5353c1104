//! HTTP API handlers: lobby creation and join validation

use crate::lobby::Member;
use crate::registry::DEFAULT_LOBBY_NAME;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Request-style failures, mapped onto HTTP statuses. Event-style
/// failures never reach this type; they are dropped and logged.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("Lobby not found")]
    NotFound,
    #[error("Lobby is full")]
    Full,
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Full => StatusCode::FORBIDDEN,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLobbyRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    pub lobby_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLobbyResponse {
    pub lobby_id: String,
}

/// `POST /api/createLobby`. The creator is pre-added as sole member
/// and owner; their WebSocket join is then the reconnect path.
pub async fn create_lobby(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLobbyRequest>,
) -> Result<Json<CreateLobbyResponse>, ApiError> {
    if req.user_id.trim().is_empty() || req.user_name.trim().is_empty() {
        return Err(ApiError::Validation("userId and userName are required"));
    }
    let lobby_name = req
        .lobby_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOBBY_NAME.to_string());

    let (lobby_id, _) = state
        .registry
        .create(&lobby_name, Member::new(req.user_id.clone(), req.user_name))
        .map_err(|err| {
            tracing::error!(error = %err, "Failed to create lobby");
            ApiError::Internal
        })?;

    tracing::info!(lobby_id = %lobby_id, owner = %req.user_id, "Lobby created");
    Ok(Json(CreateLobbyResponse { lobby_id }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinLobbyRequest {
    #[serde(default)]
    pub lobby_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
}

#[derive(Debug, Serialize)]
pub struct JoinLobbyResponse {
    pub valid: bool,
}

/// `POST /api/joinLobby`. Validation only: confirms the lobby exists
/// and has room (or that the requester is already a member, the
/// reconnect case). Membership itself changes on the socket join.
pub async fn join_lobby(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JoinLobbyRequest>,
) -> Result<Json<JoinLobbyResponse>, ApiError> {
    if req.lobby_id.trim().is_empty()
        || req.user_id.trim().is_empty()
        || req.user_name.trim().is_empty()
    {
        return Err(ApiError::Validation(
            "lobbyId, userId and userName are required",
        ));
    }

    let entry = state.registry.get(&req.lobby_id).ok_or(ApiError::NotFound)?;
    let entry = entry.read().await;
    if entry.lobby.is_full() && !entry.lobby.has_member(&req.user_id) {
        tracing::warn!(lobby_id = %req.lobby_id, user_id = %req.user_id, "Join rejected, lobby full");
        return Err(ApiError::Full);
    }

    Ok(Json(JoinLobbyResponse { valid: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(Config::default()))
    }

    #[tokio::test]
    async fn create_requires_user_fields() {
        let err = create_lobby(
            State(state()),
            Json(CreateLobbyRequest {
                user_id: String::new(),
                user_name: "Alice".into(),
                lobby_name: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn create_defaults_lobby_name_and_seats_owner() {
        let state = state();
        let Json(resp) = create_lobby(
            State(state.clone()),
            Json(CreateLobbyRequest {
                user_id: "u1".into(),
                user_name: "Alice".into(),
                lobby_name: None,
            }),
        )
        .await
        .unwrap();

        let entry = state.registry.get(&resp.lobby_id).expect("registered");
        let entry = entry.read().await;
        assert_eq!(entry.lobby.lobby_name, DEFAULT_LOBBY_NAME);
        assert_eq!(entry.lobby.owner_id.as_deref(), Some("u1"));
        assert_eq!(entry.lobby.members.len(), 1);
    }

    #[tokio::test]
    async fn join_unknown_lobby_is_not_found() {
        let err = join_lobby(
            State(state()),
            Json(JoinLobbyRequest {
                lobby_id: "zzzzzzzzzz".into(),
                user_id: "u2".into(),
                user_name: "Bob".into(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn join_full_lobby_is_forbidden_unless_member() {
        let state = state();
        let (lobby_id, entry) = state
            .registry
            .create("Share", Member::new("u1", "Alice"))
            .unwrap();
        entry
            .write()
            .await
            .lobby
            .add_member(Member::new("u2", "Bob"))
            .unwrap();

        let request = |user_id: &str| JoinLobbyRequest {
            lobby_id: lobby_id.clone(),
            user_id: user_id.into(),
            user_name: "x".into(),
        };

        let err = join_lobby(State(state.clone()), Json(request("u3")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Full));

        // An existing member revalidating is allowed through.
        let Json(ok) = join_lobby(State(state), Json(request("u2"))).await.unwrap();
        assert!(ok.valid);
    }
}
