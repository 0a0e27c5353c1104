//! Direct-share signaling server
//!
//! Brokers two-party lobby sessions: HTTP endpoints create and
//! validate lobbies, a WebSocket channel carries membership changes
//! and opaque WebRTC negotiation messages between lobby members.

mod config;
mod connections;
mod handlers;
mod lobby;
mod protocol;
mod registry;
mod state;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use config::Config;
use futures::{SinkExt, StreamExt};
use protocol::{ClientMessage, ServerMessage};
use state::AppState;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = Arc::new(AppState::new(config));
    let addr = format!("{}:{}", state.config.host, state.config.port);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .route("/api/createLobby", post(handlers::api::create_lobby))
        .route("/api/joinLobby", post(handlers::api::join_lobby))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Direct-share signaling server started");
    tracing::info!("Address: {}", addr);
    tracing::info!("WebSocket: ws://{}/ws", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn index_handler() -> Html<&'static str> {
    Html("<h1>Direct Share Signaling Server</h1><p>WebSocket endpoint: /ws</p>")
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "server": "direct-share-signaling",
        "lobbies": state.registry.len(),
    }))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let connection_id = handlers::handle_connection(state.clone(), tx).await;

    // Writer task: serializes queued pushes onto the socket.
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => handle_client_message(&state, &connection_id, msg).await,
                Err(err) => {
                    tracing::debug!(connection_id = %connection_id, error = %err, "Ignored unparseable message");
                }
            },
            Ok(Message::Close(_)) => break,
            Err(_) => break,
            _ => {}
        }
    }

    handlers::handle_disconnect(&state, &connection_id).await;
    send_task.abort();
}

async fn handle_client_message(state: &Arc<AppState>, connection_id: &str, msg: ClientMessage) {
    match msg {
        ClientMessage::JoinLobby {
            lobby_id,
            user_id,
            user_name,
        } => {
            handlers::handle_join_lobby(
                state,
                connection_id,
                &lobby_id,
                &user_id,
                user_name.as_deref(),
            )
            .await;
        }
        ClientMessage::LeaveLobby { lobby_id, user_id } => {
            handlers::handle_leave_lobby(state, connection_id, &lobby_id, &user_id).await;
        }
        ClientMessage::SendOffer {
            lobby_id,
            offer,
            user_id,
        } => {
            handlers::handle_offer(state, connection_id, &lobby_id, offer, &user_id).await;
        }
        ClientMessage::SendAnswer {
            lobby_id,
            answer,
            user_id,
        } => {
            handlers::handle_answer(state, connection_id, &lobby_id, answer, &user_id).await;
        }
        ClientMessage::SendIceCandidate {
            lobby_id,
            candidate,
            user_id,
        } => {
            handlers::handle_ice_candidate(state, connection_id, &lobby_id, candidate, &user_id)
                .await;
        }
    }
}
