//! WebSocket handler
//!
//! Authenticates the upgrade, then runs the receive, send and heartbeat tasks
//! for one session until any of them ends.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use carpool_common::{AppError, ErrorResponse};
use carpool_core::Snowflake;
use carpool_service::PresenceService;
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::connection::{Connection, Outbound, PresenceTransition};
use crate::handlers::MessageDispatcher;
use crate::protocol::{CloseCode, GatewayMessage, HelloPayload};
use crate::server::GatewayState;

/// Channel buffer size for outgoing messages
const MESSAGE_BUFFER_SIZE: usize = 100;

/// How long the writer gets to flush after the session ends
const SEND_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Browser socket clients cannot set headers, so the token may come in the query
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    access_token: Option<String>,
}

#[derive(Serialize)]
struct Rejection {
    error: ErrorResponse,
}

/// WebSocket gateway handler
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    Query(params): Query<ConnectParams>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let user_id = match authenticate(&state, &headers, params).await {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::debug!(error = %e, "Gateway upgrade rejected");
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::UNAUTHORIZED);
            let body = Rejection {
                error: ErrorResponse::from(&e),
            };
            return (status, Json(body)).into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(state, socket, user_id))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn authenticate(
    state: &GatewayState,
    headers: &HeaderMap,
    params: ConnectParams,
) -> Result<Snowflake, AppError> {
    let token = bearer_token(headers)
        .or(params.access_token)
        .ok_or(AppError::MissingAuth)?;

    let ctx = state.service_context();
    let user_id = ctx.jwt_service().authenticate(&token)?;

    // A valid token for a deleted account is still rejected
    match ctx.user_repo().find_by_id(user_id).await? {
        Some(_) => Ok(user_id),
        None => Err(AppError::InvalidToken),
    }
}

/// Handle an upgraded, authenticated WebSocket connection
async fn handle_socket(state: GatewayState, socket: WebSocket, user_id: Snowflake) {
    let session_id = uuid::Uuid::new_v4().to_string();
    let (tx, mut rx) = mpsc::channel::<Outbound>(MESSAGE_BUFFER_SIZE);
    let (mut ws_sink, mut ws_stream) = socket.split();

    // Hello goes out before the session can receive any dispatch
    let hello = GatewayMessage::hello(HelloPayload::with_interval(state.heartbeat_interval_ms()));
    match hello.to_json() {
        Ok(json) => {
            if ws_sink.send(Message::Text(json)).await.is_err() {
                tracing::warn!(session_id = %session_id, "Failed to send Hello message");
                return;
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode Hello message");
            return;
        }
    }

    let added = state
        .registry()
        .add_connection(session_id.clone(), user_id, tx);
    let connection = added.connection;

    tracing::info!(session_id = %session_id, user_id = %user_id, "WebSocket connection established");

    if let Some(transition) = added.presence {
        record_presence(&state, transition).await;
    }

    let state_recv = state.clone();
    let session_id_recv = session_id.clone();
    let connection_recv = connection.clone();

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Err(close_code) =
                        handle_text_message(&state_recv, &connection_recv, &text).await
                    {
                        tracing::debug!(
                            session_id = %session_id_recv,
                            close_code = %close_code,
                            "Closing connection due to error"
                        );
                        connection_recv.close(close_code);
                        return Some(close_code);
                    }
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(session_id = %session_id_recv, "Binary messages not supported");
                    connection_recv.close(CloseCode::DecodeError);
                    return Some(CloseCode::DecodeError);
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Pong is handled automatically by axum
                    tracing::trace!(session_id = %session_id_recv, "Ping/pong received");
                }
                Ok(Message::Close(_)) => {
                    tracing::info!(session_id = %session_id_recv, "Client closed connection");
                    return None;
                }
                Err(e) => {
                    tracing::warn!(session_id = %session_id_recv, error = %e, "WebSocket error");
                    return None;
                }
            }
        }
        None
    });

    let session_id_send = session_id.clone();

    let mut send_task = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            match outbound {
                Outbound::Frame(msg) => match msg.to_json() {
                    Ok(json) => {
                        if ws_sink.send(Message::Text(json)).await.is_err() {
                            tracing::warn!(
                                session_id = %session_id_send,
                                "Failed to send message to WebSocket"
                            );
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(session_id = %session_id_send, error = %e, "Failed to encode frame");
                    }
                },
                Outbound::Close(code) => {
                    let frame = CloseFrame {
                        code: code.as_u16(),
                        reason: code.description().into(),
                    };
                    let _ = ws_sink.send(Message::Close(Some(frame))).await;
                    return;
                }
            }
        }

        let _ = ws_sink.close().await;
    });

    let session_id_hb = session_id.clone();
    let connection_hb = connection.clone();
    let check_every = Duration::from_millis((state.heartbeat_interval_ms() / 2).max(1));
    let timeout = state.heartbeat_timeout();

    let mut heartbeat_task = tokio::spawn(async move {
        let mut check_interval = interval(check_every);

        loop {
            check_interval.tick().await;

            let time_since = connection_hb.time_since_heartbeat();
            if time_since > timeout {
                tracing::warn!(
                    session_id = %session_id_hb,
                    time_since_ms = time_since.as_millis(),
                    "Connection timed out (no heartbeat)"
                );
                connection_hb.close(CloseCode::SessionTimeout);
                break;
            }
        }
    });

    let send_finished = tokio::select! {
        result = &mut recv_task => {
            if let Ok(Some(close_code)) = result {
                tracing::debug!(session_id = %session_id, close_code = %close_code, "Receive task ended with close code");
            }
            false
        }
        _ = &mut send_task => {
            tracing::debug!(session_id = %session_id, "Send task ended");
            true
        }
        _ = &mut heartbeat_task => {
            tracing::debug!(session_id = %session_id, "Heartbeat task ended");
            false
        }
    };

    recv_task.abort();
    heartbeat_task.abort();

    cleanup_connection(&state, &session_id, user_id).await;

    // Once every sender is gone the writer drains any queued close frame and exits
    drop(connection);
    if !send_finished && tokio::time::timeout(SEND_DRAIN_TIMEOUT, &mut send_task).await.is_err() {
        send_task.abort();
    }
}

/// Handle a text message from the client
async fn handle_text_message(
    state: &GatewayState,
    connection: &Arc<Connection>,
    text: &str,
) -> Result<(), CloseCode> {
    let message = match GatewayMessage::from_json(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(
                session_id = %connection.session_id(),
                error = %e,
                "Failed to parse message"
            );
            return Err(CloseCode::DecodeError);
        }
    };

    tracing::trace!(
        session_id = %connection.session_id(),
        op = %message.op,
        "Received message"
    );

    match MessageDispatcher::dispatch(state, connection, message).await {
        Ok(Some(close_code)) => Err(close_code),
        Ok(None) => Ok(()),
        Err(e) => match e.to_close_code() {
            Some(close_code) => {
                tracing::warn!(
                    session_id = %connection.session_id(),
                    error = %e,
                    "Handler error"
                );
                Err(close_code)
            }
            None => {
                tracing::debug!(
                    session_id = %connection.session_id(),
                    error = %e,
                    "Client request rejected"
                );
                Ok(())
            }
        },
    }
}

async fn record_presence(state: &GatewayState, transition: PresenceTransition) {
    let result = PresenceService::new(state.service_context())
        .record(
            transition.user_id,
            transition.is_online,
            Utc::now(),
            transition.seq,
        )
        .await;

    if let Err(e) = result {
        tracing::warn!(
            user_id = %transition.user_id,
            is_online = transition.is_online,
            error = %e,
            "Failed to record presence"
        );
    }
}

/// Clean up a connection on disconnect
async fn cleanup_connection(state: &GatewayState, session_id: &str, user_id: Snowflake) {
    tracing::info!(session_id = %session_id, user_id = %user_id, "Cleaning up connection");

    let transition = state
        .registry()
        .remove_connection(session_id)
        .and_then(|removed| removed.presence);

    if let Some(transition) = transition {
        record_presence(state, transition).await;
    }
}
