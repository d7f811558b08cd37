//! Push channel handler.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use storebell_shared::{dto::PushFrame, time::now_millis};
use tokio::{
    sync::mpsc,
    time::{MissedTickBehavior, interval},
};

use crate::{
    domain::UserId,
    infrastructure::dto::encode_frame,
    ui::{auth::authenticate, state::AppState},
};

/// `GET /notifications/ws`
///
/// The token is checked before the upgrade so that a bad credential is
/// answered with a plain 401.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    let user = authenticate(&headers)?;
    tracing::info!("Push session requested by '{}'", user);

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user)))
}

fn heartbeat_frame() -> Option<String> {
    match encode_frame(&PushFrame::Heartbeat {
        timestamp: now_millis(),
    }) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!("Failed to encode heartbeat: {}", e);
            None
        }
    }
}

/// Forwards frames from `rx` to the socket and interleaves a heartbeat every
/// `heartbeat_interval`. Ends when the socket or the channel closes.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
    heartbeat_interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut heartbeat = interval(heartbeat_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        heartbeat.tick().await;

        loop {
            let frame = tokio::select! {
                frame = rx.recv() => match frame {
                    Some(frame) => frame,
                    None => break,
                },
                _ = heartbeat.tick() => match heartbeat_frame() {
                    Some(frame) => frame,
                    None => continue,
                },
            };

            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user: UserId) {
    let (sender, mut receiver) = socket.split();

    let (tx, rx) = mpsc::unbounded_channel();
    let session = state
        .connect_session_usecase
        .connect(user.clone(), tx)
        .await;
    tracing::info!("Session {} of '{}' connected", session, user);

    let mut send_task = pusher_loop(rx, sender, state.heartbeat_interval);

    let session_user = user.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!("Session {} of '{}' requested close", session, session_user);
                    break;
                }
                Ok(Message::Text(text)) => {
                    // The push channel is server → client only.
                    tracing::debug!("Ignoring client text on push channel: {}", text);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("WebSocket error on session {}: {}", session, e);
                    break;
                }
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .connect_session_usecase
        .disconnect(&user, session)
        .await;
    tracing::info!("Session {} of '{}' disconnected", session, user);
}
