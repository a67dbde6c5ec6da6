//! Websocket relay of highlight changes between viewers of one document

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::server::realtime::Relay;
use crate::server::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/ws/:pdf_id", get(connect))
}

async fn connect(ws: WebSocketUpgrade, State(state): State<AppState>, Path(pdf_id): Path<String>) -> Response {
    // Subscribe before the handshake completes so nothing sent after it is missed
    let (sender, receiver) = state.realtime().join(&pdf_id);
    ws.on_upgrade(move |socket| relay(socket, state, pdf_id, sender, receiver))
}

async fn relay(
    socket: WebSocket,
    state: AppState,
    pdf_id: String,
    sender: broadcast::Sender<Relay>,
    mut receiver: broadcast::Receiver<Relay>,
) {
    let client_id = Uuid::new_v4();
    tracing::info!(pdf_id = %pdf_id, %client_id, "realtime client connected");

    let (mut outgoing, mut incoming) = socket.split();

    let mut send_task = tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(relay) if relay.origin == client_id => continue,
                Ok(relay) => {
                    if outgoing.send(Message::Text(relay.payload)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(%client_id, skipped, "realtime client fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = incoming.next().await {
            match message {
                Message::Text(text) => {
                    if let Err(e) = serde_json::from_str::<serde_json::Value>(&text) {
                        tracing::warn!(%client_id, "ignoring non-JSON realtime message: {}", e);
                        continue;
                    }
                    // Our own receiver keeps the room open, so this only fails on shutdown
                    if sender
                        .send(Relay {
                            origin: client_id,
                            payload: text,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
            let _ = recv_task.await;
        }
        _ = &mut recv_task => {
            send_task.abort();
            let _ = send_task.await;
        }
    }

    state.realtime().leave(&pdf_id);
    tracing::info!(pdf_id = %pdf_id, %client_id, "realtime client disconnected");
}
