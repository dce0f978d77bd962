//! WebSocket push: every non-empty snapshot goes to every connected client.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::routes::AppState;

pub async fn stream(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut updates = state.broadcaster.subscribe();
    debug!(
        listeners = state.broadcaster.listener_count(),
        "stream client connected"
    );

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(snapshot) => {
                    let payload = match serde_json::to_string(&snapshot.tokens) {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!(error = %e, "failed to serialize snapshot for push");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                // A lagged client just misses intermediate snapshots.
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "stream client lagged");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(_)) => break,
            },
        }
    }

    debug!("stream client disconnected");
}
