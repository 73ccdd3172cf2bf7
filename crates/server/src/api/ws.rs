//! Live status stream over WebSocket.
//!
//! Each client gets the current [`JobStatus`] as JSON on connect and again
//! on every change. Values produced faster than the client reads are
//! coalesced to the latest one.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use reelfetch_core::JobStatus;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_MESSAGES_SENT};
use crate::state::AppState;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| stream_status(socket, state))
}

async fn stream_status(socket: WebSocket, state: Arc<AppState>) {
    let (mut sink, mut incoming) = socket.split();
    let mut status_rx = state.orchestrator().subscribe();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();
    info!("Status stream opened");

    // Mark the current value as unseen so it goes out first.
    status_rx.mark_changed();

    loop {
        tokio::select! {
            changed = status_rx.changed() => {
                if changed.is_err() {
                    debug!("Status cell dropped, closing stream");
                    break;
                }
                let status = status_rx.borrow_and_update().clone();
                if let Err(e) = push_status(&mut sink, &status).await {
                    debug!("Status push failed: {}", e);
                    break;
                }
            }
            frame = incoming.next() => match frame {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("Status stream receive error: {}", e);
                    break;
                }
            },
        }
    }

    WS_CONNECTIONS_ACTIVE.dec();
    info!("Status stream closed");
}

async fn push_status<S>(sink: &mut S, status: &JobStatus) -> Result<(), axum::Error>
where
    S: SinkExt<Message, Error = axum::Error> + Unpin,
{
    let json = match serde_json::to_string(status) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize status: {}", e);
            return Ok(());
        }
    };
    sink.send(Message::Text(json.into())).await?;
    WS_MESSAGES_SENT.with_label_values(&[status.name()]).inc();
    Ok(())
}
