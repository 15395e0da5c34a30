use futures_util::sink::SinkExt;
use futures_util::stream::StreamExt;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use warp::ws::WebSocket;

use crate::core::connection::Connection;
use crate::core::router::SharedRouter;

// Handle a WebSocket connection
pub async fn handle_ws_client(ws: WebSocket, router: SharedRouter) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let connection = Connection::new(tx);
    let connection_id = connection.id.clone();

    // Forward frames queued on the connection handle to the socket
    tokio::task::spawn(async move {
        while let Some(message) = rx.recv().await {
            let closing = message.is_close();
            if let Err(e) = ws_tx.send(message).await {
                debug!("Failed to write to connection {}: {}", connection_id, e);
                break;
            }
            if closing {
                break;
            }
        }
    });

    info!("Connection opened: {}", connection.id);

    // Handle incoming frames
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(msg) => {
                if msg.is_close() {
                    break;
                }
                // Only text frames carry events
                if let Ok(text) = msg.to_str() {
                    router.handle_raw(text, &connection).await;
                } else if msg.is_binary() {
                    debug!("Ignoring binary frame on connection {}", connection.id);
                }
            }
            Err(e) => {
                warn!("WebSocket error on connection {}: {}", connection.id, e);
                break;
            }
        }
    }

    // Transport close is treated as a disconnect for whoever used this connection
    let removed = router.connection_closed(&connection).await;
    info!(
        "Connection closed: {} ({} users removed, open for {:?})",
        connection.id,
        removed,
        connection.connection_duration()
    );
}
