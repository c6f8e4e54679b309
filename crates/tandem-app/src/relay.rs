//! WebSocket connection to the signaling relay.
//!
//! Provides [`RelayConnection`], which moves text frames between channels
//! and a `tokio-tungstenite` socket. Protocol logic stays in the
//! [`Session`](crate::Session); this layer only carries strings.

use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use thiserror::Error;
use tokio::{sync::mpsc, task::AbortHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

/// Channel depth in each direction.
const CHANNEL_CAPACITY: usize = 32;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Handle to an open relay connection.
///
/// Text written to `to_relay` is sent as WebSocket text frames; text frames
/// from the relay arrive on `from_relay`. The two directions run as separate
/// tasks, so an unread `from_relay` never holds back outgoing frames. When
/// the socket closes, the reader exits and `from_relay` yields `None`.
pub struct RelayConnection {
    /// Send text frames to the relay.
    pub to_relay: mpsc::Sender<String>,
    /// Receive text frames from the relay.
    pub from_relay: mpsc::Receiver<String>,
    /// Abort handle for the socket reader.
    reader: AbortHandle,
    /// Abort handle for the socket writer.
    writer: AbortHandle,
}

impl RelayConnection {
    /// Stop the connection.
    pub fn stop(&self) {
        self.reader.abort();
        self.writer.abort();
    }
}

/// Connect to the relay at `url` (`ws://` or `wss://`).
///
/// # Errors
///
/// Returns [`TransportError::Connection`] if the WebSocket handshake fails.
pub async fn connect(url: &str) -> Result<RelayConnection, TransportError> {
    let (socket, _response) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(|e| TransportError::Connection(format!("{url}: {e}")))?;
    tracing::debug!(url, "relay connected");

    let (to_relay_tx, to_relay_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);
    let (from_relay_tx, from_relay_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);

    let (sink, stream) = socket.split();
    let reader = tokio::spawn(read_frames(stream, from_relay_tx));
    let writer = tokio::spawn(write_frames(sink, to_relay_rx));

    Ok(RelayConnection {
        to_relay: to_relay_tx,
        from_relay: from_relay_rx,
        reader: reader.abort_handle(),
        writer: writer.abort_handle(),
    })
}

/// Forward relay text frames to `from_relay` until the socket closes or the
/// receiver is dropped.
async fn read_frames(mut stream: SplitStream<WsStream>, from_relay: mpsc::Sender<String>) {
    while let Some(incoming) = stream.next().await {
        match incoming {
            Ok(Message::Text(text)) => {
                if from_relay.send(text).await.is_err() {
                    break;
                }
            },
            Ok(Message::Close(frame)) => {
                tracing::debug!(?frame, "relay closed the connection");
                break;
            },
            // Pings are answered by tungstenite; binary frames are not part of the protocol.
            Ok(_) => {},
            Err(e) => {
                tracing::warn!(error = %e, "relay read failed");
                break;
            },
        }
    }
}

/// Send frames from `to_relay` until the channel closes, then close the socket.
async fn write_frames(
    mut sink: SplitSink<WsStream, Message>,
    mut to_relay: mpsc::Receiver<String>,
) {
    while let Some(text) = to_relay.recv().await {
        if let Err(e) = sink.send(Message::Text(text)).await {
            tracing::warn!(error = %e, "relay send failed");
            return;
        }
    }
    if let Err(e) = sink.close().await {
        tracing::debug!(error = %e, "relay close failed");
    }
}
