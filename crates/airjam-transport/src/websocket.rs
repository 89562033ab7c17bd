//! WebSocket [`Connection`] implementation built on axum's upgraded socket.
//!
//! axum owns the HTTP upgrade handshake (so the same router can also serve
//! `/health`); this module only wraps the resulting [`WebSocket`] in the
//! [`Connection`] trait the router dispatches against.
//!
//! The socket is split into its read and write halves up front, each behind
//! its own lock. A connection's reader spends most of its life parked in
//! `recv` waiting on the next inbound frame; a single shared lock would
//! hold that parked read across any concurrent write, starving whichever
//! task pushes server-initiated events onto an otherwise-idle connection.

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, TransportError};

/// A single upgraded WebSocket connection.
pub struct WebSocketConnection {
    id: ConnectionId,
    writer: Mutex<SplitSink<WebSocket, Message>>,
    reader: Mutex<SplitStream<WebSocket>>,
}

impl WebSocketConnection {
    pub fn new(id: ConnectionId, socket: WebSocket) -> Self {
        let (writer, reader) = socket.split();
        Self {
            id,
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
        }
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let text = String::from_utf8_lossy(data).into_owned();
        self.writer
            .lock()
            .await
            .send(Message::Text(text.into()))
            .await
            .map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        loop {
            let msg = self.reader.lock().await.next().await;
            match msg {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_bytes().to_vec())),
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.to_vec())),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Err(e)) => return Err(TransportError::ReceiveFailed(e)),
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .send(Message::Close(None))
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
