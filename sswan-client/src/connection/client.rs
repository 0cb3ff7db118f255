//! WebSocket connection driver
//!
//! One driver task owns the socket for the lifetime of the connection; the
//! rest of the client talks to it through channels. Inbound frames, errors
//! and closure arrive as [`TransportEvent`]s in delivery order; outbound
//! frames are transmitted in call order.

// Allow unused code that's part of the public API
#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use sswan_protocol::Envelope;
use sswan_utils::{Result, SswanError};

use crate::session::Session;

use super::events::{
    TransportEvent, CLOSE_ABNORMAL, CLOSE_NORMAL, CLOSE_NO_STATUS, SHUTDOWN_REASON,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Commands accepted by the driver task
enum Outbound {
    /// Transmit one sealed text frame
    Frame(String),
    /// Send a normal-closure frame and stop
    Close,
}

/// Client connection to the sswan server.
///
/// Owns the session state and the only transport handle. At most one driver
/// task exists at a time; `connect` while one is alive is a no-op, and
/// `shutdown` may be called any number of times.
pub struct Connection {
    /// Server endpoint (ws://host:port/path)
    url: String,
    /// Session state machine fed by transport events
    session: Session,
    /// Channel for outgoing frames
    tx: mpsc::Sender<Outbound>,
    /// Channel for transport events
    rx: mpsc::Receiver<TransportEvent>,
    /// Handle to the driver task
    task_handle: Option<tokio::task::JoinHandle<()>>,
}

impl Connection {
    /// Create a new connection (not yet connected)
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_session(url, Session::new())
    }

    /// Create with an existing session (used by tests)
    pub fn with_session(url: impl Into<String>, session: Session) -> Self {
        let (tx, _) = mpsc::channel(100);
        let (_, rx) = mpsc::channel(100);

        Self {
            url: url.into(),
            session,
            tx,
            rx,
            task_handle: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Open the transport.
    ///
    /// A no-op when a driver task is already alive, so repeated activation
    /// never creates a second transport. On handshake failure the session
    /// records a transport error and the call returns it.
    pub async fn connect(&mut self) -> Result<()> {
        if self
            .task_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
        {
            tracing::debug!("transport already open or opening, ignoring connect");
            return Ok(());
        }

        tracing::info!(url = %self.url, "connecting");
        self.session.begin_connect();

        let (ws, _response) = connect_async(self.url.clone()).await.map_err(|e| {
            self.session.on_transport_error(&e.to_string());
            SswanError::connection(format!("Failed to connect to {}: {}", self.url, e))
        })?;

        let (outgoing_tx, outgoing_rx) = mpsc::channel(100);
        let (incoming_tx, incoming_rx) = mpsc::channel(100);

        self.tx = outgoing_tx;
        self.rx = incoming_rx;

        let handle = tokio::spawn(Self::driver_task(ws, outgoing_rx, incoming_tx));
        self.task_handle = Some(handle);

        // The completed handshake is the open signal
        self.session.apply(TransportEvent::Opened);
        Ok(())
    }

    /// Seal and transmit a draft envelope.
    ///
    /// The session checks the connected precondition and stamps the sender;
    /// a queueing failure is reported without touching the session state.
    pub async fn send(&mut self, draft: Envelope) -> Result<()> {
        let frame = self.session.seal(draft)?;

        self.tx
            .send(Outbound::Frame(frame))
            .await
            .map_err(|_| SswanError::ConnectionClosed)?;

        Ok(())
    }

    /// Receive the next transport event (blocking)
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        self.rx.recv().await
    }

    /// Try to receive without blocking
    pub fn try_next_event(&mut self) -> Option<TransportEvent> {
        self.rx.try_recv().ok()
    }

    /// Apply a transport event to the session. A close event also releases
    /// the (finished) driver task handle.
    pub fn apply(&mut self, event: TransportEvent) {
        if event.is_closed() {
            self.task_handle = None;
        }
        self.session.apply(event);
    }

    /// Deliberate teardown.
    ///
    /// When the session is connected the driver sends a normal-closure frame
    /// (code 1000) before exiting; otherwise the transport is already
    /// closing or closed and nothing is sent. The handle is cleared in every
    /// case, so calling this twice, or with nothing open, does nothing.
    pub async fn shutdown(&mut self) {
        let Some(handle) = self.task_handle.take() else {
            tracing::debug!("transport already closed or never opened");
            return;
        };

        if self.session.is_connected() && self.tx.try_send(Outbound::Close).is_ok() {
            let _ = handle.await;
        } else {
            handle.abort();
        }
    }

    /// Driver task that owns the socket
    async fn driver_task(
        ws: WsStream,
        mut outgoing: mpsc::Receiver<Outbound>,
        incoming: mpsc::Sender<TransportEvent>,
    ) {
        let (mut sink, mut stream) = ws.split();

        loop {
            tokio::select! {
                // Outgoing frames and deliberate closure
                Some(cmd) = outgoing.recv() => match cmd {
                    Outbound::Frame(text) => {
                        if let Err(e) = sink.send(Message::Text(text)).await {
                            tracing::error!("Failed to send frame: {}", e);
                            let _ = incoming.send(TransportEvent::TransportError(e.to_string())).await;
                            let _ = incoming.send(TransportEvent::Closed {
                                code: CLOSE_ABNORMAL,
                                reason: None,
                            }).await;
                            break;
                        }
                    }
                    Outbound::Close => {
                        tracing::info!("closing transport");
                        let frame = CloseFrame {
                            code: CloseCode::from(CLOSE_NORMAL),
                            reason: SHUTDOWN_REASON.into(),
                        };
                        if let Err(e) = sink.send(Message::Close(Some(frame))).await {
                            tracing::debug!("close frame not delivered: {}", e);
                        }
                        break;
                    }
                },

                // Incoming frames
                msg = stream.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!(len = text.len(), "received frame");
                        if incoming.send(TransportEvent::Frame(text)).await.is_err() {
                            tracing::debug!("event channel closed, receiver dropped");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = match frame {
                            Some(f) => (
                                u16::from(f.code),
                                (!f.reason.is_empty()).then(|| f.reason.into_owned()),
                            ),
                            None => (CLOSE_NO_STATUS, None),
                        };
                        tracing::info!(code, "server closed connection");
                        let _ = sink.close().await;
                        let _ = incoming.send(TransportEvent::Closed { code, reason }).await;
                        break;
                    }
                    Some(Ok(_)) => {
                        // Ping/pong are handled by the transport; binary
                        // frames are not part of the wire format
                    }
                    Some(Err(e)) => {
                        tracing::error!("transport error: {}", e);
                        let _ = incoming.send(TransportEvent::TransportError(e.to_string())).await;
                        let _ = incoming.send(TransportEvent::Closed {
                            code: CLOSE_ABNORMAL,
                            reason: None,
                        }).await;
                        break;
                    }
                    None => {
                        tracing::info!("transport ended without close frame");
                        let _ = incoming.send(TransportEvent::Closed {
                            code: CLOSE_ABNORMAL,
                            reason: None,
                        }).await;
                        break;
                    }
                }
            }
        }
    }
}
