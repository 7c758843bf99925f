use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, trace, warn};

use super::codec::{EventParser, GatewayCodec};
use super::constants::{
    CONNECTION_TIMEOUT, GATEWAY_URL, GatewayIntents, GatewayOpcode, HELLO_TIMEOUT,
    IDENTIFY_TIMEOUT,
};
use super::error::{GatewayError, GatewayResult};
use super::events::{DispatchEvent, GatewayEventKind};
use super::heartbeat::{ConnectionCommand, HeartbeatManager};
use super::payloads::{GatewayMessage, GatewayPayload};
use super::session::SessionInfo;
use super::state::ConnectionState;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, WsMessage>;
type WsReader = SplitStream<WsStream>;

/// Transport carrying gateway frames.
#[async_trait]
pub trait GatewayConnection: Send + Sync {
    /// Opens the socket, at the default gateway URL when none is given.
    async fn connect(&mut self, gateway_url: Option<&str>) -> GatewayResult<()>;
    /// Closes the socket.
    async fn disconnect(&mut self) -> GatewayResult<()>;
    /// Sends one payload.
    async fn send(&mut self, payload: &GatewayPayload) -> GatewayResult<()>;
    /// Next complete message, `None` for frames that carry none.
    async fn receive(&mut self) -> GatewayResult<Option<GatewayMessage>>;
    /// Whether the socket is open.
    fn is_connected(&self) -> bool;
}

/// zlib-stream WebSocket transport.
pub struct WebSocketConnection {
    writer: Option<WsWriter>,
    reader: Option<WsReader>,
    codec: GatewayCodec,
    connected: bool,
}

impl WebSocketConnection {
    /// Creates an unconnected transport.
    #[must_use]
    pub fn new() -> Self {
        Self {
            writer: None,
            reader: None,
            codec: GatewayCodec::new(),
            connected: false,
        }
    }

    async fn connect_internal(&mut self, url: &str) -> GatewayResult<()> {
        let connect_future = connect_async(url);
        let (ws_stream, _) = timeout(CONNECTION_TIMEOUT, connect_future)
            .await
            .map_err(|_| GatewayError::timeout("connection"))?
            .map_err(|e| GatewayError::connection_failed(e.to_string()))?;

        let (writer, reader) = ws_stream.split();
        self.writer = Some(writer);
        self.reader = Some(reader);
        self.connected = true;
        self.codec.reset();

        Ok(())
    }
}

impl Default for WebSocketConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GatewayConnection for WebSocketConnection {
    async fn connect(&mut self, gateway_url: Option<&str>) -> GatewayResult<()> {
        let url = gateway_url.unwrap_or(GATEWAY_URL);
        self.connect_internal(url).await
    }

    async fn disconnect(&mut self) -> GatewayResult<()> {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.close().await;
        }
        self.reader = None;
        self.connected = false;
        self.codec.reset();
        debug!("WebSocket connection closed");
        Ok(())
    }

    async fn send(&mut self, payload: &GatewayPayload) -> GatewayResult<()> {
        let writer = self.writer.as_mut().ok_or(GatewayError::NotConnected)?;

        let json = serde_json::to_string(payload)
            .map_err(|e| GatewayError::serialization(e.to_string()))?;

        writer
            .send(WsMessage::Text(json.into()))
            .await
            .map_err(|e| GatewayError::websocket(e.to_string()))?;

        if !payload.is_heartbeat() {
            trace!(op = payload.op, "Sent payload");
        }
        Ok(())
    }

    async fn receive(&mut self) -> GatewayResult<Option<GatewayMessage>> {
        let reader = self.reader.as_mut().ok_or(GatewayError::NotConnected)?;

        loop {
            match reader.next().await {
                Some(Ok(WsMessage::Binary(data))) => {
                    if let Some(json) = self.codec.decode_binary(&data)? {
                        let message = EventParser::parse_message(&json)?;
                        return Ok(Some(message));
                    }
                }
                Some(Ok(WsMessage::Text(text))) => {
                    let message = EventParser::parse_message(&text)?;
                    return Ok(Some(message));
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    self.connected = false;
                    let (code, reason) = frame.map_or_else(
                        || (1000, "Normal closure".to_string()),
                        |f| (f.code.into(), f.reason.to_string()),
                    );

                    return Err(GatewayError::ConnectionClosed { code, reason });
                }
                Some(Ok(WsMessage::Ping(data))) => {
                    if let Some(writer) = self.writer.as_mut() {
                        let _ = writer.send(WsMessage::Pong(data)).await;
                    }
                }
                Some(Ok(WsMessage::Pong(_) | WsMessage::Frame(_))) => {}
                Some(Err(e)) => {
                    self.connected = false;
                    return Err(GatewayError::websocket(e.to_string()));
                }
                None => {
                    self.connected = false;
                    return Err(GatewayError::ConnectionClosed {
                        code: 1000,
                        reason: "Stream ended".to_string(),
                    });
                }
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Drives one connection: handshake, heartbeats and the receive loop.
pub struct GatewayConnectionHandler {
    connection: Box<dyn GatewayConnection>,
    state: ConnectionState,
    session: SessionInfo,
    token: String,
    intents: GatewayIntents,
    event_tx: mpsc::UnboundedSender<GatewayEventKind>,
    heartbeat_interval: Option<Duration>,
}

impl GatewayConnectionHandler {
    /// Creates a handler that reports events on `event_tx`.
    pub fn new(
        connection: Box<dyn GatewayConnection>,
        session: SessionInfo,
        token: String,
        intents: GatewayIntents,
        event_tx: mpsc::UnboundedSender<GatewayEventKind>,
    ) -> Self {
        Self {
            connection,
            state: ConnectionState::Disconnected,
            session,
            token,
            intents,
            event_tx,
            heartbeat_interval: None,
        }
    }

    /// Opens the socket and identifies, or resumes when a session is known.
    pub async fn connect(&mut self) -> GatewayResult<()> {
        self.state = ConnectionState::Connecting;

        let resume_url = if self.session.can_resume() {
            self.session.resume_url()
        } else {
            None
        };
        self.connection.connect(resume_url.as_deref()).await?;

        self.state = ConnectionState::WaitingForHello;
        self.await_hello().await?;

        if self.session.can_resume() {
            self.resume().await
        } else {
            self.identify().await
        }
    }

    async fn receive_within(
        &mut self,
        limit: Duration,
        operation: &str,
    ) -> GatewayResult<GatewayMessage> {
        timeout(limit, self.connection.receive())
            .await
            .map_err(|_| GatewayError::timeout(operation))??
            .ok_or_else(|| GatewayError::protocol(format!("Expected {operation} message")))
    }

    async fn await_hello(&mut self) -> GatewayResult<()> {
        let message = self.receive_within(HELLO_TIMEOUT, "Hello").await?;

        let opcode = GatewayOpcode::from_u8(message.op);
        if opcode != Some(GatewayOpcode::Hello) {
            return Err(GatewayError::UnexpectedOpcode { opcode });
        }

        let data = message
            .d
            .ok_or_else(|| GatewayError::protocol("Hello missing data"))?;
        let hello = EventParser::parse_hello(data)?;
        self.heartbeat_interval = Some(Duration::from_millis(hello.heartbeat_interval));

        debug!(
            interval_ms = hello.heartbeat_interval,
            "Received Hello from gateway"
        );
        Ok(())
    }

    async fn identify(&mut self) -> GatewayResult<()> {
        self.state = ConnectionState::Identifying;

        let payload = GatewayPayload::identify(&self.token, self.intents.as_u32());
        self.connection.send(&payload).await?;

        let message = self.receive_within(IDENTIFY_TIMEOUT, "Ready").await?;
        match GatewayOpcode::from_u8(message.op) {
            Some(GatewayOpcode::Dispatch) if message.t.as_deref() == Some("READY") => {
                self.handle_ready(message)?;
                self.state = ConnectionState::Connected;
                Ok(())
            }
            Some(GatewayOpcode::InvalidSession) => {
                self.session.clear();
                Err(GatewayError::SessionInvalidated { resumable: false })
            }
            opcode => Err(GatewayError::UnexpectedOpcode { opcode }),
        }
    }

    async fn resume(&mut self) -> GatewayResult<()> {
        self.state = ConnectionState::Resuming;

        let (Some(session_id), Some(sequence)) = (
            self.session.session_id().map(String::from),
            self.session.sequence(),
        ) else {
            return Err(GatewayError::protocol("No session to resume"));
        };

        let payload = GatewayPayload::resume(&self.token, &session_id, sequence);
        self.connection.send(&payload).await?;
        debug!(session_id = %session_id, sequence, "Sent Resume payload");

        // Missed events are replayed before RESUMED arrives.
        loop {
            let message = self.receive_within(IDENTIFY_TIMEOUT, "Resumed").await?;
            self.session.update_sequence(message.s);
            match GatewayOpcode::from_u8(message.op) {
                Some(GatewayOpcode::Dispatch) if message.t.as_deref() == Some("RESUMED") => {
                    info!(session_id = %session_id, "Session resumed");
                    self.state = ConnectionState::Connected;
                    let _ = self.event_tx.send(GatewayEventKind::Resumed);
                    return Ok(());
                }
                Some(GatewayOpcode::Dispatch) => {
                    if let Some(event_type) = message.t.as_deref() {
                        trace!(event = event_type, "Replayed dispatch received");
                        self.handle_dispatch(event_type, message.d);
                    }
                }
                Some(GatewayOpcode::InvalidSession) => {
                    let resumable = message.d.and_then(|d| d.as_bool()).unwrap_or(false);
                    if !resumable {
                        self.session.clear();
                    }
                    return Err(GatewayError::SessionInvalidated { resumable });
                }
                Some(GatewayOpcode::HeartbeatAck | GatewayOpcode::Heartbeat) => {}
                opcode => return Err(GatewayError::UnexpectedOpcode { opcode }),
            }
        }
    }

    fn handle_ready(&mut self, message: GatewayMessage) -> GatewayResult<()> {
        self.session.update_sequence(message.s);

        let dispatch = EventParser::parse_dispatch("READY", message.d)?;
        if let DispatchEvent::Ready {
            session_id,
            resume_gateway_url,
            ..
        } = &dispatch
        {
            self.session
                .set_session(session_id.clone(), resume_gateway_url.clone());
            info!(session_id = %session_id, "Gateway ready");

            let _ = self.event_tx.send(GatewayEventKind::Connected {
                session_id: session_id.clone(),
            });
        }
        let _ = self.event_tx.send(GatewayEventKind::Dispatch(dispatch));
        Ok(())
    }

    /// Pumps frames until the connection fails or shutdown is signalled.
    ///
    /// Returns `Ok(())` only on shutdown.
    pub async fn run(&mut self, shutdown: &mut watch::Receiver<bool>) -> GatewayResult<()> {
        if !self.state.is_connected() || !self.connection.is_connected() {
            return Err(GatewayError::protocol(format!("Run while {}", self.state)));
        }
        let interval = self
            .heartbeat_interval
            .ok_or_else(|| GatewayError::protocol("Run before Hello"))?;

        let (command_tx, mut command_rx) = mpsc::channel(16);
        let mut heartbeat = HeartbeatManager::new(interval, self.session.sequence());
        heartbeat.start(command_tx);

        let result = loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        let _ = self.connection.disconnect().await;
                        break Ok(());
                    }
                }

                result = self.connection.receive() => {
                    match result {
                        Ok(Some(message)) => {
                            if let Err(e) = self.handle_message(message, &heartbeat).await {
                                break Err(e);
                            }
                        }
                        Ok(None) => {}
                        Err(e) => break Err(e),
                    }
                }

                Some(command) = command_rx.recv() => {
                    match command {
                        ConnectionCommand::Send(payload) => {
                            if let Err(e) = self.connection.send(&payload).await {
                                warn!(error = %e, "Failed to send heartbeat");
                            }
                        }
                        ConnectionCommand::Zombied => break Err(GatewayError::HeartbeatTimeout),
                    }
                }
            }
        };

        heartbeat.stop();
        self.state = ConnectionState::Disconnected;
        if result.is_err() {
            let _ = self.connection.disconnect().await;
        }
        result
    }

    async fn handle_message(
        &mut self,
        message: GatewayMessage,
        heartbeat: &HeartbeatManager,
    ) -> GatewayResult<()> {
        self.session.update_sequence(message.s);
        if let Some(seq) = message.s {
            heartbeat.record_sequence(seq);
        }

        let opcode = GatewayOpcode::from_u8(message.op);
        match opcode {
            Some(GatewayOpcode::Dispatch) => {
                if let Some(event_type) = message.t.as_deref() {
                    trace!(event = event_type, "Raw dispatch received");
                    self.handle_dispatch(event_type, message.d);
                }
            }
            Some(GatewayOpcode::HeartbeatAck) => heartbeat.record_ack(),
            Some(GatewayOpcode::Heartbeat) => {
                debug!("Gateway requested immediate heartbeat");
                self.connection.send(&heartbeat.payload()).await?;
            }
            Some(GatewayOpcode::Reconnect) => {
                info!("Gateway requested reconnect");
                return Err(GatewayError::ReconnectRequested);
            }
            Some(GatewayOpcode::InvalidSession) => {
                let resumable = message.d.and_then(|d| d.as_bool()).unwrap_or(false);
                warn!(resumable, "Session invalidated");
                if !resumable {
                    self.session.clear();
                }
                return Err(GatewayError::SessionInvalidated { resumable });
            }
            _ => debug!(opcode = ?opcode, "Unhandled opcode"),
        }

        Ok(())
    }

    fn handle_dispatch(&self, event_type: &str, data: Option<serde_json::Value>) {
        match EventParser::parse_dispatch(event_type, data) {
            Ok(event) => {
                debug!(event = event.event_type(), "Dispatching event");
                let _ = self.event_tx.send(GatewayEventKind::Dispatch(event));
            }
            Err(e) => {
                warn!(event = event_type, error = %e, "Failed to parse dispatch event");
            }
        }
    }

    /// Hands back the session so the next connection can resume it.
    #[must_use]
    pub fn into_session(self) -> SessionInfo {
        self.session
    }
}
