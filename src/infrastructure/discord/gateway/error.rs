use std::io;
use thiserror::Error;

use super::constants::GatewayOpcode;

/// Result alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors raised while connecting to or talking with the gateway.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum GatewayError {
    #[error("connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("connection closed with code {code}: {reason}")]
    ConnectionClosed { code: u16, reason: String },

    #[error("websocket error: {message}")]
    WebSocket { message: String },

    #[error("session invalidated, resumable: {resumable}")]
    SessionInvalidated { resumable: bool },

    #[error("heartbeat timeout: no acknowledgment received")]
    HeartbeatTimeout,

    #[error("gateway asked for a reconnect")]
    ReconnectRequested,

    #[error("compression error: {message}")]
    CompressionError { message: String },

    #[error("serialization error: {message}")]
    SerializationError { message: String },

    #[error("protocol error: unexpected opcode {opcode:?}")]
    UnexpectedOpcode { opcode: Option<GatewayOpcode> },

    #[error("protocol error: {message}")]
    ProtocolError { message: String },

    #[error("timeout waiting for {operation}")]
    Timeout { operation: String },

    #[error("not connected to gateway")]
    NotConnected,

    #[error("already connecting or connected")]
    AlreadyConnected,

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl GatewayError {
    /// Creates a connection failure.
    #[must_use]
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    /// Creates a WebSocket transport error.
    #[must_use]
    pub fn websocket(message: impl Into<String>) -> Self {
        Self::WebSocket {
            message: message.into(),
        }
    }

    /// Creates a zlib stream error.
    #[must_use]
    pub fn compression(message: impl Into<String>) -> Self {
        Self::CompressionError {
            message: message.into(),
        }
    }

    /// Creates a JSON error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Creates a protocol violation error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolError {
            message: message.into(),
        }
    }

    /// Creates a timeout for the named operation.
    #[must_use]
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Returns the close code when Discord closed the socket.
    #[must_use]
    pub const fn close_code(&self) -> Option<u16> {
        if let Self::ConnectionClosed { code, .. } = self {
            Some(*code)
        } else {
            None
        }
    }

    /// Closed with a code that no reconnect can fix (bad token, intents).
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        match self.close_code() {
            Some(code) => match GatewayCloseCode::from_u16(code) {
                Some(close_code) => close_code.is_fatal(),
                None => false,
            },
            None => false,
        }
    }

    /// Whether the client should open a new connection after this error.
    #[must_use]
    pub const fn should_reconnect(&self) -> bool {
        if self.is_fatal() {
            return false;
        }
        match self {
            Self::ConnectionFailed { .. }
            | Self::ConnectionClosed { .. }
            | Self::WebSocket { .. }
            | Self::SessionInvalidated { .. }
            | Self::HeartbeatTimeout
            | Self::ReconnectRequested
            | Self::CompressionError { .. }
            | Self::Timeout { .. }
            | Self::Io(_) => true,

            Self::SerializationError { .. }
            | Self::UnexpectedOpcode { .. }
            | Self::ProtocolError { .. }
            | Self::NotConnected
            | Self::AlreadyConnected => false,
        }
    }

    /// Whether the session may be resumed after this error.
    #[must_use]
    pub const fn can_resume(&self) -> bool {
        match self {
            Self::SessionInvalidated { resumable } => *resumable,
            Self::ConnectionClosed { code, .. } => match GatewayCloseCode::from_u16(*code) {
                Some(close_code) => close_code.is_resumable(),
                None => true,
            },
            Self::WebSocket { .. }
            | Self::HeartbeatTimeout
            | Self::ReconnectRequested
            | Self::Io(_) => true,
            _ => false,
        }
    }
}

/// Close codes Discord sends when ending a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum GatewayCloseCode {
    UnknownError = 4000,
    UnknownOpcode = 4001,
    DecodeError = 4002,
    NotAuthenticated = 4003,
    AuthenticationFailed = 4004,
    AlreadyAuthenticated = 4005,
    InvalidSequence = 4007,
    RateLimited = 4008,
    SessionTimedOut = 4009,
    InvalidShard = 4010,
    ShardingRequired = 4011,
    InvalidApiVersion = 4012,
    InvalidIntents = 4013,
    DisallowedIntents = 4014,
}

impl GatewayCloseCode {
    /// Maps a raw close code.
    #[must_use]
    pub const fn from_u16(code: u16) -> Option<Self> {
        match code {
            4000 => Some(Self::UnknownError),
            4001 => Some(Self::UnknownOpcode),
            4002 => Some(Self::DecodeError),
            4003 => Some(Self::NotAuthenticated),
            4004 => Some(Self::AuthenticationFailed),
            4005 => Some(Self::AlreadyAuthenticated),
            4007 => Some(Self::InvalidSequence),
            4008 => Some(Self::RateLimited),
            4009 => Some(Self::SessionTimedOut),
            4010 => Some(Self::InvalidShard),
            4011 => Some(Self::ShardingRequired),
            4012 => Some(Self::InvalidApiVersion),
            4013 => Some(Self::InvalidIntents),
            4014 => Some(Self::DisallowedIntents),
            _ => None,
        }
    }

    /// Whether the session survives this close.
    #[must_use]
    pub const fn is_resumable(self) -> bool {
        matches!(
            self,
            Self::UnknownError
                | Self::UnknownOpcode
                | Self::DecodeError
                | Self::NotAuthenticated
                | Self::AlreadyAuthenticated
                | Self::RateLimited
        )
    }

    /// Whether reconnecting is pointless.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed
                | Self::InvalidShard
                | Self::ShardingRequired
                | Self::InvalidApiVersion
                | Self::InvalidIntents
                | Self::DisallowedIntents
        )
    }
}
