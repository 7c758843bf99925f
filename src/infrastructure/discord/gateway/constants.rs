use std::time::Duration;

pub const GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json&compress=zlib-stream";
/// Query appended to the resume URL handed out in Ready.
pub const GATEWAY_QUERY: &str = "?v=10&encoding=json&compress=zlib-stream";
pub const ZLIB_SUFFIX: [u8; 4] = [0x00, 0x00, 0xff, 0xff];

pub const RECONNECT_DELAY_BASE: Duration = Duration::from_secs(1);
pub const RECONNECT_DELAY_MAX: Duration = Duration::from_secs(60);
pub const RECONNECT_JITTER_MAX: Duration = Duration::from_millis(500);
pub const MAX_RECONNECT_ATTEMPTS: u32 = 10;

pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);
pub const HELLO_TIMEOUT: Duration = Duration::from_secs(10);
pub const IDENTIFY_TIMEOUT: Duration = Duration::from_secs(10);

pub const CLIENT_PROPERTIES_OS: &str = std::env::consts::OS;
pub const CLIENT_PROPERTIES_BROWSER: &str = "gyazo-bot";
pub const CLIENT_PROPERTIES_DEVICE: &str = "gyazo-bot";

/// Gateway opcodes the bot sends or understands.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum GatewayOpcode {
    Dispatch = 0,
    Heartbeat = 1,
    Identify = 2,
    Resume = 6,
    Reconnect = 7,
    InvalidSession = 9,
    Hello = 10,
    HeartbeatAck = 11,
}

impl GatewayOpcode {
    /// Maps a raw opcode, `None` for opcodes the bot ignores.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Dispatch),
            1 => Some(Self::Heartbeat),
            2 => Some(Self::Identify),
            6 => Some(Self::Resume),
            7 => Some(Self::Reconnect),
            9 => Some(Self::InvalidSession),
            10 => Some(Self::Hello),
            11 => Some(Self::HeartbeatAck),
            _ => None,
        }
    }

    /// Raw opcode value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<GatewayOpcode> for u8 {
    fn from(opcode: GatewayOpcode) -> Self {
        opcode.as_u8()
    }
}

/// Single gateway intent bit.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum GatewayIntent {
    Guilds = 1 << 0,
    GuildMessages = 1 << 9,
    DirectMessages = 1 << 12,
}

impl GatewayIntent {
    /// Bit value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Bitset of intents sent with Identify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GatewayIntents(u32);

impl GatewayIntents {
    /// Empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Adds an intent.
    #[must_use]
    pub const fn with(mut self, intent: GatewayIntent) -> Self {
        self.0 |= intent.as_u32();
        self
    }

    /// Whether the intent is set.
    #[must_use]
    pub const fn has(self, intent: GatewayIntent) -> bool {
        (self.0 & intent.as_u32()) != 0
    }

    /// Raw bitfield.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Interactions arrive without any intent; guilds keeps the session useful.
    #[must_use]
    pub const fn bot_default() -> Self {
        Self::new().with(GatewayIntent::Guilds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_roundtrip() {
        for opcode in [
            GatewayOpcode::Dispatch,
            GatewayOpcode::Heartbeat,
            GatewayOpcode::Identify,
            GatewayOpcode::Resume,
            GatewayOpcode::Reconnect,
            GatewayOpcode::InvalidSession,
            GatewayOpcode::Hello,
            GatewayOpcode::HeartbeatAck,
        ] {
            assert_eq!(GatewayOpcode::from_u8(opcode.as_u8()), Some(opcode));
        }
        assert_eq!(GatewayOpcode::from_u8(14), None);
    }

    #[test]
    fn test_intents_value() {
        let intents = GatewayIntents::bot_default();
        assert!(intents.has(GatewayIntent::Guilds));
        assert!(!intents.has(GatewayIntent::GuildMessages));
        assert_eq!(
            intents.with(GatewayIntent::DirectMessages).as_u32(),
            (1 << 0) | (1 << 12)
        );
    }
}
