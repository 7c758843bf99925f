use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::constants::{
    CLIENT_PROPERTIES_BROWSER, CLIENT_PROPERTIES_DEVICE, CLIENT_PROPERTIES_OS, GatewayOpcode,
};

/// Outbound gateway frame.
#[derive(Debug, Clone, Serialize)]
#[allow(missing_docs)]
pub struct GatewayPayload {
    pub op: u8,
    pub d: Value,
}

impl GatewayPayload {
    /// Heartbeat carrying the last sequence, or null.
    #[must_use]
    pub fn heartbeat(sequence: Option<u64>) -> Self {
        Self {
            op: GatewayOpcode::Heartbeat.as_u8(),
            d: sequence.map_or(Value::Null, |s| Value::Number(s.into())),
        }
    }

    /// Identify with the given intents.
    #[must_use]
    pub fn identify(token: &str, intents: u32) -> Self {
        let identify = IdentifyData {
            token,
            properties: IdentifyProperties {
                os: CLIENT_PROPERTIES_OS,
                browser: CLIENT_PROPERTIES_BROWSER,
                device: CLIENT_PROPERTIES_DEVICE,
            },
            compress: false,
            intents,
        };

        Self {
            op: GatewayOpcode::Identify.as_u8(),
            d: serde_json::to_value(identify).unwrap_or(Value::Null),
        }
    }

    /// Resume for a known session.
    #[must_use]
    pub fn resume(token: &str, session_id: &str, sequence: u64) -> Self {
        let resume = ResumeData {
            token,
            session_id,
            seq: sequence,
        };

        Self {
            op: GatewayOpcode::Resume.as_u8(),
            d: serde_json::to_value(resume).unwrap_or(Value::Null),
        }
    }

    /// Whether this is a heartbeat.
    #[must_use]
    pub fn is_heartbeat(&self) -> bool {
        self.op == GatewayOpcode::Heartbeat.as_u8()
    }
}

// Transport compression is negotiated in the URL; payload compression stays off.
#[derive(Debug, Serialize)]
struct IdentifyData<'a> {
    token: &'a str,
    properties: IdentifyProperties,
    compress: bool,
    intents: u32,
}

#[derive(Debug, Serialize)]
struct IdentifyProperties {
    os: &'static str,
    browser: &'static str,
    device: &'static str,
}

#[derive(Debug, Serialize)]
struct ResumeData<'a> {
    token: &'a str,
    session_id: &'a str,
    seq: u64,
}

/// Inbound gateway frame.
#[derive(Debug, Deserialize)]
#[allow(missing_docs)]
pub struct GatewayMessage {
    pub op: u8,
    pub d: Option<Value>,
    pub s: Option<u64>,
    pub t: Option<String>,
}

/// Opcode 10 body.
#[derive(Debug, Deserialize)]
pub struct HelloPayload {
    /// Milliseconds between heartbeats.
    pub heartbeat_interval: u64,
}

/// Fields of the Ready dispatch the bot keeps.
#[derive(Debug, Deserialize)]
#[allow(missing_docs)]
pub struct ReadyPayload {
    pub session_id: String,
    pub resume_gateway_url: Option<String>,
    pub user: ReadyUser,
    pub application: ReadyApplication,
}

/// Bot user from Ready.
#[derive(Debug, Deserialize)]
pub struct ReadyUser {
    /// Bot user snowflake.
    pub id: String,
}

/// Application from Ready.
#[derive(Debug, Deserialize)]
pub struct ReadyApplication {
    /// Application snowflake, used to register commands.
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heartbeat_payload() {
        let payload = GatewayPayload::heartbeat(Some(42));
        assert!(payload.is_heartbeat());
        assert_eq!(payload.d, Value::Number(42.into()));
        assert_eq!(
            serde_json::to_string(&GatewayPayload::heartbeat(None)).unwrap(),
            r#"{"op":1,"d":null}"#
        );
    }

    #[test]
    fn test_identify_payload_structure() {
        let payload = GatewayPayload::identify("bot-token", 1);
        assert_eq!(payload.op, 2);

        let obj = payload.d.as_object().unwrap();
        assert_eq!(obj["token"], "bot-token");
        assert_eq!(obj["intents"], 1);
        assert_eq!(obj["compress"], false);
        assert_eq!(obj["properties"]["browser"], "gyazo-bot");
        assert!(obj["properties"]["os"].is_string());
    }

    #[test]
    fn test_resume_payload() {
        let payload = GatewayPayload::resume("token", "session123", 100);
        assert_eq!(payload.op, 6);

        let obj = payload.d.as_object().unwrap();
        assert_eq!(obj["session_id"], "session123");
        assert_eq!(obj["seq"], 100);
    }

    #[test]
    fn test_ready_payload_ignores_extra_fields() {
        let ready: ReadyPayload = serde_json::from_value(serde_json::json!({
            "v": 10,
            "session_id": "abc",
            "resume_gateway_url": "wss://resume.discord.gg",
            "user": {"id": "10", "username": "gyazo", "bot": true},
            "application": {"id": "20", "flags": 0},
            "guilds": []
        }))
        .unwrap();

        assert_eq!(ready.application.id, "20");
        assert_eq!(ready.user.id, "10");
    }
}
