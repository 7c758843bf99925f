use flate2::{Decompress, FlushDecompress, Status};

use super::constants::ZLIB_SUFFIX;
use super::error::{GatewayError, GatewayResult};
use super::events::DispatchEvent;
use super::payloads::{GatewayMessage, HelloPayload, ReadyPayload};
use crate::infrastructure::discord::interaction::InteractionPayload;

const INITIAL_BUFFER_SIZE: usize = 32 * 1024;
const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Inflates the shared zlib stream of a `compress=zlib-stream` connection.
pub struct GatewayCodec {
    inflater: Decompress,
    compressed_buffer: Vec<u8>,
    decompressed_buffer: Vec<u8>,
}

impl GatewayCodec {
    /// Creates a codec with a fresh inflater.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inflater: Decompress::new(true),
            compressed_buffer: Vec::with_capacity(4096),
            decompressed_buffer: Vec::with_capacity(INITIAL_BUFFER_SIZE),
        }
    }

    /// Buffers a binary frame, returning the JSON text once a message is complete.
    pub fn decode_binary(&mut self, data: &[u8]) -> GatewayResult<Option<String>> {
        self.compressed_buffer.extend_from_slice(data);

        if !self.is_message_complete() {
            return Ok(None);
        }

        let result = self.decompress()?;
        self.compressed_buffer.clear();
        Ok(Some(result))
    }

    fn is_message_complete(&self) -> bool {
        self.compressed_buffer.len() >= 4
            && self.compressed_buffer[self.compressed_buffer.len() - 4..] == ZLIB_SUFFIX
    }

    fn decompress(&mut self) -> GatewayResult<String> {
        self.decompressed_buffer.clear();

        if self.decompressed_buffer.capacity() < INITIAL_BUFFER_SIZE {
            self.decompressed_buffer.reserve(INITIAL_BUFFER_SIZE);
        }

        let mut total_in = 0;
        let mut total_out = 0;

        loop {
            if self.decompressed_buffer.len() == self.decompressed_buffer.capacity() {
                let new_capacity = self
                    .decompressed_buffer
                    .capacity()
                    .saturating_mul(2)
                    .min(MAX_BUFFER_SIZE);

                if new_capacity == self.decompressed_buffer.capacity() {
                    return Err(GatewayError::compression(
                        "decompressed data exceeds maximum size".to_string(),
                    ));
                }

                self.decompressed_buffer.reserve(new_capacity);
            }

            let spare_capacity =
                self.decompressed_buffer.capacity() - self.decompressed_buffer.len();
            self.decompressed_buffer
                .resize(self.decompressed_buffer.len() + spare_capacity, 0);

            let in_before = self.inflater.total_in();
            let out_before = self.inflater.total_out();

            let status = self
                .inflater
                .decompress(
                    &self.compressed_buffer[total_in..],
                    &mut self.decompressed_buffer[total_out..],
                    FlushDecompress::Sync,
                )
                .map_err(|e| GatewayError::compression(e.to_string()))?;

            let consumed = usize::try_from(self.inflater.total_in() - in_before).unwrap_or(0);
            let produced = usize::try_from(self.inflater.total_out() - out_before).unwrap_or(0);

            total_in += consumed;
            total_out += produced;

            self.decompressed_buffer.truncate(total_out);

            match status {
                Status::Ok | Status::BufError => {
                    if total_in >= self.compressed_buffer.len() {
                        break;
                    }
                }
                Status::StreamEnd => {
                    break;
                }
            }
        }

        String::from_utf8(self.decompressed_buffer[..total_out].to_vec())
            .map_err(|e| GatewayError::compression(format!("invalid UTF-8: {e}")))
    }

    /// Starts a new zlib stream for a new connection.
    pub fn reset(&mut self) {
        self.inflater.reset(true);
        self.compressed_buffer.clear();
        self.decompressed_buffer.clear();
    }
}

impl Default for GatewayCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns gateway JSON into typed messages and events.
pub struct EventParser;

impl EventParser {
    /// Parses a raw frame.
    pub fn parse_message(json: &str) -> GatewayResult<GatewayMessage> {
        serde_json::from_str(json).map_err(|e| GatewayError::serialization(e.to_string()))
    }

    /// Parses the Hello payload.
    pub fn parse_hello(data: serde_json::Value) -> GatewayResult<HelloPayload> {
        serde_json::from_value(data)
            .map_err(|e| GatewayError::serialization(format!("Failed to parse Hello: {e}")))
    }

    /// Parses a dispatch into the events the bot reacts to.
    pub fn parse_dispatch(
        event_type: &str,
        data: Option<serde_json::Value>,
    ) -> GatewayResult<DispatchEvent> {
        let data = data.ok_or_else(|| GatewayError::protocol("Missing dispatch data"))?;

        match event_type {
            "READY" => Self::parse_ready(data),
            "INTERACTION_CREATE" => Self::parse_interaction_create(data),
            _ => Ok(DispatchEvent::Unknown {
                event_type: event_type.to_string(),
            }),
        }
    }

    fn parse_ready(data: serde_json::Value) -> GatewayResult<DispatchEvent> {
        let ready: ReadyPayload = serde_json::from_value(data)
            .map_err(|e| GatewayError::serialization(format!("Failed to parse Ready: {e}")))?;

        Ok(DispatchEvent::Ready {
            session_id: ready.session_id,
            resume_gateway_url: ready.resume_gateway_url,
            user_id: ready.user.id,
            application_id: ready.application.id,
        })
    }

    fn parse_interaction_create(data: serde_json::Value) -> GatewayResult<DispatchEvent> {
        let payload: InteractionPayload = serde_json::from_value(data).map_err(|e| {
            GatewayError::serialization(format!("Failed to parse InteractionCreate: {e}"))
        })?;

        Ok(match payload.into_interaction() {
            Some(interaction) => DispatchEvent::InteractionCreate { interaction },
            None => DispatchEvent::Unknown {
                event_type: "INTERACTION_CREATE".to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{Compress, Compression, FlushCompress};
    use serde_json::json;

    use crate::domain::entities::Command;

    /// Compresses frames the way Discord does: one shared stream, sync-flushed per message.
    fn compress_frames(messages: &[&str]) -> Vec<Vec<u8>> {
        let mut compressor = Compress::new(Compression::default(), true);
        messages
            .iter()
            .map(|message| {
                let mut out = Vec::with_capacity(message.len() + 64);
                compressor
                    .compress_vec(message.as_bytes(), &mut out, FlushCompress::Sync)
                    .unwrap();
                out
            })
            .collect()
    }

    #[test]
    fn test_codec_incomplete_message() {
        let mut codec = GatewayCodec::new();
        let result = codec.decode_binary(&[0x01, 0x02, 0x03]).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_codec_decodes_shared_stream() {
        let first = r#"{"op":10,"d":{"heartbeat_interval":41250}}"#;
        let second = r#"{"op":11,"d":null}"#;
        let frames = compress_frames(&[first, second]);
        let mut codec = GatewayCodec::new();

        assert_eq!(codec.decode_binary(&frames[0]).unwrap().as_deref(), Some(first));
        assert_eq!(codec.decode_binary(&frames[1]).unwrap().as_deref(), Some(second));
    }

    #[test]
    fn test_codec_joins_split_frames() {
        let message = r#"{"op":0,"t":"RESUMED","s":5,"d":{}}"#;
        let frame = &compress_frames(&[message])[0];
        let (head, tail) = frame.split_at(frame.len() / 2);
        let mut codec = GatewayCodec::new();

        assert!(codec.decode_binary(head).unwrap().is_none());
        assert_eq!(codec.decode_binary(tail).unwrap().as_deref(), Some(message));
    }

    #[test]
    fn test_codec_reset() {
        let mut codec = GatewayCodec::new();
        codec.compressed_buffer.extend_from_slice(&[1, 2, 3]);
        codec.reset();
        assert!(codec.compressed_buffer.is_empty());
    }

    #[test]
    fn test_event_parser_unknown_event() {
        let result = EventParser::parse_dispatch("GUILD_CREATE", Some(json!({}))).unwrap();
        assert_eq!(result.event_type(), "GUILD_CREATE");
    }

    #[test]
    fn test_parse_ready() {
        let event = EventParser::parse_dispatch(
            "READY",
            Some(json!({
                "session_id": "s1",
                "resume_gateway_url": "wss://resume.example",
                "user": {"id": "10"},
                "application": {"id": "20"}
            })),
        )
        .unwrap();

        let DispatchEvent::Ready {
            session_id,
            application_id,
            ..
        } = event
        else {
            panic!("expected Ready");
        };
        assert_eq!(session_id, "s1");
        assert_eq!(application_id, "20");
    }

    #[test]
    fn test_parse_interaction_create() {
        let event = EventParser::parse_dispatch(
            "INTERACTION_CREATE",
            Some(json!({
                "id": "1",
                "application_id": "20",
                "type": 2,
                "token": "tok",
                "user": {"id": "5"},
                "data": {"name": "deauthorize"}
            })),
        )
        .unwrap();

        let DispatchEvent::InteractionCreate { interaction } = event else {
            panic!("expected InteractionCreate");
        };
        assert_eq!(interaction.command, Command::Deauthorize);
    }

    #[test]
    fn test_parse_message_frame() {
        let message =
            EventParser::parse_message(r#"{"op":0,"s":3,"t":"READY","d":{"a":1}}"#).unwrap();
        assert_eq!(message.op, 0);
        assert_eq!(message.s, Some(3));
        assert_eq!(message.t.as_deref(), Some("READY"));
    }
}
