//! Wire protocol for the vox8 translation service.
//!
//! All messages are JSON text frames tagged by a `type` field. Outbound
//! control messages are modeled as a serde enum; inbound events arrive with
//! shapes the client treats as opaque (they are handed whole to the caller's
//! callbacks), so they are parsed as plain `serde_json::Value` and dispatched
//! on their `type` string in [`crate::client`].

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ── Constants ──────────────────────────────────────────────────────

/// Default vox8 WebSocket endpoint.
pub const DEFAULT_WS_URL: &str = "wss://api.vox8.io/v1/translate";

/// Wire value for the only supported audio format: 16-bit signed
/// little-endian PCM, mono.
pub const AUDIO_FORMAT: &str = "pcm_s16le";

/// Expected input audio sample rate (Hz).
pub const INPUT_SAMPLE_RATE: u32 = 16_000;

/// Recommended cadence for [`crate::Vox8Client::send_keepalive`] when no
/// audio has been sent recently. The client never self-schedules keepalives;
/// the host application owns that timer.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(15);

// ── Voice mode ─────────────────────────────────────────────────────

/// Character of the synthesized translated voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceMode {
    /// Preserve the original speaker's voice.
    #[default]
    Match,
    /// Fixed male voice.
    Male,
    /// Fixed female voice.
    Female,
}

// ── Client → Server messages ───────────────────────────────────────

/// Messages sent from the client to the vox8 service.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Open a translation session. First message on every connection.
    ///
    /// Carries exactly one credential: `session_token` wins when both are
    /// configured, and the unused field is omitted from the JSON entirely.
    #[serde(rename = "session_start")]
    SessionStart {
        /// Target language code (e.g. "es", "fr", "de").
        target_language: String,
        /// Source language code, or "auto" for autodetection.
        source_language: String,
        /// Synthesized voice character.
        voice_mode: VoiceMode,
        /// Always [`AUDIO_FORMAT`].
        audio_format: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        session_token: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
    },

    /// One chunk of base64-encoded PCM audio (16kHz mono s16le).
    #[serde(rename = "audio")]
    Audio { audio: String },

    /// No-op message that keeps an idle session from timing out.
    #[serde(rename = "keepalive")]
    Keepalive,

    /// Gracefully end the session before closing the connection.
    #[serde(rename = "session_end")]
    SessionEnd,
}

/// Encode raw PCM bytes into the base64 form the wire expects.
///
/// The client performs no validation or resampling — the input must already
/// be 16kHz mono s16le PCM.
pub fn encode_pcm(pcm: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(pcm)
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_start_with_api_key_omits_token() {
        let msg = ClientMessage::SessionStart {
            target_language: "es".into(),
            source_language: "auto".into(),
            voice_mode: VoiceMode::Match,
            audio_format: AUDIO_FORMAT,
            session_token: None,
            api_key: Some("vox8_test_key".into()),
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&msg).unwrap()).unwrap();
        assert_eq!(json["type"], "session_start");
        assert_eq!(json["target_language"], "es");
        assert_eq!(json["source_language"], "auto");
        assert_eq!(json["voice_mode"], "match");
        assert_eq!(json["audio_format"], "pcm_s16le");
        assert_eq!(json["api_key"], "vox8_test_key");
        assert!(json.get("session_token").is_none());
    }

    #[test]
    fn keepalive_and_session_end_are_type_only() {
        assert_eq!(
            serde_json::to_string(&ClientMessage::Keepalive).unwrap(),
            r#"{"type":"keepalive"}"#
        );
        assert_eq!(
            serde_json::to_string(&ClientMessage::SessionEnd).unwrap(),
            r#"{"type":"session_end"}"#
        );
    }

    #[test]
    fn audio_message_shape() {
        let msg = ClientMessage::Audio {
            audio: "ZGF0YQ==".into(),
        };
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"type":"audio","audio":"ZGF0YQ=="}"#
        );
    }

    #[test]
    fn voice_modes_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&VoiceMode::Match).unwrap(), "\"match\"");
        assert_eq!(serde_json::to_string(&VoiceMode::Male).unwrap(), "\"male\"");
        assert_eq!(
            serde_json::to_string(&VoiceMode::Female).unwrap(),
            "\"female\""
        );
        assert_eq!(VoiceMode::default(), VoiceMode::Match);
    }

    #[test]
    fn encode_pcm_standard_alphabet() {
        assert_eq!(encode_pcm(b"data"), "ZGF0YQ==");
        assert_eq!(encode_pcm(b""), "");
    }
}
