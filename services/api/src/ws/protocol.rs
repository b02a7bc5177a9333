//! Defines the WebSocket message protocol between the browser client and the server.

use serde::{Deserialize, Serialize};

/// Inbound frame on the text-chat endpoint: `{"message": "..."}`.
#[derive(Deserialize, Debug)]
pub struct TextFrame {
    #[serde(default)]
    pub message: String,
}

/// Inbound frame on the voice endpoint: `{"type": "...", "content": "..."}`.
///
/// The `type` field is informational (the browser reports "text" or
/// "speech"); only `content` drives the turn.
#[derive(Deserialize, Debug)]
pub struct VoiceFrame {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: String,
}

/// Events sent from the server to the client (browser).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// A complete, non-streamed answer (or the text-endpoint welcome).
    #[serde(rename = "assistant")]
    Assistant { content: String },
    /// Typing indicator start (`true`) / stop (`false`), always paired.
    #[serde(rename = "typing")]
    Typing { content: bool },
    /// Processing indicator start / stop on the voice endpoint, always paired.
    #[serde(rename = "processing")]
    Processing { content: bool },
    /// Begin of a streamed answer.
    #[serde(rename = "stream-start")]
    StreamStart,
    /// One word of a streamed answer with a display delay hint in milliseconds.
    #[serde(rename = "stream-word")]
    StreamWord {
        word: String,
        index: usize,
        delay: u64,
    },
    /// Synthesized speech for the preceding sentence's words.
    #[serde(rename = "stream-audio")]
    StreamAudio {
        audio: String,
        format: String,
        #[serde(rename = "wordCount")]
        word_count: usize,
    },
    /// Streaming complete; carries the full undecorated text as a fallback.
    #[serde(rename = "stream-end")]
    StreamEnd {
        #[serde(rename = "fullText")]
        full_text: String,
    },
    /// A user-facing failure message; does not terminate the connection.
    #[serde(rename = "error")]
    Error { content: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stream_word_wire_shape() {
        let event = ServerEvent::StreamWord {
            word: "Hello ".to_string(),
            index: 0,
            delay: 350,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({"type": "stream-word", "word": "Hello ", "index": 0, "delay": 350})
        );
    }

    #[test]
    fn stream_audio_uses_camel_case_word_count() {
        let event = ServerEvent::StreamAudio {
            audio: "AAAA".to_string(),
            format: "mp3".to_string(),
            word_count: 2,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "stream-audio");
        assert_eq!(value["wordCount"], 2);
    }

    #[test]
    fn stream_end_carries_full_text() {
        let event = ServerEvent::StreamEnd {
            full_text: "Hi.".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({"type": "stream-end", "fullText": "Hi."})
        );
    }

    #[test]
    fn indicators_are_boolean_tagged() {
        let on = serde_json::to_value(ServerEvent::Typing { content: true }).unwrap();
        assert_eq!(on, json!({"type": "typing", "content": true}));
        let off = serde_json::to_value(ServerEvent::Processing { content: false }).unwrap();
        assert_eq!(off, json!({"type": "processing", "content": false}));
    }

    #[test]
    fn text_frame_defaults_missing_message_to_empty() {
        let frame: TextFrame = serde_json::from_str("{}").unwrap();
        assert_eq!(frame.message, "");
    }

    #[test]
    fn voice_frame_parses_type_and_content() {
        let frame: VoiceFrame =
            serde_json::from_str(r#"{"type": "speech", "content": "hi"}"#).unwrap();
        assert_eq!(frame.kind, "speech");
        assert_eq!(frame.content, "hi");
    }
}
