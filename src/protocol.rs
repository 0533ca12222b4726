use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Handshake sent once on the transcription link, immediately after open.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Handshake {
    pub uid: String,
    pub multilingual: bool,
    pub language: String,
    pub task: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Segment {
    pub text: String,
}

/// Server -> client frames on the transcription link.
///
/// The wire format dispatches on which key is present rather than a tag
/// field, so this is parsed by hand instead of a serde enum.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// `{"message": "SERVER_READY"}` — the server will now accept audio.
    ServerReady,
    /// `{"segments": [...], "eos": bool}` — live transcript of the
    /// current utterance. Only `segments[0]` is rendered.
    Transcript { segments: Vec<Segment>, eos: bool },
    /// `{"llm_output": [...]}` — assistant reply lines.
    LlmOutput(Vec<String>),
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed server json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unrecognized server message shape")]
    UnknownShape,
    #[error("unexpected control message: {0}")]
    UnexpectedControl(String),
}

impl ServerMessage {
    /// Parses one text frame from the transcription link.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(raw)?;

        if let Some(msg) = value.get("message") {
            return match msg.as_str() {
                Some("SERVER_READY") => Ok(ServerMessage::ServerReady),
                Some(other) => Err(ProtocolError::UnexpectedControl(other.to_string())),
                None => Err(ProtocolError::UnknownShape),
            };
        }

        if value.get("segments").is_some() {
            let segments: Vec<Segment> =
                serde_json::from_value(value["segments"].clone())?;
            let eos = value
                .get("eos")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            return Ok(ServerMessage::Transcript { segments, eos });
        }

        if value.get("llm_output").is_some() {
            let lines: Vec<String> = serde_json::from_value(value["llm_output"].clone())?;
            return Ok(ServerMessage::LlmOutput(lines));
        }

        Err(ProtocolError::UnknownShape)
    }
}

impl Handshake {
    pub fn to_json(&self) -> String {
        // Serializing a plain struct of strings and a bool cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}
