use uuid::Uuid;

use crate::config::ClientConfig;
use crate::protocol::Handshake;

/// Per-page-load identity. A fresh id is generated each time a session is
/// created; ids are never reused and never checked for collision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        SessionId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the one-shot handshake for the transcription link.
pub fn handshake(id: &SessionId, config: &ClientConfig) -> Handshake {
    Handshake {
        uid: id.as_str().to_string(),
        multilingual: config.multilingual,
        language: config.language.clone(),
        task: config.task.clone(),
    }
}
