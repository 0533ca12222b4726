pub mod audio;
pub mod transcription;

/// Client -> server payloads queued by the driver for the transcription
/// link. Keeps tungstenite types out of the controller layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// JSON text frame (the handshake).
    Text(String),
    /// Raw PCM bytes.
    Binary(Vec<u8>),
}
