use clap::Parser;

/// Native chat client for a WhisperLive-style transcription + TTS server.
#[derive(Debug, Clone, Parser)]
#[command(name = "anichat", version)]
pub struct ClientConfig {
    /// Transcription endpoint (JSON + microphone PCM frames).
    #[arg(long, default_value = "ws://localhost:6006")]
    pub transcription_url: String,

    /// Synthesized speech endpoint (binary audio blobs).
    #[arg(long, default_value = "ws://localhost:8888")]
    pub audio_url: String,

    /// Display name for the human speaker.
    #[arg(long, default_value = "Akhil")]
    pub name: String,

    /// Display name for the assistant persona.
    #[arg(long, default_value = "ANI")]
    pub persona: String,

    #[arg(long, default_value = "en")]
    pub language: String,

    #[arg(long, default_value = "transcribe")]
    pub task: String,

    #[arg(long)]
    pub multilingual: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        // Same values the arg parser would produce with no flags.
        ClientConfig {
            transcription_url: "ws://localhost:6006".to_string(),
            audio_url: "ws://localhost:8888".to_string(),
            name: "Akhil".to_string(),
            persona: "ANI".to_string(),
            language: "en".to_string(),
            task: "transcribe".to_string(),
            multilingual: false,
        }
    }
}
