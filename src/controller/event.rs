use crate::audio::playback::AudioClip;
use crate::protocol::{Handshake, ServerMessage};
use crate::ui::view::ViewOp;

/// Which of the two server links an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Transcription,
    Audio,
}

impl std::fmt::Display for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Link::Transcription => f.write_str("transcription"),
            Link::Audio => f.write_str("audio"),
        }
    }
}

/// Commands typed by the user at the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Stop forwarding microphone frames. Capture keeps running.
    Stop,
    /// Replay a stored speech clip by its index.
    Play(usize),
    /// Halt the clip that is currently playing and rewind it.
    Pause,
    Quit,
}

impl UserCommand {
    /// Parses one line typed at the terminal. `None` means the line was
    /// empty or not a command.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        match words.next()? {
            "stop" => Some(UserCommand::Stop),
            "pause" => Some(UserCommand::Pause),
            "quit" | "exit" => Some(UserCommand::Quit),
            "play" => words.next()?.parse().ok().map(UserCommand::Play),
            _ => None,
        }
    }
}

/// Everything the controller reacts to. All I/O sources funnel into this
/// one stream; the controller itself never touches a socket or a device.
#[derive(Debug)]
pub enum Event {
    /// The transcription link finished its websocket handshake.
    LinkOpened(Link),
    LinkClosed(Link),
    /// One parsed text frame from the transcription link.
    Server(ServerMessage),
    /// One microphone frame (16 kHz mono f32) from the capture path.
    CaptureFrame(Vec<f32>),
    /// One binary blob from the audio link, not yet decoded.
    SpeechBlob(Vec<u8>),
    /// A decode finished. `generation` is the playback generation the
    /// decode was issued under; stale generations are discarded.
    ClipDecoded {
        generation: u64,
        index: usize,
        clip: AudioClip,
    },
    ClipDecodeFailed { index: usize },
    /// One-second cadence for the elapsed-time display.
    TimerTick,
    Command(UserCommand),
}

/// Side effects for the driver to execute. The controller only decides.
#[derive(Debug, PartialEq)]
pub enum Effect {
    /// Send the session handshake on the transcription link.
    SendHandshake(Handshake),
    /// Forward one PCM frame to the server as a binary websocket message.
    ForwardFrame(Vec<f32>),
    /// Decode a speech blob off the event loop, tagged with the playback
    /// generation current at receipt.
    Decode {
        generation: u64,
        index: usize,
        blob: Vec<u8>,
    },
    /// Register a decoded clip and start playing it immediately.
    AdmitClip { index: usize, clip: AudioClip },
    /// Replay an already-registered clip from the start.
    StartClip(usize),
    /// Stop whatever is playing and rewind it.
    HaltPlayback,
    /// Stop and drop all queued synthesized speech (user started talking).
    InterruptPlayback,
    Render(ViewOp),
    Shutdown,
}
