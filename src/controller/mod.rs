pub mod event;

use tracing::{debug, info, warn};

use crate::protocol::{Handshake, ServerMessage};
use crate::session::{self, SessionId};
use crate::config::ClientConfig;
use crate::ui::view::ViewOp;

use event::{Effect, Event, Link, UserCommand};

/// All session state, consolidated into one owned object with an
/// explicit lifecycle (created at boot, dropped at shutdown).
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Set once, by the first SERVER_READY. Gates frame forwarding.
    pub server_ready: bool,
    /// Set by the user's stop command. Capture continues, forwarding stops.
    pub stopped: bool,
    /// A transcript bubble is open for mid-utterance updates. A new
    /// bubble starts only after the prior one's eos was seen.
    pub utterance_open: bool,
    /// Seconds shown by the elapsed-time display.
    pub elapsed_secs: u64,
    /// Clip indices are 1-based and never reused, gaps included when a
    /// decode fails.
    pub clip_count: usize,
    /// Bumped on every playback interrupt; decodes issued under an older
    /// generation are discarded when they complete.
    pub playback_generation: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            server_ready: false,
            stopped: false,
            utterance_open: false,
            elapsed_secs: 0,
            clip_count: 0,
            playback_generation: 0,
        }
    }
}

/// Pure event reactor for the chat session.
///
/// `apply` MUST NOT perform I/O; it mutates state and returns effects
/// for the driver to execute, in order.
pub struct Controller {
    pub state: SessionState,
    session_id: SessionId,
    handshake: Handshake,
}

impl Controller {
    pub fn new(config: &ClientConfig) -> Self {
        let session_id = SessionId::generate();
        let handshake = session::handshake(&session_id, config);
        Self {
            state: SessionState::default(),
            session_id,
            handshake,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::LinkOpened(Link::Transcription) => {
                info!(uid = %self.session_id, "transcription link open, sending handshake");
                vec![Effect::SendHandshake(self.handshake.clone())]
            }
            Event::LinkOpened(Link::Audio) => Vec::new(),

            // No reconnect: a closed link leaves the session inert.
            Event::LinkClosed(link) => {
                warn!(%link, "server link closed");
                Vec::new()
            }

            Event::Server(msg) => self.apply_server(msg),

            Event::CaptureFrame(frame) => {
                if self.state.server_ready && !self.state.stopped {
                    vec![Effect::ForwardFrame(frame)]
                } else {
                    // Dropped silently: either the server has not said
                    // SERVER_READY yet or the user stopped the session.
                    Vec::new()
                }
            }

            Event::SpeechBlob(blob) => {
                self.state.clip_count += 1;
                let index = self.state.clip_count;
                debug!(index, bytes = blob.len(), "speech blob received");
                vec![Effect::Decode {
                    generation: self.state.playback_generation,
                    index,
                    blob,
                }]
            }

            Event::ClipDecoded {
                generation,
                index,
                clip,
            } => {
                if generation != self.state.playback_generation {
                    // The user spoke while this decode was in flight.
                    debug!(index, "discarding stale speech clip");
                    return Vec::new();
                }
                vec![
                    Effect::Render(ViewOp::ClipControl {
                        index,
                        bucket: clip.duration_bucket(),
                    }),
                    Effect::AdmitClip { index, clip },
                ]
            }

            Event::ClipDecodeFailed { index } => {
                warn!(index, "speech clip dropped after decode failure");
                Vec::new()
            }

            Event::TimerTick => {
                if self.state.stopped {
                    return Vec::new();
                }
                self.state.elapsed_secs += 1;
                vec![Effect::Render(ViewOp::Elapsed(self.state.elapsed_secs))]
            }

            Event::Command(cmd) => self.apply_command(cmd),
        }
    }

    fn apply_server(&mut self, msg: ServerMessage) -> Vec<Effect> {
        match msg {
            ServerMessage::ServerReady => {
                if self.state.server_ready {
                    // Idempotent: the disabled->enabled transition
                    // happens exactly once per session.
                    return Vec::new();
                }
                info!("server ready, forwarding enabled");
                self.state.server_ready = true;
                vec![Effect::Render(ViewOp::Ready)]
            }

            ServerMessage::Transcript { segments, eos } => {
                let Some(first) = segments.first() else {
                    return Vec::new();
                };

                let mut effects = Vec::new();
                if !self.state.utterance_open {
                    self.state.utterance_open = true;
                    effects.push(Effect::Render(ViewOp::OpenUserBubble));
                }
                effects.push(Effect::Render(ViewOp::SetTranscript(first.text.clone())));

                // The user is talking: anything the assistant is saying
                // must not overlap. Supersede in-flight decodes too.
                self.state.playback_generation += 1;
                effects.push(Effect::InterruptPlayback);

                if eos {
                    self.state.utterance_open = false;
                    effects.push(Effect::Render(ViewOp::CloseBubble));
                }
                effects
            }

            ServerMessage::LlmOutput(lines) => {
                let Some(first) = lines.first() else {
                    return Vec::new();
                };
                // Always a new bubble; replies never overwrite.
                vec![Effect::Render(ViewOp::AssistantBubble(first.clone()))]
            }
        }
    }

    fn apply_command(&mut self, cmd: UserCommand) -> Vec<Effect> {
        match cmd {
            UserCommand::Stop => {
                if self.state.stopped {
                    return Vec::new();
                }
                info!("recording stopped by user");
                self.state.stopped = true;
                vec![Effect::Render(ViewOp::Stopped)]
            }
            UserCommand::Play(index) => vec![Effect::StartClip(index)],
            UserCommand::Pause => vec![Effect::HaltPlayback],
            UserCommand::Quit => vec![Effect::Shutdown],
        }
    }
}
