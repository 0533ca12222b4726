use std::io::{self, Write};

/// Rendering instructions emitted by the controller. The view is the only
/// consumer; it owns the terminal line discipline.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOp {
    /// Server accepted the handshake and will take audio.
    Ready,
    /// Start a new speaker row + bubble for the human speaker.
    OpenUserBubble,
    /// Overwrite the open bubble with the latest partial transcript.
    SetTranscript(String),
    /// The utterance ended; the bubble text is final.
    CloseBubble,
    /// Append a finished assistant reply as its own row + bubble.
    AssistantBubble(String),
    /// One-second elapsed-time update.
    Elapsed(u64),
    /// A synthesized speech clip arrived and is playing.
    ClipControl { index: usize, bucket: u64 },
    /// Frame forwarding was stopped by the user.
    Stopped,
}

pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}s", secs / 60, secs % 60)
}

/// Line-oriented transcript renderer.
///
/// Closed bubbles scroll away as ordinary lines. The bottom line is live:
/// it carries the elapsed-time display and, while an utterance is open,
/// the partial transcript, and is redrawn in place with `\r`.
pub struct TranscriptView<W: Write> {
    out: W,
    user_label: String,
    assistant_label: String,
    elapsed_secs: u64,
    open_text: Option<String>,
    live_width: usize,
}

impl<W: Write> TranscriptView<W> {
    pub fn new(out: W, user_label: &str, assistant_label: &str) -> Self {
        Self {
            out,
            user_label: user_label.to_string(),
            assistant_label: assistant_label.to_string(),
            elapsed_secs: 0,
            open_text: None,
            live_width: 0,
        }
    }

    pub fn intro(&mut self) -> io::Result<()> {
        writeln!(
            self.out,
            "Speak into the microphone. Commands: stop, play <n>, pause, quit."
        )?;
        self.out.flush()
    }

    pub fn apply(&mut self, op: ViewOp) -> io::Result<()> {
        match op {
            ViewOp::Ready => self.interject("-- server ready --")?,
            ViewOp::OpenUserBubble => {
                self.clear_live()?;
                writeln!(self.out, "* {}", self.user_label)?;
                self.open_text = Some(String::new());
                self.redraw_live()?;
            }
            ViewOp::SetTranscript(text) => {
                self.open_text = Some(text);
                self.redraw_live()?;
            }
            ViewOp::CloseBubble => {
                if let Some(text) = self.open_text.take() {
                    self.clear_live()?;
                    writeln!(self.out, "  {}", text.trim())?;
                    self.redraw_live()?;
                }
            }
            ViewOp::AssistantBubble(text) => {
                self.clear_live()?;
                writeln!(self.out, "* {}", self.assistant_label)?;
                writeln!(self.out, "  {}", text.trim())?;
                self.redraw_live()?;
            }
            ViewOp::Elapsed(secs) => {
                self.elapsed_secs = secs;
                self.redraw_live()?;
            }
            ViewOp::ClipControl { index, bucket } => {
                self.interject(&format!("~ clip {} ({}s) playing", index, bucket))?;
            }
            ViewOp::Stopped => self.interject("-- recording stopped --")?,
        }
        self.out.flush()
    }

    /// Prints a full line without disturbing the live line.
    fn interject(&mut self, line: &str) -> io::Result<()> {
        self.clear_live()?;
        writeln!(self.out, "{}", line)?;
        self.redraw_live()
    }

    fn clear_live(&mut self) -> io::Result<()> {
        if self.live_width > 0 {
            write!(self.out, "\r{}\r", " ".repeat(self.live_width))?;
            self.live_width = 0;
        }
        Ok(())
    }

    fn redraw_live(&mut self) -> io::Result<()> {
        let line = match &self.open_text {
            Some(text) => format!("[{}] {}", format_elapsed(self.elapsed_secs), text),
            None => format!("[{}] listening", format_elapsed(self.elapsed_secs)),
        };
        let pad = self.live_width.saturating_sub(line.chars().count());
        write!(self.out, "\r{}{}\r", line, " ".repeat(pad))?;
        // After padding, reposition so the cursor sits at line end.
        write!(self.out, "{}", line)?;
        self.live_width = line.chars().count();
        Ok(())
    }
}
