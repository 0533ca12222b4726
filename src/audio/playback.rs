use std::collections::HashMap;
use std::io::Cursor;
use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, warn};

/// Largest duration bucket shown on a clip control.
pub const MAX_DURATION_BUCKET: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("audio decode failed: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
    #[error("no audio output device: {0}")]
    Output(#[from] rodio::StreamError),
    #[error("playback sink: {0}")]
    Sink(#[from] rodio::PlayError),
    #[error("unknown clip index {0}")]
    UnknownClip(usize),
}

/// A fully decoded synthesized-speech clip. Kept for the life of the
/// session so it can be replayed from its control.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl AudioClip {
    pub fn duration(&self) -> Duration {
        if self.channels == 0 || self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let frames = self.samples.len() as u64 / self.channels as u64;
        Duration::from_secs_f64(frames as f64 / self.sample_rate as f64)
    }

    /// Whole-second duration bucket for the clip control, capped at 10.
    pub fn duration_bucket(&self) -> u64 {
        self.duration().as_secs().min(MAX_DURATION_BUCKET)
    }
}

/// Decodes one binary blob from the audio link. Pure with respect to the
/// output device, so it can run on a blocking worker.
pub fn decode_clip(blob: Vec<u8>) -> Result<AudioClip, PlaybackError> {
    let decoder = rodio::Decoder::new(Cursor::new(blob))?;
    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();
    let samples: Vec<f32> = decoder.convert_samples().collect();
    debug!(
        channels,
        sample_rate,
        samples = samples.len(),
        "decoded speech clip"
    );
    Ok(AudioClip {
        channels,
        sample_rate,
        samples,
    })
}

/// Owns the output device and the single play cursor.
///
/// At most one clip is audible at a time; starting a clip stops whatever
/// the cursor was doing. Clips are registered by index and never freed.
pub struct PlaybackEngine {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    cursor: Option<Sink>,
    clips: HashMap<usize, AudioClip>,
}

impl PlaybackEngine {
    pub fn new() -> Result<Self, PlaybackError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
            cursor: None,
            clips: HashMap::new(),
        })
    }

    /// Registers a freshly decoded clip and starts it immediately.
    pub fn admit(&mut self, index: usize, clip: AudioClip) -> Result<(), PlaybackError> {
        self.clips.insert(index, clip);
        self.start(index)
    }

    /// (Re)starts a registered clip from the beginning, superseding the
    /// current cursor.
    pub fn start(&mut self, index: usize) -> Result<(), PlaybackError> {
        let clip = self
            .clips
            .get(&index)
            .ok_or(PlaybackError::UnknownClip(index))?
            .clone();
        self.halt();
        let sink = Sink::try_new(&self.handle)?;
        sink.append(SamplesBuffer::new(
            clip.channels,
            clip.sample_rate,
            clip.samples,
        ));
        self.cursor = Some(sink);
        Ok(())
    }

    /// Stops the cursor and rewinds it. Safe when nothing is playing.
    pub fn halt(&mut self) {
        if let Some(sink) = self.cursor.take() {
            sink.stop();
        }
    }

    /// Hard interrupt: the user started talking, kill anything audible.
    pub fn interrupt(&mut self) {
        if self.cursor.is_some() {
            warn!("interrupting synthesized speech for incoming utterance");
        }
        self.halt();
    }

    pub fn clip(&self, index: usize) -> Option<&AudioClip> {
        self.clips.get(&index)
    }
}
