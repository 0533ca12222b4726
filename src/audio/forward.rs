use ringbuf::traits::Consumer;
use tokio::sync::mpsc;
use tracing::info;

use crate::controller::event::Event;

/// Samples per forwarded frame. Matches the server's expected chunking.
pub const FRAME_SAMPLES: usize = 4096;

/// Drains the capture ring buffer into fixed-size frames and hands them
/// to the controller. Runs on a dedicated thread; the gating decision
/// (server ready, not stopped) is the controller's, not ours.
pub struct FrameForwarder<C>
where
    C: Consumer<Item = f32> + Send,
{
    consumer: C,
    tx: mpsc::Sender<Event>,
}

impl<C> FrameForwarder<C>
where
    C: Consumer<Item = f32> + Send,
{
    pub fn new(consumer: C, tx: mpsc::Sender<Event>) -> Self {
        Self { consumer, tx }
    }

    pub fn run(mut self) {
        info!("Frame forwarder started ({} samples/frame)", FRAME_SAMPLES);
        let mut frame = vec![0.0f32; FRAME_SAMPLES];

        loop {
            if self.consumer.occupied_len() < FRAME_SAMPLES {
                std::thread::sleep(std::time::Duration::from_millis(10));
                continue;
            }

            let _ = self.consumer.pop_slice(&mut frame);

            // Controller gone means the session is over.
            if self
                .tx
                .blocking_send(Event::CaptureFrame(frame.clone()))
                .is_err()
            {
                info!("Frame forwarder stopping: controller channel closed");
                return;
            }
        }
    }
}

/// Serializes one frame for the wire: raw little-endian f32 PCM, the
/// byte layout the transcription server consumes.
pub fn frame_to_bytes(frame: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(frame.len() * 4);
    for sample in frame {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}
