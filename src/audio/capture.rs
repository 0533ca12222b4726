use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::traits::Producer;
use tracing::{error, info};

/// The server transcribes 16 kHz mono; capture is fixed at that rate.
pub const CAPTURE_SAMPLE_RATE: u32 = 16_000;

pub struct MicCapture {
    _stream: cpal::Stream,
    pub sample_rate: u32,
}

impl MicCapture {
    /// Opens the default input device at 16 kHz and starts pushing mono
    /// f32 samples into `producer`. The stream lives as long as the
    /// returned struct; stopping the session does not tear it down.
    pub fn new<P>(mut producer: P) -> Result<Self, anyhow::Error>
    where
        P: Producer<Item = f32> + Send + 'static,
    {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow::anyhow!("No input device available"))?;

        info!("Audio Input Device: {}", device.name().unwrap_or_default());

        let mut selected_config = None;
        for config_range in device.supported_input_configs()? {
            if config_range.min_sample_rate().0 <= CAPTURE_SAMPLE_RATE
                && config_range.max_sample_rate().0 >= CAPTURE_SAMPLE_RATE
            {
                selected_config =
                    Some(config_range.with_sample_rate(cpal::SampleRate(CAPTURE_SAMPLE_RATE)));
                break;
            }
        }
        let config = selected_config.ok_or_else(|| {
            anyhow::anyhow!(
                "Input device does not support {} Hz capture",
                CAPTURE_SAMPLE_RATE
            )
        })?;

        let channels = config.channels() as usize;
        info!(
            "Audio Config Selected: Rate={}Hz, Channels={}",
            CAPTURE_SAMPLE_RATE, channels
        );

        let err_fn = |err| error!("an error occurred on stream: {}", err);

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config.into(),
                move |data: &[f32], _: &_| write_input_data(data, channels, &mut producer),
                err_fn,
                None,
            )?,
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config.into(),
                move |data: &[i16], _: &_| write_input_data_i16(data, channels, &mut producer),
                err_fn,
                None,
            )?,
            _ => return Err(anyhow::anyhow!("Unsupported sample format")),
        };

        stream.play()?;

        Ok(Self {
            _stream: stream,
            sample_rate: CAPTURE_SAMPLE_RATE,
        })
    }
}

// Downmix to mono by averaging interleaved channels. If the producer is
// full the samples are dropped (lossy).
fn write_input_data<P>(input: &[f32], channels: usize, producer: &mut P)
where
    P: Producer<Item = f32>,
{
    if channels <= 1 {
        producer.push_slice(input);
        return;
    }
    for frame in input.chunks_exact(channels) {
        let mono = frame.iter().sum::<f32>() / channels as f32;
        let _ = producer.try_push(mono);
    }
}

fn write_input_data_i16<P>(input: &[i16], channels: usize, producer: &mut P)
where
    P: Producer<Item = f32>,
{
    if channels <= 1 {
        for &sample in input {
            let _ = producer.try_push(sample as f32 / i16::MAX as f32);
        }
        return;
    }
    for frame in input.chunks_exact(channels) {
        let sum: f32 = frame.iter().map(|&s| s as f32 / i16::MAX as f32).sum();
        let _ = producer.try_push(sum / channels as f32);
    }
}
