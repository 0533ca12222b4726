use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use ringbuf::traits::Split;
use ringbuf::HeapRb;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use anichat::audio::capture::MicCapture;
use anichat::audio::forward::{frame_to_bytes, FrameForwarder, FRAME_SAMPLES};
use anichat::audio::playback::{decode_clip, PlaybackEngine};
use anichat::config::ClientConfig;
use anichat::controller::event::{Effect, Event, UserCommand};
use anichat::controller::Controller;
use anichat::net::{self, Outbound};
use anichat::ui::view::TranscriptView;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ClientConfig::parse();
    tracing::info!("anichat starting");

    let (tx, mut rx) = mpsc::channel::<Event>(256);
    let shutdown = CancellationToken::new();

    // Microphone capture. A denied or missing device is logged and the
    // session continues without input, matching the original behavior.
    let rb = HeapRb::<f32>::new(FRAME_SAMPLES * 8);
    let (producer, consumer) = rb.split();
    let _capture = match MicCapture::new(producer) {
        Ok(capture) => {
            let forwarder = FrameForwarder::new(consumer, tx.clone());
            std::thread::spawn(move || forwarder.run());
            Some(capture)
        }
        Err(e) => {
            tracing::error!("microphone capture unavailable: {:#}", e);
            None
        }
    };

    // Server links.
    let (outbound_tx, outbound_rx) = mpsc::channel::<Outbound>(64);
    tokio::spawn(net::transcription::run(
        config.transcription_url.clone(),
        tx.clone(),
        outbound_rx,
        shutdown.clone(),
    ));
    tokio::spawn(net::audio::run(
        config.audio_url.clone(),
        tx.clone(),
        shutdown.clone(),
    ));

    // Terminal commands.
    let command_tx = tx.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let Some(cmd) = UserCommand::parse(&line) {
                if command_tx.send(Event::Command(cmd)).await.is_err() {
                    return;
                }
            }
        }
    });

    // Synthesized-speech output. The stream handle is not Send, so the
    // engine lives here on the driver thread.
    let mut playback = match PlaybackEngine::new() {
        Ok(engine) => Some(engine),
        Err(e) => {
            tracing::warn!("no audio output, speech playback disabled: {}", e);
            None
        }
    };

    let mut view = TranscriptView::new(std::io::stdout(), &config.name, &config.persona);
    view.intro()?;

    let mut controller = Controller::new(&config);

    let mut cadence = tokio::time::interval(Duration::from_secs(1));
    cadence.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    cadence.tick().await; // the first tick fires immediately

    'driver: loop {
        let event = tokio::select! {
            _ = cadence.tick() => Event::TimerTick,
            event = rx.recv() => match event {
                Some(event) => event,
                None => break,
            },
            _ = shutdown.cancelled() => break,
            _ = tokio::signal::ctrl_c() => break,
        };

        for effect in controller.apply(event) {
            match effect {
                Effect::SendHandshake(handshake) => {
                    let _ = outbound_tx.send(Outbound::Text(handshake.to_json())).await;
                }
                Effect::ForwardFrame(frame) => {
                    let _ = outbound_tx
                        .send(Outbound::Binary(frame_to_bytes(&frame)))
                        .await;
                }
                Effect::Decode {
                    generation,
                    index,
                    blob,
                } => {
                    let decode_tx = tx.clone();
                    tokio::task::spawn_blocking(move || {
                        let event = match decode_clip(blob) {
                            Ok(clip) => Event::ClipDecoded {
                                generation,
                                index,
                                clip,
                            },
                            Err(e) => {
                                tracing::warn!(index, "decode failed: {}", e);
                                Event::ClipDecodeFailed { index }
                            }
                        };
                        let _ = decode_tx.blocking_send(event);
                    });
                }
                Effect::AdmitClip { index, clip } => {
                    if let Some(engine) = playback.as_mut() {
                        if let Err(e) = engine.admit(index, clip) {
                            tracing::warn!(index, "clip playback failed: {}", e);
                        }
                    }
                }
                Effect::StartClip(index) => {
                    if let Some(engine) = playback.as_mut() {
                        if let Err(e) = engine.start(index) {
                            tracing::warn!(index, "clip replay failed: {}", e);
                        }
                    }
                }
                Effect::HaltPlayback => {
                    if let Some(engine) = playback.as_mut() {
                        engine.halt();
                    }
                }
                Effect::InterruptPlayback => {
                    if let Some(engine) = playback.as_mut() {
                        engine.interrupt();
                    }
                }
                Effect::Render(op) => {
                    if let Err(e) = view.apply(op) {
                        tracing::warn!("render failed: {}", e);
                    }
                }
                Effect::Shutdown => {
                    shutdown.cancel();
                    break 'driver;
                }
            }
        }
    }

    tracing::info!("anichat shutting down");
    shutdown.cancel();
    Ok(())
}
