use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::controller::event::{Event, Link};

/// Drives the synthesized-speech link. Receive-only: every binary frame
/// is one complete audio blob. No reconnect on closure.
pub async fn run(url: String, events: mpsc::Sender<Event>, shutdown: CancellationToken) {
    info!(%url, "connecting audio link");

    let ws_stream = match connect_async(url.as_str()).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            error!(%url, "audio connect failed: {}", e);
            let _ = events.send(Event::LinkClosed(Link::Audio)).await;
            return;
        }
    };

    let (_, mut ws_rx) = ws_stream.split();
    if events.send(Event::LinkOpened(Link::Audio)).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Binary(blob))) => {
                        if events.send(Event::SpeechBlob(blob)).await.is_err() {
                            return;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!("audio link closed by server ({:?})", frame);
                        break;
                    }
                    Some(Ok(other)) => debug!("ignoring frame on audio link: {:?}", other),
                    Some(Err(e)) => {
                        warn!("audio link error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
            _ = shutdown.cancelled() => return,
        }
    }

    let _ = events.send(Event::LinkClosed(Link::Audio)).await;
}
