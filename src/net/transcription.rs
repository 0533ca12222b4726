use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::controller::event::{Event, Link};
use crate::protocol::ServerMessage;

use super::Outbound;

/// Drives the transcription link: delivers inbound JSON frames as
/// events and writes queued outbound payloads (handshake, PCM frames).
///
/// There is no reconnect. When the socket closes, for any reason, a
/// `LinkClosed` event is emitted and the task ends.
pub async fn run(
    url: String,
    events: mpsc::Sender<Event>,
    mut outbound: mpsc::Receiver<Outbound>,
    shutdown: CancellationToken,
) {
    info!(%url, "connecting transcription link");

    let ws_stream = match connect_async(url.as_str()).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            error!(%url, "transcription connect failed: {}", e);
            let _ = events.send(Event::LinkClosed(Link::Transcription)).await;
            return;
        }
    };

    let (mut ws_tx, mut ws_rx) = ws_stream.split();
    if events.send(Event::LinkOpened(Link::Transcription)).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match ServerMessage::parse(&text) {
                            Ok(msg) => {
                                if events.send(Event::Server(msg)).await.is_err() {
                                    return;
                                }
                            }
                            // Malformed frames are dropped, never fatal.
                            Err(e) => warn!("dropping server frame: {}", e),
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!("transcription link closed by server ({:?})", frame);
                        break;
                    }
                    Some(Ok(other)) => debug!("ignoring frame: {:?}", other),
                    Some(Err(e)) => {
                        warn!("transcription link error: {}", e);
                        break;
                    }
                    None => break,
                }
            }

            payload = outbound.recv() => {
                let Some(payload) = payload else { break };
                let msg = match payload {
                    Outbound::Text(text) => Message::Text(text),
                    Outbound::Binary(bytes) => Message::Binary(bytes),
                };
                if let Err(e) = ws_tx.send(msg).await {
                    warn!("transcription send failed: {}", e);
                    break;
                }
            }

            _ = shutdown.cancelled() => {
                let _ = ws_tx.close().await;
                return;
            }
        }
    }

    let _ = events.send(Event::LinkClosed(Link::Transcription)).await;
}
