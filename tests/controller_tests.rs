use anichat::audio::playback::AudioClip;
use anichat::config::ClientConfig;
use anichat::controller::event::{Effect, Event, Link, UserCommand};
use anichat::controller::Controller;
use anichat::protocol::{Segment, ServerMessage};
use anichat::ui::view::ViewOp;

fn transcript(text: &str, eos: bool) -> Event {
    Event::Server(ServerMessage::Transcript {
        segments: vec![Segment {
            text: text.to_string(),
        }],
        eos,
    })
}

fn test_clip() -> AudioClip {
    AudioClip {
        channels: 1,
        sample_rate: 24_000,
        samples: vec![0.0; 24_000], // one second
    }
}

#[test]
fn handshake_is_sent_on_link_open_with_fresh_uid() {
    let config = ClientConfig::default();
    let mut a = Controller::new(&config);
    let mut b = Controller::new(&config);

    let effects = a.apply(Event::LinkOpened(Link::Transcription));
    let Some(Effect::SendHandshake(handshake)) = effects.first() else {
        panic!("expected handshake, got {:?}", effects);
    };

    // Well-formed 36-char v4-shaped identifier.
    assert_eq!(handshake.uid.len(), 36);
    assert_eq!(handshake.uid.matches('-').count(), 4);
    assert!(!handshake.multilingual);
    assert_eq!(handshake.language, "en");
    assert_eq!(handshake.task, "transcribe");

    // Distinct from another session's identifier.
    let effects = b.apply(Event::LinkOpened(Link::Transcription));
    let Some(Effect::SendHandshake(other)) = effects.first() else {
        panic!("expected handshake");
    };
    assert_ne!(handshake.uid, other.uid);
}

#[test]
fn frames_forwarded_only_when_ready_and_not_stopped() {
    let mut controller = Controller::new(&ClientConfig::default());

    // Before SERVER_READY: dropped silently.
    let effects = controller.apply(Event::CaptureFrame(vec![0.1; 4]));
    assert!(effects.is_empty());

    controller.apply(Event::Server(ServerMessage::ServerReady));

    // Ready and not stopped: forwarded.
    let effects = controller.apply(Event::CaptureFrame(vec![0.2; 4]));
    assert_eq!(effects, vec![Effect::ForwardFrame(vec![0.2; 4])]);

    // Stopped: dropped again, even though still ready.
    controller.apply(Event::Command(UserCommand::Stop));
    let effects = controller.apply(Event::CaptureFrame(vec![0.3; 4]));
    assert!(effects.is_empty());
}

#[test]
fn server_ready_enables_forwarding_exactly_once() {
    let mut controller = Controller::new(&ClientConfig::default());

    let first = controller.apply(Event::Server(ServerMessage::ServerReady));
    assert_eq!(first, vec![Effect::Render(ViewOp::Ready)]);
    assert!(controller.state.server_ready);

    // A repeated SERVER_READY is a no-op.
    let second = controller.apply(Event::Server(ServerMessage::ServerReady));
    assert!(second.is_empty());
    assert!(controller.state.server_ready);
}

#[test]
fn eos_closes_the_bubble_and_the_next_segment_opens_a_new_one() {
    let mut controller = Controller::new(&ClientConfig::default());

    // First partial opens a bubble.
    let effects = controller.apply(transcript("hel", false));
    assert!(effects.contains(&Effect::Render(ViewOp::OpenUserBubble)));
    assert!(effects.contains(&Effect::Render(ViewOp::SetTranscript("hel".into()))));

    // Later partials of the same utterance update in place, no new row.
    let effects = controller.apply(transcript("hello", false));
    assert!(!effects.contains(&Effect::Render(ViewOp::OpenUserBubble)));
    assert!(effects.contains(&Effect::Render(ViewOp::SetTranscript("hello".into()))));

    // eos finalizes the bubble.
    let effects = controller.apply(transcript("hello there", true));
    assert!(effects.contains(&Effect::Render(ViewOp::CloseBubble)));

    // The next segment starts a fresh bubble rather than appending.
    let effects = controller.apply(transcript("new utterance", false));
    assert!(effects.contains(&Effect::Render(ViewOp::OpenUserBubble)));
}

#[test]
fn every_segment_message_interrupts_playback() {
    let mut controller = Controller::new(&ClientConfig::default());

    let effects = controller.apply(transcript("a", false));
    assert!(effects.contains(&Effect::InterruptPlayback));
    let effects = controller.apply(transcript("ab", false));
    assert!(effects.contains(&Effect::InterruptPlayback));
}

#[test]
fn llm_output_always_creates_a_new_bubble() {
    let mut controller = Controller::new(&ClientConfig::default());

    let first = controller.apply(Event::Server(ServerMessage::LlmOutput(vec![
        "hi there".to_string(),
    ])));
    assert_eq!(
        first,
        vec![Effect::Render(ViewOp::AssistantBubble("hi there".into()))]
    );

    let second = controller.apply(Event::Server(ServerMessage::LlmOutput(vec![
        "and again".to_string(),
    ])));
    assert_eq!(
        second,
        vec![Effect::Render(ViewOp::AssistantBubble("and again".into()))]
    );
}

#[test]
fn forwarding_begins_only_after_server_ready_end_to_end() {
    let mut controller = Controller::new(&ClientConfig::default());

    let mut sent_binary = Vec::new();
    let script: Vec<Event> = vec![
        Event::LinkOpened(Link::Transcription),
        Event::CaptureFrame(vec![0.5; 8]),
        Event::Server(ServerMessage::ServerReady),
        Event::CaptureFrame(vec![0.6; 8]),
    ];
    for event in script {
        for effect in controller.apply(event) {
            if let Effect::ForwardFrame(frame) = effect {
                sent_binary.push(frame);
            }
        }
    }

    // Only the post-ready frame made it to the wire.
    assert_eq!(sent_binary, vec![vec![0.6; 8]]);
}

#[test]
fn stale_decodes_are_discarded_after_an_interrupt() {
    let mut controller = Controller::new(&ClientConfig::default());

    let effects = controller.apply(Event::SpeechBlob(vec![1, 2, 3]));
    let Some(Effect::Decode {
        generation, index, ..
    }) = effects.first()
    else {
        panic!("expected decode effect, got {:?}", effects);
    };
    let (generation, index) = (*generation, *index);
    assert_eq!(index, 1);

    // A transcript segment arrives while the decode is in flight.
    controller.apply(transcript("user talking", false));

    // The decode completes under the old generation: discarded.
    let effects = controller.apply(Event::ClipDecoded {
        generation,
        index,
        clip: test_clip(),
    });
    assert!(effects.is_empty(), "stale clip must not play: {:?}", effects);

    // A decode issued after the interrupt is admitted and played.
    let effects = controller.apply(Event::SpeechBlob(vec![4, 5, 6]));
    let Some(Effect::Decode { generation, index, .. }) = effects.first() else {
        panic!("expected decode effect");
    };
    let (generation, index) = (*generation, *index);
    assert_eq!(index, 2);

    let effects = controller.apply(Event::ClipDecoded {
        generation,
        index,
        clip: test_clip(),
    });
    assert!(effects.contains(&Effect::AdmitClip {
        index: 2,
        clip: test_clip()
    }));
    assert!(effects.contains(&Effect::Render(ViewOp::ClipControl { index: 2, bucket: 1 })));
}

#[test]
fn decode_failures_drop_the_clip() {
    let mut controller = Controller::new(&ClientConfig::default());
    controller.apply(Event::SpeechBlob(vec![0xff; 16]));
    let effects = controller.apply(Event::ClipDecodeFailed { index: 1 });
    assert!(effects.is_empty());

    // The index is not reused; the next blob takes the next slot.
    let effects = controller.apply(Event::SpeechBlob(vec![1]));
    let Some(Effect::Decode { index, .. }) = effects.first() else {
        panic!("expected decode effect");
    };
    assert_eq!(*index, 2);
}

#[test]
fn timer_ticks_render_elapsed_until_stopped() {
    let mut controller = Controller::new(&ClientConfig::default());

    let effects = controller.apply(Event::TimerTick);
    assert_eq!(effects, vec![Effect::Render(ViewOp::Elapsed(1))]);
    let effects = controller.apply(Event::TimerTick);
    assert_eq!(effects, vec![Effect::Render(ViewOp::Elapsed(2))]);

    controller.apply(Event::Command(UserCommand::Stop));
    let effects = controller.apply(Event::TimerTick);
    assert!(effects.is_empty());
    assert_eq!(controller.state.elapsed_secs, 2);
}

#[test]
fn replay_and_pause_commands_drive_the_play_cursor() {
    let mut controller = Controller::new(&ClientConfig::default());

    let effects = controller.apply(Event::Command(UserCommand::Play(3)));
    assert_eq!(effects, vec![Effect::StartClip(3)]);

    let effects = controller.apply(Event::Command(UserCommand::Pause));
    assert_eq!(effects, vec![Effect::HaltPlayback]);

    let effects = controller.apply(Event::Command(UserCommand::Quit));
    assert_eq!(effects, vec![Effect::Shutdown]);
}

#[test]
fn command_lines_parse() {
    assert_eq!(UserCommand::parse("stop"), Some(UserCommand::Stop));
    assert_eq!(UserCommand::parse("play 2"), Some(UserCommand::Play(2)));
    assert_eq!(UserCommand::parse("pause"), Some(UserCommand::Pause));
    assert_eq!(UserCommand::parse("quit"), Some(UserCommand::Quit));
    assert_eq!(UserCommand::parse(""), None);
    assert_eq!(UserCommand::parse("play x"), None);
    assert_eq!(UserCommand::parse("sing"), None);
}
