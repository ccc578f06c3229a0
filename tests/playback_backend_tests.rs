// Tests for the playback backend abstractions and the simulated backend

use call_screen::{
    CallConfig, CallPhase, CallSession, MediaSource, PlaybackBackend, PlaybackError,
    SimulatedPlayback,
};
use std::time::Duration;

#[test]
fn test_media_source_is_opaque() {
    let source = MediaSource::new("https://media.test/a.mp4?x=1&y=2");

    assert_eq!(source.as_str(), "https://media.test/a.mp4?x=1&y=2");
    assert_eq!(source.to_string(), source.as_str());
}

#[test]
fn test_playback_error_messages() {
    let rejected = PlaybackError::Rejected("autoplay blocked".to_string());
    assert_eq!(rejected.to_string(), "playback rejected: autoplay blocked");

    let unsupported = PlaybackError::Unsupported("empty source".to_string());
    assert!(unsupported.to_string().contains("unsupported"));
}

#[test]
fn test_simulated_mute_attribute() {
    let mut backend = SimulatedPlayback::new(Duration::from_secs(1));

    assert!(backend.is_muted(), "Simulated media starts muted");
    backend.set_muted(false);
    assert!(!backend.is_muted());
    assert_eq!(backend.name(), "simulated");
}

#[tokio::test]
async fn test_simulated_play_requires_notifier() {
    let mut backend = SimulatedPlayback::new(Duration::from_secs(1));

    let result = backend.play(&MediaSource::new("https://media.test/a.mp4")).await;

    assert!(matches!(result, Err(PlaybackError::Backend(_))));
}

#[tokio::test(start_paused = true)]
async fn test_simulated_empty_source_is_rejected() {
    let config = CallConfig {
        session_id: "empty-source".to_string(),
        connect_delay: Duration::from_millis(100),
        media_source: MediaSource::new(""),
    };
    let mut session = CallSession::new(config, SimulatedPlayback::new(Duration::from_secs(1)));
    session.start();

    tokio::time::advance(Duration::from_millis(100)).await;
    session.process_pending();

    assert_eq!(session.phase(), CallPhase::Active);
    assert!(matches!(
        session.media().last_failure(),
        Some(PlaybackError::Unsupported(_))
    ));

    // No end-of-stream ever arrives for a rejected start
    tokio::time::advance(Duration::from_secs(5)).await;
    tokio::task::yield_now().await;
    session.process_pending();
    assert_eq!(session.phase(), CallPhase::Active);
}

#[tokio::test(start_paused = true)]
async fn test_simulated_playback_reports_end_of_stream() {
    let config = CallConfig {
        session_id: "simulated".to_string(),
        connect_delay: Duration::from_millis(100),
        media_source: MediaSource::new("https://media.test/a.mp4"),
    };
    let mut session = CallSession::new(config, SimulatedPlayback::new(Duration::from_secs(2)));
    session.start();

    session.step().await;
    assert_eq!(session.phase(), CallPhase::Active);
    assert!(session.is_muted());
    assert!(session.media().backend().is_muted());

    session.step().await;
    assert_eq!(session.phase(), CallPhase::Ended);
}
