use futures::FutureExt;
use std::future;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::backend::{MediaSource, PlayFuture, PlaybackBackend, PlaybackError};
use crate::session::{CallPhase, PhaseController, PhaseTransition, PlaybackNotifier};

/// Binds a playback backend to the call phase.
///
/// Starts playback when the call becomes active, stops it when the call ends
/// and turns end-of-stream into the `Ended` transition. The adapter is the only
/// writer of the mute flag, so `is_muted()` and the backend's mute attribute
/// always agree.
pub struct MediaPlaybackAdapter<B: PlaybackBackend> {
    backend: B,

    /// Fixed media resource
    source: MediaSource,

    /// Phase subscription, registered before any playback can start
    phase_rx: watch::Receiver<CallPhase>,

    is_muted: bool,

    /// Whether playback was started and not yet stopped or ended
    playing: bool,

    /// Whether end-of-stream ended the call
    reached_end: bool,

    /// In-flight playback start
    pending_start: Option<PlayFuture>,

    /// Last playback start failure, for diagnostics
    last_failure: Option<PlaybackError>,
}

impl<B: PlaybackBackend> MediaPlaybackAdapter<B> {
    pub fn new(
        mut backend: B,
        source: MediaSource,
        phase_rx: watch::Receiver<CallPhase>,
        notifier: PlaybackNotifier,
    ) -> Self {
        backend.attach(notifier);
        backend.set_muted(true);

        debug!("Playback adapter bound to {} ({})", backend.name(), source);

        Self {
            backend,
            source,
            phase_rx,
            is_muted: true,
            playing: false,
            reached_end: false,
            pending_start: None,
            last_failure: None,
        }
    }

    /// React to a phase change observed since the last call
    pub fn sync_phase(&mut self) {
        if !self.phase_rx.has_changed().unwrap_or(false) {
            return;
        }

        let phase = *self.phase_rx.borrow_and_update();
        match phase {
            CallPhase::Active => self.begin_playback(),
            CallPhase::Ended => self.stop_playback(),
            CallPhase::Connecting => {}
        }
    }

    /// Set the mute flag and the backend's mute attribute together
    pub fn set_muted(&mut self, muted: bool) {
        self.backend.set_muted(muted);
        self.is_muted = muted;
        debug_assert_eq!(self.backend.is_muted(), self.is_muted);
    }

    /// Handle end-of-stream from the backend
    pub fn on_playback_ended(
        &mut self,
        controller: &mut PhaseController,
    ) -> Option<PhaseTransition> {
        if controller.phase() != CallPhase::Active {
            debug!("End-of-stream in phase {}; ignoring", controller.phase());
            return None;
        }

        info!("Playback finished");
        self.playing = false;
        self.reached_end = true;
        controller.transition_to_ended()
    }

    /// Record a rejected playback start. The phase is left alone.
    pub fn on_playback_rejected(&mut self, error: PlaybackError) {
        warn!("Playback start failed on {}: {}", self.backend.name(), error);
        self.playing = false;
        self.last_failure = Some(error);
    }

    /// Resolves when the in-flight playback start settles; pending forever if
    /// there is none.
    ///
    /// Cancel safe: the start stays in flight if this future is dropped.
    pub async fn start_settled(&mut self) -> Result<(), PlaybackError> {
        let result = match self.pending_start.as_mut() {
            Some(start) => start.await,
            None => future::pending().await,
        };
        self.pending_start = None;
        result
    }

    /// Take the playback start outcome if it is already available
    pub fn poll_start_settled(&mut self) -> Option<Result<(), PlaybackError>> {
        let result = self.pending_start.as_mut()?.now_or_never()?;
        self.pending_start = None;
        Some(result)
    }

    /// Stop playback if it is running
    pub fn stop_playback(&mut self) {
        self.pending_start = None;
        if self.playing {
            info!("Stopping playback on {}", self.backend.name());
            self.backend.stop();
            self.playing = false;
        }
    }

    pub fn is_muted(&self) -> bool {
        self.is_muted
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the call was ended by end-of-stream
    pub fn reached_end(&self) -> bool {
        self.reached_end
    }

    pub fn last_failure(&self) -> Option<&PlaybackError> {
        self.last_failure.as_ref()
    }

    pub fn source(&self) -> &MediaSource {
        &self.source
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn begin_playback(&mut self) {
        if self.playing {
            return;
        }

        self.set_muted(true);

        info!("Starting playback of {} on {}", self.source, self.backend.name());
        self.pending_start = Some(self.backend.play(&self.source));
        self.playing = true;
    }
}
