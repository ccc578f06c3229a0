use super::config::CallConfig;
use super::controls::{ControlPanel, ControlState};
use super::events::{CallEvent, CallHandle, PlaybackNotifier};
use super::phase::{CallPhase, PhaseController};
use super::stats::{CallStats, EndReason};
use crate::media::{MediaPlaybackAdapter, PlaybackBackend};
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// A simulated video call: phase controller, playback binding and controls
/// driven by one event inbox.
///
/// Events come from three sources: the connecting timer, the playback backend
/// and user actions. Each is handled to completion before the next is taken,
/// so no state is shared across tasks.
pub struct CallSession<B: PlaybackBackend> {
    /// Session configuration
    config: CallConfig,

    /// When the session was created
    started_at: DateTime<Utc>,

    /// Phase and connecting timer
    controller: PhaseController,

    /// Playback binding
    media: MediaPlaybackAdapter<B>,

    /// Local control flags
    controls: ControlState,

    /// Sender side of the inbox, cloned into handles and the notifier
    inbox_tx: mpsc::UnboundedSender<CallEvent>,

    /// Playback and user events
    inbox: mpsc::UnboundedReceiver<CallEvent>,

    /// Whether teardown already ran
    torn_down: bool,
}

impl<B: PlaybackBackend> CallSession<B> {
    /// Create a new call session in `Connecting`
    pub fn new(config: CallConfig, backend: B) -> Self {
        info!("Creating call session: {}", config.session_id);

        let (inbox_tx, inbox) = mpsc::unbounded_channel();
        let controller = PhaseController::new(config.connect_delay);

        // The adapter subscribes here, before start() can arm the timer
        let media = MediaPlaybackAdapter::new(
            backend,
            config.media_source.clone(),
            controller.subscribe(),
            PlaybackNotifier::new(inbox_tx.clone()),
        );

        Self {
            config,
            started_at: Utc::now(),
            controller,
            media,
            controls: ControlState::default(),
            inbox_tx,
            inbox,
            torn_down: false,
        }
    }

    /// Arm the connecting timer. Must be called from within a Tokio runtime.
    pub fn start(&mut self) {
        info!("Starting call session: {}", self.config.session_id);
        self.controller.start();
    }

    /// Handle for dispatching user actions from another task
    pub fn handle(&self) -> CallHandle {
        CallHandle::new(self.inbox_tx.clone())
    }

    /// Subscribe to phase changes
    pub fn subscribe(&self) -> watch::Receiver<CallPhase> {
        self.controller.subscribe()
    }

    /// Control panel bound to this session
    pub fn controls(&mut self) -> ControlPanel<'_, B> {
        ControlPanel::new(&mut self.controller, &mut self.media, &mut self.controls)
    }

    /// Handle one event to completion
    pub fn dispatch(&mut self, event: CallEvent) {
        debug!("Dispatching {:?}", event);

        match event {
            CallEvent::ConnectTimerElapsed => {
                self.controller.on_timer_expired();
            }
            CallEvent::PlaybackEnded => {
                self.media.on_playback_ended(&mut self.controller);
            }
            CallEvent::PlaybackRejected(error) => {
                self.media.on_playback_rejected(error);
            }
            CallEvent::Control(action) => {
                self.controls().apply(action);
            }
        }

        self.media.sync_phase();
    }

    /// Wait for the next event from any source
    pub async fn next_event(&mut self) -> CallEvent {
        loop {
            tokio::select! {
                biased;

                Some(event) = self.inbox.recv() => return event,

                () = self.controller.timer_elapsed() => return CallEvent::ConnectTimerElapsed,

                result = self.media.start_settled() => match result {
                    Ok(()) => info!("Playback started"),
                    Err(error) => return CallEvent::PlaybackRejected(error),
                },
            }
        }
    }

    /// Wait for the next event and handle it
    pub async fn step(&mut self) -> CallEvent {
        let event = self.next_event().await;
        self.dispatch(event.clone());
        event
    }

    /// Handle every event that is ready now, without waiting.
    ///
    /// Returns the number of events handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;

        loop {
            let event = if let Ok(event) = self.inbox.try_recv() {
                event
            } else if self.controller.is_timer_due() {
                CallEvent::ConnectTimerElapsed
            } else if let Some(result) = self.media.poll_start_settled() {
                match result {
                    Ok(()) => {
                        info!("Playback started");
                        continue;
                    }
                    Err(error) => CallEvent::PlaybackRejected(error),
                }
            } else {
                break;
            };

            self.dispatch(event);
            handled += 1;
        }

        handled
    }

    /// Drive the call until it ends, then tear it down
    pub async fn run(mut self) -> CallStats {
        if !self.controller.is_started() {
            self.start();
        }

        while !self.phase().is_terminal() {
            self.step().await;
        }

        self.teardown();
        self.stats()
    }

    /// Cancel the connecting timer and stop playback
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        self.controller.teardown();
        self.media.stop_playback();

        info!("Call session torn down: {}", self.config.session_id);
    }

    /// Current phase
    pub fn phase(&self) -> CallPhase {
        self.controller.phase()
    }

    pub fn is_muted(&self) -> bool {
        self.media.is_muted()
    }

    pub fn is_mic_on(&self) -> bool {
        self.controls.is_mic_on
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    pub fn controller(&self) -> &PhaseController {
        &self.controller
    }

    pub fn media(&self) -> &MediaPlaybackAdapter<B> {
        &self.media
    }

    /// Snapshot of the session
    pub fn stats(&self) -> CallStats {
        let history = self.controller.history();
        let entered = |phase: CallPhase| {
            history
                .iter()
                .find(|transition| transition.to == phase)
                .map(|transition| transition.at)
        };

        let end_reason = self.phase().is_terminal().then(|| {
            if self.media.reached_end() {
                EndReason::PlaybackFinished
            } else {
                EndReason::HungUp
            }
        });

        CallStats {
            session_id: self.config.session_id.clone(),
            phase: self.phase(),
            is_muted: self.media.is_muted(),
            is_mic_on: self.controls.is_mic_on,
            started_at: self.started_at,
            connected_at: entered(CallPhase::Active),
            ended_at: entered(CallPhase::Ended),
            end_reason,
            transitions: history.to_vec(),
            mute_toggles: self.controls.mute_toggles,
            mic_toggles: self.controls.mic_toggles,
            playback_failure: self.media.last_failure().cloned(),
        }
    }
}

impl<B: PlaybackBackend> Drop for CallSession<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}
