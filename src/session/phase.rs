use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, Sleep};
use tracing::{debug, info, warn};

use super::stats::PhaseTransition;

/// Phase of a call session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallPhase {
    /// Waiting for the connecting delay to elapse
    Connecting,
    /// Call in progress, media playing
    Active,
    /// Terminal
    Ended,
}

impl CallPhase {
    /// Whether `self -> next` is a legal transition.
    ///
    /// Phases only move forward: Connecting -> Active -> Ended, with
    /// Connecting -> Ended as a shortcut.
    pub fn can_transition_to(self, next: CallPhase) -> bool {
        matches!(
            (self, next),
            (CallPhase::Connecting, CallPhase::Active)
                | (CallPhase::Connecting, CallPhase::Ended)
                | (CallPhase::Active, CallPhase::Ended)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == CallPhase::Ended
    }
}

impl fmt::Display for CallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallPhase::Connecting => "connecting",
            CallPhase::Active => "active",
            CallPhase::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// Single source of truth for the call phase.
///
/// Owns the one-shot connecting timer. Dependents observe the phase through
/// [`PhaseController::subscribe`].
pub struct PhaseController {
    /// Current phase, broadcast to subscribers
    phase: watch::Sender<CallPhase>,

    /// How long to stay in `Connecting`
    connect_delay: Duration,

    /// Pending connecting timer; dropping it cancels it
    timer: Option<Pin<Box<Sleep>>>,

    /// Whether `start` has been called
    started: bool,

    /// Every transition that actually happened, in order
    history: Vec<PhaseTransition>,
}

impl PhaseController {
    pub fn new(connect_delay: Duration) -> Self {
        let (phase, _) = watch::channel(CallPhase::Connecting);

        Self {
            phase,
            connect_delay,
            timer: None,
            started: false,
            history: Vec::new(),
        }
    }

    /// Enter `Connecting` and arm the connecting timer.
    ///
    /// Must be called from within a Tokio runtime. A second call is ignored.
    pub fn start(&mut self) {
        if self.started {
            warn!("Phase controller already started");
            return;
        }
        self.started = true;

        if self.phase() != CallPhase::Connecting {
            // Ended before it started; nothing left to wait for
            debug!("Not arming connect timer: phase is {}", self.phase());
            return;
        }

        info!("Connecting (delay {}ms)", self.connect_delay.as_millis());
        self.timer = Some(Box::pin(tokio::time::sleep(self.connect_delay)));
    }

    /// Handle expiry of the connecting timer
    pub fn on_timer_expired(&mut self) -> Option<PhaseTransition> {
        self.timer = None;

        if self.phase() != CallPhase::Connecting {
            debug!("Connect timer fired in phase {}; ignoring", self.phase());
            return None;
        }

        self.set_phase(CallPhase::Active)
    }

    /// Move to `Ended`. Idempotent.
    pub fn transition_to_ended(&mut self) -> Option<PhaseTransition> {
        if self.phase().is_terminal() {
            debug!("Call already ended");
            return None;
        }

        self.set_phase(CallPhase::Ended)
    }

    /// Cancel the pending timer, if any
    pub fn teardown(&mut self) {
        if self.timer.take().is_some() {
            debug!("Connect timer cancelled");
        }
    }

    /// Current phase
    pub fn phase(&self) -> CallPhase {
        *self.phase.borrow()
    }

    /// Subscribe to phase changes
    pub fn subscribe(&self) -> watch::Receiver<CallPhase> {
        self.phase.subscribe()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn connect_delay(&self) -> Duration {
        self.connect_delay
    }

    pub fn is_timer_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Whether the armed timer's deadline has passed
    pub fn is_timer_due(&self) -> bool {
        self.timer
            .as_ref()
            .is_some_and(|timer| timer.deadline() <= Instant::now())
    }

    /// Resolves when the armed timer elapses; pending forever if none is armed.
    ///
    /// Cancel safe: the timer stays armed if this future is dropped.
    pub async fn timer_elapsed(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => timer.as_mut().await,
            None => future::pending().await,
        }
    }

    /// Transitions recorded so far
    pub fn history(&self) -> &[PhaseTransition] {
        &self.history
    }

    fn set_phase(&mut self, next: CallPhase) -> Option<PhaseTransition> {
        let from = self.phase();
        if !from.can_transition_to(next) {
            warn!("Rejected phase transition {} -> {}", from, next);
            return None;
        }

        self.phase.send_replace(next);

        let transition = PhaseTransition {
            from,
            to: next,
            at: Utc::now(),
        };
        self.history.push(transition.clone());

        info!("Phase {} -> {}", from, next);

        Some(transition)
    }
}

impl fmt::Debug for PhaseController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseController")
            .field("phase", &self.phase())
            .field("connect_delay", &self.connect_delay)
            .field("timer_armed", &self.is_timer_armed())
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        use CallPhase::*;

        assert!(Connecting.can_transition_to(Active));
        assert!(Connecting.can_transition_to(Ended));
        assert!(Active.can_transition_to(Ended));

        assert!(!Active.can_transition_to(Connecting));
        assert!(!Ended.can_transition_to(Connecting));
        assert!(!Ended.can_transition_to(Active));
        assert!(!Ended.can_transition_to(Ended));
        assert!(!Connecting.can_transition_to(Connecting));
    }

    #[test]
    fn test_end_is_idempotent() {
        let mut controller = PhaseController::new(Duration::from_millis(5500));

        assert!(controller.transition_to_ended().is_some());
        assert!(controller.transition_to_ended().is_none());
        assert_eq!(controller.phase(), CallPhase::Ended);
        assert_eq!(controller.history().len(), 1);
    }

    #[test]
    fn test_timer_expiry_after_end_is_noop() {
        let mut controller = PhaseController::new(Duration::from_millis(5500));
        controller.transition_to_ended();

        assert!(controller.on_timer_expired().is_none());
        assert_eq!(controller.phase(), CallPhase::Ended);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_due_only_after_delay() {
        let mut controller = PhaseController::new(Duration::from_millis(5500));
        controller.start();

        assert!(controller.is_timer_armed());
        assert!(!controller.is_timer_due());

        tokio::time::advance(Duration::from_millis(5499)).await;
        assert!(!controller.is_timer_due());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(controller.is_timer_due());

        let transition = controller.on_timer_expired().unwrap();
        assert_eq!(transition.from, CallPhase::Connecting);
        assert_eq!(transition.to, CallPhase::Active);
        assert!(!controller.is_timer_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_does_not_rearm() {
        let mut controller = PhaseController::new(Duration::from_millis(1000));
        controller.start();

        tokio::time::advance(Duration::from_millis(600)).await;
        controller.start();

        tokio::time::advance(Duration::from_millis(400)).await;
        assert!(controller.is_timer_due());
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_timer() {
        let mut controller = PhaseController::new(Duration::from_millis(5500));
        controller.start();
        controller.teardown();

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(!controller.is_timer_due());
        assert_eq!(controller.phase(), CallPhase::Connecting);
    }

    #[test]
    fn test_subscriber_sees_latest_phase() {
        let mut controller = PhaseController::new(Duration::from_millis(5500));
        let mut rx = controller.subscribe();

        controller.transition_to_ended();

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), CallPhase::Ended);
    }
}
