use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use crate::media::PlaybackError;

/// A discrete user intent forwarded by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    ToggleMute,
    ToggleMic,
    EndCall,
}

/// Everything a call session reacts to.
///
/// Each event is handled to completion before the next one is taken.
#[derive(Debug, Clone, PartialEq)]
pub enum CallEvent {
    /// The connecting delay elapsed
    ConnectTimerElapsed,
    /// The playback backend reached end-of-stream
    PlaybackEnded,
    /// The playback start future resolved with an error
    PlaybackRejected(PlaybackError),
    /// User action dispatched from the presentation layer
    Control(ControlAction),
}

/// Cloneable handle for dispatching user actions into a session
#[derive(Debug, Clone)]
pub struct CallHandle {
    tx: mpsc::UnboundedSender<CallEvent>,
}

impl CallHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<CallEvent>) -> Self {
        Self { tx }
    }

    /// Queue an action. Returns `false` if the session is gone.
    pub fn dispatch(&self, action: ControlAction) -> bool {
        self.tx.send(CallEvent::Control(action)).is_ok()
    }

    pub fn toggle_mute(&self) -> bool {
        self.dispatch(ControlAction::ToggleMute)
    }

    pub fn toggle_mic(&self) -> bool {
        self.dispatch(ControlAction::ToggleMic)
    }

    pub fn end_call(&self) -> bool {
        self.dispatch(ControlAction::EndCall)
    }
}

/// End-of-stream notifier handed to a playback backend
#[derive(Debug, Clone)]
pub struct PlaybackNotifier {
    tx: mpsc::UnboundedSender<CallEvent>,
}

impl PlaybackNotifier {
    pub(crate) fn new(tx: mpsc::UnboundedSender<CallEvent>) -> Self {
        Self { tx }
    }

    /// Report that the media reached its end
    pub fn ended(&self) {
        if self.tx.send(CallEvent::PlaybackEnded).is_err() {
            debug!("End-of-stream dropped: session already disposed");
        }
    }
}
