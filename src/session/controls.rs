use tracing::{debug, info};

use super::events::ControlAction;
use super::phase::{CallPhase, PhaseController};
use super::stats::PhaseTransition;
use crate::media::{MediaPlaybackAdapter, PlaybackBackend};

/// Local UI state owned by the control panel
#[derive(Debug, Clone)]
pub struct ControlState {
    pub is_mic_on: bool,
    pub mute_toggles: usize,
    pub mic_toggles: usize,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            is_mic_on: true,
            mute_toggles: 0,
            mic_toggles: 0,
        }
    }
}

/// Translates user actions into state changes.
///
/// Borrowed from a `CallSession` for the duration of one action.
pub struct ControlPanel<'a, B: PlaybackBackend> {
    controller: &'a mut PhaseController,
    media: &'a mut MediaPlaybackAdapter<B>,
    state: &'a mut ControlState,
}

impl<'a, B: PlaybackBackend> ControlPanel<'a, B> {
    pub(crate) fn new(
        controller: &'a mut PhaseController,
        media: &'a mut MediaPlaybackAdapter<B>,
        state: &'a mut ControlState,
    ) -> Self {
        Self {
            controller,
            media,
            state,
        }
    }

    /// Run one action; returns the phase transition it caused, if any
    pub fn apply(&mut self, action: ControlAction) -> Option<PhaseTransition> {
        match action {
            ControlAction::ToggleMute => {
                self.toggle_mute();
                None
            }
            ControlAction::ToggleMic => {
                self.toggle_mic();
                None
            }
            ControlAction::EndCall => self.end_call(),
        }
    }

    /// Flip the playback mute flag.
    ///
    /// Only acts while the call is active; returns the new value if it did.
    pub fn toggle_mute(&mut self) -> Option<bool> {
        if self.controller.phase() != CallPhase::Active {
            debug!("Mute toggle ignored in phase {}", self.controller.phase());
            return None;
        }

        let muted = !self.media.is_muted();
        self.media.set_muted(muted);
        self.state.mute_toggles += 1;

        info!("Playback {}", if muted { "muted" } else { "unmuted" });
        Some(muted)
    }

    /// Flip the local microphone flag; returns the new value
    pub fn toggle_mic(&mut self) -> bool {
        self.state.is_mic_on = !self.state.is_mic_on;
        self.state.mic_toggles += 1;

        info!("Microphone {}", if self.state.is_mic_on { "on" } else { "off" });
        self.state.is_mic_on
    }

    /// Hang up. Valid in any phase; repeated calls have no effect.
    pub fn end_call(&mut self) -> Option<PhaseTransition> {
        let transition = self.controller.transition_to_ended();
        if transition.is_some() {
            info!("Call ended by user");
        }

        // Playback is stopped in the same step as the hang-up
        self.media.sync_phase();
        transition
    }
}
