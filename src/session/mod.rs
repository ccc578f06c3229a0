//! Call session management
//!
//! This module provides the `CallSession` abstraction that manages:
//! - The call phase (connecting, active, ended) and the connecting timer
//! - Binding media playback to the phase
//! - User controls (mute, microphone, hang up)
//! - Session statistics

mod config;
mod controls;
mod events;
mod phase;
mod session;
mod stats;

pub use config::{CallConfig, DEFAULT_MEDIA_URL};
pub use controls::{ControlPanel, ControlState};
pub use events::{CallEvent, CallHandle, ControlAction, PlaybackNotifier};
pub use phase::{CallPhase, PhaseController};
pub use session::CallSession;
pub use stats::{CallStats, EndReason, PhaseTransition};
