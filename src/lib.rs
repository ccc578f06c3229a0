pub mod config;
pub mod media;
pub mod session;

pub use config::Config;
pub use media::{
    MediaPlaybackAdapter, MediaSource, PlayFuture, PlaybackBackend, PlaybackError,
    SimulatedPlayback,
};
pub use session::{
    CallConfig, CallEvent, CallHandle, CallPhase, CallSession, CallStats, ControlAction,
    ControlPanel, EndReason, PhaseController, PhaseTransition, PlaybackNotifier,
};
