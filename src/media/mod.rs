pub mod adapter;
pub mod backend;
pub mod simulated;

pub use adapter::MediaPlaybackAdapter;
pub use backend::{MediaSource, PlayFuture, PlaybackBackend, PlaybackError};
pub use simulated::SimulatedPlayback;
