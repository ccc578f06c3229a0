use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::PlaybackNotifier;

/// Location of the media resource played during the active phase.
///
/// Opaque to the call logic; only the backend interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaSource(String);

impl MediaSource {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a playback start did not succeed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
pub enum PlaybackError {
    /// Start was refused by the playback environment (e.g. autoplay policy)
    #[error("playback rejected: {0}")]
    Rejected(String),

    /// The backend cannot play this kind of source
    #[error("unsupported media source: {0}")]
    Unsupported(String),

    /// Any other backend failure
    #[error("playback backend error: {0}")]
    Backend(String),
}

/// Future returned by [`PlaybackBackend::play`]; resolves once playback has
/// actually started or was refused.
pub type PlayFuture = BoxFuture<'static, Result<(), PlaybackError>>;

/// Playback capability injected into the media adapter
///
/// Implementations:
/// - `SimulatedPlayback`: plays for a fixed duration, then reports end-of-stream
/// - Test doubles that record every mute write
pub trait PlaybackBackend: Send {
    /// Register the end-of-stream notifier.
    ///
    /// Called exactly once, before `play`.
    fn attach(&mut self, notifier: PlaybackNotifier);

    /// Begin playback of `source`.
    ///
    /// Must not block; failure is reported through the returned future.
    fn play(&mut self, source: &MediaSource) -> PlayFuture;

    /// Set the mute attribute of the playing resource
    fn set_muted(&mut self, muted: bool);

    /// Current mute attribute
    fn is_muted(&self) -> bool;

    /// Stop playback, if any. No end-of-stream is reported afterwards.
    fn stop(&mut self);

    /// Backend name for logging
    fn name(&self) -> &str;
}
