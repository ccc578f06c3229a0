use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::phase::CallPhase;
use crate::media::PlaybackError;

/// Statistics about a call session
#[derive(Debug, Clone, Serialize)]
pub struct CallStats {
    /// Session identifier
    pub session_id: String,

    /// Phase at the time of the snapshot
    pub phase: CallPhase,

    /// Whether playback audio is muted
    pub is_muted: bool,

    /// Whether the local microphone flag is on
    pub is_mic_on: bool,

    /// When the session was created
    pub started_at: DateTime<Utc>,

    /// When the call became active, if it did
    pub connected_at: Option<DateTime<Utc>>,

    /// When the call ended, if it did
    pub ended_at: Option<DateTime<Utc>>,

    /// Why the call ended
    pub end_reason: Option<EndReason>,

    /// Every phase transition, in order
    pub transitions: Vec<PhaseTransition>,

    /// Number of effective mute toggles
    pub mute_toggles: usize,

    /// Number of mic toggles
    pub mic_toggles: usize,

    /// Last failed playback start, kept for diagnostics
    pub playback_failure: Option<PlaybackError>,
}

/// A single recorded phase change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: CallPhase,
    pub to: CallPhase,
    pub at: DateTime<Utc>,
}

/// What moved the call into `Ended`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The media reached end-of-stream
    PlaybackFinished,
    /// The user hung up
    HungUp,
}
