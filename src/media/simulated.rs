// Simulated playback backend: no decoding, just a clock

use futures::future::{self, FutureExt};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::backend::{MediaSource, PlayFuture, PlaybackBackend, PlaybackError};
use crate::session::PlaybackNotifier;

/// Pretends to play a media resource for a fixed duration
///
/// Reports end-of-stream through the attached notifier once `duration` has
/// elapsed after `play`.
pub struct SimulatedPlayback {
    duration: Duration,
    muted: bool,
    notifier: Option<PlaybackNotifier>,
    task: Option<JoinHandle<()>>,
}

impl SimulatedPlayback {
    pub fn new(duration: Duration) -> Self {
        info!("Simulated playback initialized ({:.1}s)", duration.as_secs_f64());

        Self {
            duration,
            muted: true,
            notifier: None,
            task: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl PlaybackBackend for SimulatedPlayback {
    fn attach(&mut self, notifier: PlaybackNotifier) {
        self.notifier = Some(notifier);
    }

    fn play(&mut self, source: &MediaSource) -> PlayFuture {
        if self.task.is_some() {
            return rejected(PlaybackError::Backend("already playing".to_string()));
        }

        let Some(notifier) = self.notifier.clone() else {
            return rejected(PlaybackError::Backend(
                "no end-of-stream notifier attached".to_string(),
            ));
        };

        if source.as_str().is_empty() {
            return rejected(PlaybackError::Unsupported("empty source".to_string()));
        }

        let duration = self.duration;
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            debug!("Simulated media reached end-of-stream");
            notifier.ended();
        }));

        future::ready(Ok(())).boxed()
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Simulated playback stopped");
        }
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

fn rejected(error: PlaybackError) -> PlayFuture {
    future::ready(Err(error)).boxed()
}

impl Drop for SimulatedPlayback {
    fn drop(&mut self) {
        self.stop();
    }
}
