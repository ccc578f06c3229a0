// Test double for the playback backend.
//
// Clones share state, so a test can keep one clone to inspect mute writes
// and to emit end-of-stream while the session owns the other.

#![allow(dead_code)]

use call_screen::{MediaSource, PlayFuture, PlaybackBackend, PlaybackError, PlaybackNotifier};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct FakeState {
    pub muted: bool,
    pub mute_writes: Vec<bool>,
    pub plays: Vec<String>,
    pub stops: usize,
    pub notifier: Option<PlaybackNotifier>,
}

#[derive(Clone)]
pub struct FakePlayback {
    state: Arc<Mutex<FakeState>>,
    reject: Option<(PlaybackError, Duration)>,
}

impl FakePlayback {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState::default())),
            reject: None,
        }
    }

    /// Backend whose play() fails after `delay`
    pub fn rejecting(error: PlaybackError, delay: Duration) -> Self {
        Self {
            reject: Some((error, delay)),
            ..Self::new()
        }
    }

    /// Emit end-of-stream
    pub fn finish(&self) {
        let notifier = self.state.lock().unwrap().notifier.clone();
        notifier.expect("notifier attached").ended();
    }

    pub fn muted(&self) -> bool {
        self.state.lock().unwrap().muted
    }

    pub fn mute_writes(&self) -> Vec<bool> {
        self.state.lock().unwrap().mute_writes.clone()
    }

    pub fn plays(&self) -> Vec<String> {
        self.state.lock().unwrap().plays.clone()
    }

    pub fn stops(&self) -> usize {
        self.state.lock().unwrap().stops
    }
}

impl PlaybackBackend for FakePlayback {
    fn attach(&mut self, notifier: PlaybackNotifier) {
        self.state.lock().unwrap().notifier = Some(notifier);
    }

    fn play(&mut self, source: &MediaSource) -> PlayFuture {
        self.state.lock().unwrap().plays.push(source.to_string());

        match self.reject.clone() {
            Some((error, delay)) => Box::pin(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Err::<(), _>(error)
            }),
            None => Box::pin(async { Ok::<(), PlaybackError>(()) }),
        }
    }

    fn set_muted(&mut self, muted: bool) {
        let mut state = self.state.lock().unwrap();
        state.muted = muted;
        state.mute_writes.push(muted);
    }

    fn is_muted(&self) -> bool {
        self.state.lock().unwrap().muted
    }

    fn stop(&mut self) {
        self.state.lock().unwrap().stops += 1;
    }

    fn name(&self) -> &str {
        "fake"
    }
}
