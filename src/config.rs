use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::media::MediaSource;
use crate::session::{CallConfig, DEFAULT_MEDIA_URL};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub call: CallSettings,
    #[serde(default)]
    pub playback: PlaybackSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CallSettings {
    pub connect_delay_ms: u64,
    pub media_url: String,
}

impl Default for CallSettings {
    fn default() -> Self {
        Self {
            connect_delay_ms: 5500,
            media_url: DEFAULT_MEDIA_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Length of the simulated media
    pub duration_secs: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self { duration_secs: 30 }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()
            .with_context(|| format!("Failed to read config {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid call-screen configuration")
    }

    /// Session configuration with a fresh session ID
    pub fn call_config(&self) -> CallConfig {
        CallConfig {
            connect_delay: Duration::from_millis(self.call.connect_delay_ms),
            media_source: MediaSource::new(self.call.media_url.clone()),
            ..CallConfig::default()
        }
    }

    pub fn playback_duration(&self) -> Duration {
        Duration::from_secs(self.playback.duration_secs)
    }
}

