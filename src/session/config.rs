use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::media::MediaSource;

/// Media played once the call connects
pub const DEFAULT_MEDIA_URL: &str = "https://console-typebot-minio.kjufc9.easypanel.host/api/v1/buckets/hot-mj/objects/download?preview=true&prefix=mis-chamada.mp4&version_id=null";

/// Configuration for a call session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallConfig {
    /// Unique session identifier (e.g., "call-5b0d...")
    pub session_id: String,

    /// How long the call stays in `Connecting`
    /// Default: 5500 ms
    pub connect_delay: Duration,

    /// Media resource played during the active phase
    pub media_source: MediaSource,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            session_id: format!("call-{}", uuid::Uuid::new_v4()),
            connect_delay: Duration::from_millis(5500),
            media_source: MediaSource::new(DEFAULT_MEDIA_URL),
        }
    }
}
