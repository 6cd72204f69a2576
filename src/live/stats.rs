use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of the live voice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No session; start is available
    Idle,
    /// Acquiring the capture device and opening the transport
    Starting,
    /// Streaming both directions
    Live,
}

/// Statistics about a live voice session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveStats {
    /// Current lifecycle state
    pub state: SessionState,

    /// When the session went live (None while idle)
    pub started_at: Option<DateTime<Utc>>,

    /// Capture frames sent over the session so far
    pub frames_sent: usize,

    /// Response fragments scheduled for playback so far
    pub fragments_scheduled: usize,

    /// Playback sources still scheduled or playing
    pub pending_playback: usize,
}
