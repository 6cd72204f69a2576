use crate::remote::GroundingRef;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Content of one completed operation. Immutable once created.
#[derive(Debug, Clone)]
pub enum ResultPayload {
    Text(String),
    /// Encoded image bytes (as returned by the service)
    Image(Vec<u8>),
    /// Encoded video bytes
    Video(Vec<u8>),
}

impl ResultPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            ResultPayload::Text(_) => "text",
            ResultPayload::Image(_) => "image",
            ResultPayload::Video(_) => "video",
        }
    }
}

/// One entry in the result log.
#[derive(Debug, Clone)]
pub struct ResultEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub payload: ResultPayload,
    /// Sources backing a grounded chat reply (empty otherwise)
    pub grounding: Vec<GroundingRef>,
}

impl ResultEntry {
    pub fn new(payload: ResultPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            payload,
            grounding: Vec::new(),
        }
    }

    pub fn with_grounding(mut self, grounding: Vec<GroundingRef>) -> Self {
        self.grounding = grounding;
        self
    }
}

/// Append-only result log, most-recent-first.
///
/// Entries land in completion order, never partially: a failed operation
/// appends nothing. Truncation/clearing is a host-level action outside this
/// core.
#[derive(Clone)]
pub struct ResultLog {
    entries: Arc<Mutex<Vec<ResultEntry>>>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Prepend a completed result.
    pub async fn push(&self, entry: ResultEntry) {
        let mut entries = self.entries.lock().await;
        entries.insert(0, entry);
    }

    /// Snapshot of the log, most recent first.
    pub async fn snapshot(&self) -> Vec<ResultEntry> {
        let entries = self.entries.lock().await;
        entries.clone()
    }

    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ResultLog {
    fn default() -> Self {
        Self::new()
    }
}
