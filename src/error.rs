use thiserror::Error;

/// Errors surfaced by the hub core.
///
/// Validation and precondition failures are detected before any remote call
/// and carry no side effects. Remote and transport failures leave prior state
/// intact; nothing is appended to the result log on any failure path.
#[derive(Debug, Error)]
pub enum HubError {
    /// Missing required input for the selected mode (no prompt and no media).
    #[error("invalid request: {0}")]
    Validation(String),

    /// The mode requires attached media that was not supplied.
    #[error("missing attached media: {0}")]
    Precondition(String),

    /// Microphone or audio device access was denied or is unavailable.
    #[error("audio device access denied: {0}")]
    Permission(String),

    /// The remote service call failed or returned no usable payload.
    #[error("remote service error: {0}")]
    RemoteService(String),

    /// A streaming session could not open or dropped unexpectedly.
    #[error("transport error: {0}")]
    Transport(String),

    /// The operation observed a teardown signal before completing.
    #[error("operation cancelled")]
    Cancelled,
}

impl HubError {
    /// Single user-visible message for a failed operation.
    ///
    /// Remote errors expose the service's own message when one exists,
    /// otherwise a generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            HubError::RemoteService(msg) | HubError::Transport(msg) if msg.is_empty() => {
                "The operation could not be completed.".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HubError>;
