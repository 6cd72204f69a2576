//! Request orchestration
//!
//! This module dispatches user-initiated operations to the remote service:
//! - Per-mode validation (prompt/media requirements)
//! - Chat with tool grounding and extended-reasoning budgets
//! - Asynchronous video jobs (submit, fixed-interval polling, fetch)
//! - Media analysis and image remixing
//! - The append-only, most-recent-first result log

mod log;
mod orchestrator;
mod request;

pub use log::{ResultEntry, ResultLog, ResultPayload};
pub use orchestrator::Orchestrator;
pub use request::{
    MediaAttachment, Mode, Request, RequestOptions, SubmitOutcome, THINKING_BUDGET_LITE,
    THINKING_BUDGET_PRO,
};
