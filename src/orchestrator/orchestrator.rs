use super::log::{ResultEntry, ResultLog, ResultPayload};
use super::request::{Mode, Request, SubmitOutcome};
use crate::config::OrchestratorSettings;
use crate::error::{HubError, Result};
use crate::remote::{AspectRatio, ImageQuality, RemoteServiceClient};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{info, warn};

const DEFAULT_ANALYZE_INSTRUCTION: &str = "Analyze this content in detail.";
const DEFAULT_REMIX_INSTRUCTION: &str = "Apply a creative filter";

/// Dispatches one user-initiated operation per call to the remote service and
/// appends completed results to the log.
///
/// `submit` is safe to call concurrently (results land in completion order),
/// but the reference behavior is that the caller serializes submissions per
/// panel; the orchestrator does not coalesce or queue them.
pub struct Orchestrator {
    client: Arc<dyn RemoteServiceClient>,
    log: ResultLog,
    poll_interval: Duration,
    max_polls: Option<u32>,
    cancelled: Arc<AtomicBool>,
    cancel_notify: Arc<Notify>,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn RemoteServiceClient>, settings: &OrchestratorSettings) -> Self {
        Self {
            client,
            log: ResultLog::new(),
            poll_interval: Duration::from_secs(settings.poll_interval_secs),
            max_polls: settings.max_polls,
            cancelled: Arc::new(AtomicBool::new(false)),
            cancel_notify: Arc::new(Notify::new()),
        }
    }

    /// Override the poll interval (sub-second intervals for tests).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn log(&self) -> &ResultLog {
        &self.log
    }

    /// Snapshot of completed results, most recent first.
    pub async fn results(&self) -> Vec<ResultEntry> {
        self.log.snapshot().await
    }

    /// Signal teardown: any in-flight video poll loop stops at its next
    /// suspension point with `Cancelled`.
    pub fn shutdown(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.cancel_notify.notify_waiters();
    }

    /// Dispatch one operation for the selected mode.
    ///
    /// Exactly one result is appended to the log on success and zero on
    /// failure; validation and precondition errors are raised before any
    /// remote call.
    pub async fn submit(&self, request: Request) -> Result<SubmitOutcome> {
        if request.prompt.trim().is_empty() && request.media.is_none() {
            return Err(HubError::Validation(
                "enter a prompt or attach media".to_string(),
            ));
        }

        let outcome = match request.mode {
            Mode::Chat => self.run_chat(&request).await,
            Mode::Video => self.run_video(&request).await,
            Mode::Analyze => self.run_analyze(&request).await,
            Mode::Remix => self.run_remix(&request).await,
        };

        match &outcome {
            Ok(o) => info!("{:?} request completed: {}", request.mode, o.entry.id),
            Err(e) => warn!("{:?} request failed: {}", request.mode, e.user_message()),
        }

        outcome
    }

    async fn run_chat(&self, request: &Request) -> Result<SubmitOutcome> {
        let reply = self
            .client
            .chat_complete(
                &request.prompt,
                request.options.tools(),
                request.options.thinking_budget(),
            )
            .await?;

        let entry =
            ResultEntry::new(ResultPayload::Text(reply.text)).with_grounding(reply.grounding);
        self.log.push(entry.clone()).await;

        // Chat is the one mode that clears the prompt box on success
        Ok(SubmitOutcome {
            entry,
            clear_input: true,
        })
    }

    async fn run_video(&self, request: &Request) -> Result<SubmitOutcome> {
        let aspect = request.options.aspect_ratio;
        if !aspect.supports_video() {
            return Err(HubError::Validation(format!(
                "video generation supports 16:9 and 9:16, not {}",
                aspect.as_str()
            )));
        }

        let seed = request.media.as_ref().map(|m| m.bytes.as_slice());
        let job = self
            .client
            .submit_video_job(&request.prompt, seed, aspect)
            .await?;

        info!(
            "Video job {} submitted, polling every {:?}",
            job.operation, self.poll_interval
        );

        // Fixed-interval polling; only the poll is retried, never the
        // submission. The loop observes shutdown at every suspension point.
        let mut polls = 0u32;
        let uri = loop {
            if self.cancelled.load(Ordering::SeqCst) {
                return Err(HubError::Cancelled);
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = self.cancel_notify.notified() => return Err(HubError::Cancelled),
            }

            let status = self.client.poll_video_job(&job).await?;
            polls += 1;

            if status.done {
                break status.video_uri.ok_or_else(|| {
                    HubError::RemoteService(
                        "video job finished without a download uri".to_string(),
                    )
                })?;
            }

            if let Some(max) = self.max_polls {
                if polls >= max {
                    return Err(HubError::RemoteService(format!(
                        "video job {} did not finish after {} polls",
                        job.operation, polls
                    )));
                }
            }
        };

        info!("Video job done after {} polls, fetching {}", polls, uri);

        let bytes = self.client.fetch_video(&uri).await?;

        let entry = ResultEntry::new(ResultPayload::Video(bytes));
        self.log.push(entry.clone()).await;

        Ok(SubmitOutcome {
            entry,
            clear_input: false,
        })
    }

    async fn run_analyze(&self, request: &Request) -> Result<SubmitOutcome> {
        let media = request.media.as_ref().ok_or_else(|| {
            HubError::Precondition("upload an image or video to analyze".to_string())
        })?;

        let instruction = if request.prompt.trim().is_empty() {
            DEFAULT_ANALYZE_INSTRUCTION
        } else {
            &request.prompt
        };

        let text = self
            .client
            .analyze(&media.bytes, &media.mime_type, instruction)
            .await?;

        let entry = ResultEntry::new(ResultPayload::Text(text));
        self.log.push(entry.clone()).await;

        Ok(SubmitOutcome {
            entry,
            clear_input: false,
        })
    }

    async fn run_remix(&self, request: &Request) -> Result<SubmitOutcome> {
        let media = request
            .media
            .as_ref()
            .ok_or_else(|| HubError::Precondition("upload an image to remix".to_string()))?;

        let instruction = if request.prompt.trim().is_empty() {
            DEFAULT_REMIX_INSTRUCTION
        } else {
            &request.prompt
        };

        let image = self
            .client
            .edit_image(&media.bytes, &media.mime_type, instruction)
            .await?;

        let entry = ResultEntry::new(ResultPayload::Image(image));
        self.log.push(entry.clone()).await;

        Ok(SubmitOutcome {
            entry,
            clear_input: false,
        })
    }

    /// Generate a standalone image post (studio flow). Appends an image
    /// result to the log.
    pub async fn generate_post(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        quality: ImageQuality,
    ) -> Result<ResultEntry> {
        if prompt.trim().is_empty() {
            return Err(HubError::Validation("enter a prompt".to_string()));
        }

        let image = self
            .client
            .generate_image(prompt, aspect_ratio, quality)
            .await?;

        let entry = ResultEntry::new(ResultPayload::Image(image));
        self.log.push(entry.clone()).await;

        Ok(entry)
    }

    /// Rewrite a prompt via the fast model. Does not touch the log.
    pub async fn enhance_prompt(&self, prompt: &str) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(HubError::Validation("enter a prompt to enhance".to_string()));
        }

        self.client.enhance_prompt(prompt).await
    }

    /// Synthesize speech for a text result. Returns raw 24 kHz mono PCM
    /// bytes; does not touch the log.
    pub async fn speak(&self, text: &str) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(HubError::Validation("nothing to speak".to_string()));
        }

        self.client.synthesize_speech(text).await
    }
}
