use super::state::AppState;
use crate::error::HubError;
use crate::orchestrator::{Mode, Request, RequestOptions, ResultEntry, ResultPayload};
use crate::remote::{AspectRatio, GroundingRef, ImageQuality};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
    pub mode: Mode,

    /// May be empty if media is attached
    #[serde(default)]
    pub prompt: String,

    /// Attached media, base64-encoded (this boundary only; the core works
    /// with raw bytes)
    pub media: Option<String>,
    pub mime_type: Option<String>,

    #[serde(default)]
    pub search: bool,
    #[serde(default)]
    pub maps: bool,
    #[serde(default)]
    pub thinking: bool,
    pub aspect_ratio: Option<AspectRatio>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratePostBody {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub quality: ImageQuality,
}

#[derive(Debug, Deserialize)]
pub struct EnhanceBody {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct SpeechBody {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SpeechResponse {
    /// Raw PCM, base64-encoded for transport
    pub pcm: String,
    pub sample_rate: u32,
}

#[derive(Debug, Serialize)]
pub struct EnhanceResponse {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub result: ResultView,
    /// The host should clear the prompt input
    pub clear_input: bool,
}

#[derive(Debug, Serialize)]
pub struct LiveControlResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Wire view of a result log entry. Binary payloads cross this boundary
/// base64-encoded.
#[derive(Debug, Serialize)]
pub struct ResultView {
    pub id: String,
    pub kind: &'static str,
    pub created_at: DateTime<Utc>,
    pub text: Option<String>,
    pub data: Option<String>,
    pub grounding: Vec<GroundingRef>,
}

impl From<ResultEntry> for ResultView {
    fn from(entry: ResultEntry) -> Self {
        let kind = entry.payload.kind();
        let (text, data) = match entry.payload {
            ResultPayload::Text(text) => (Some(text), None),
            ResultPayload::Image(bytes) | ResultPayload::Video(bytes) => (
                None,
                Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
            ),
        };

        Self {
            id: entry.id.to_string(),
            kind,
            created_at: entry.created_at,
            text,
            data,
            grounding: entry.grounding,
        }
    }
}

fn error_response(err: &HubError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        HubError::Validation(_) | HubError::Precondition(_) => StatusCode::BAD_REQUEST,
        HubError::Permission(_) => StatusCode::FORBIDDEN,
        HubError::Cancelled => StatusCode::CONFLICT,
        HubError::RemoteService(_) | HubError::Transport(_) => StatusCode::BAD_GATEWAY,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.user_message(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /ai/submit
/// Dispatch one operation for the selected mode
pub async fn submit(
    State(state): State<AppState>,
    Json(body): Json<SubmitBody>,
) -> impl IntoResponse {
    let mut request = Request::new(body.mode, body.prompt);

    if let Some(media) = body.media {
        let bytes = match base64::engine::general_purpose::STANDARD.decode(&media) {
            Ok(bytes) => bytes,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "attached media is not valid base64".to_string(),
                    }),
                )
                    .into_response();
            }
        };
        let mime = body.mime_type.unwrap_or_else(|| "image/png".to_string());
        request = request.with_media(bytes, mime);
    }

    let mut options = RequestOptions {
        search: body.search,
        maps: body.maps,
        thinking: body.thinking,
        ..RequestOptions::default()
    };
    if let Some(aspect) = body.aspect_ratio {
        options.aspect_ratio = aspect;
    }
    request = request.with_options(options);

    match state.orchestrator.submit(request).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(SubmitResponse {
                result: outcome.entry.into(),
                clear_input: outcome.clear_input,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Submit failed: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// POST /ai/studio/generate
/// Generate a standalone image post
pub async fn generate_post(
    State(state): State<AppState>,
    Json(body): Json<GeneratePostBody>,
) -> impl IntoResponse {
    match state
        .orchestrator
        .generate_post(&body.prompt, body.aspect_ratio, body.quality)
        .await
    {
        Ok(entry) => (StatusCode::OK, Json(ResultView::from(entry))).into_response(),
        Err(e) => {
            error!("Image generation failed: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// POST /ai/studio/enhance
/// Rewrite an image prompt via the fast model
pub async fn enhance_prompt(
    State(state): State<AppState>,
    Json(body): Json<EnhanceBody>,
) -> impl IntoResponse {
    match state.orchestrator.enhance_prompt(&body.prompt).await {
        Ok(prompt) => (StatusCode::OK, Json(EnhanceResponse { prompt })).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// POST /ai/speech
/// Synthesize speech for a text result
pub async fn synthesize_speech(
    State(state): State<AppState>,
    Json(body): Json<SpeechBody>,
) -> impl IntoResponse {
    match state.orchestrator.speak(&body.text).await {
        Ok(pcm) => (
            StatusCode::OK,
            Json(SpeechResponse {
                pcm: base64::engine::general_purpose::STANDARD.encode(pcm),
                sample_rate: state.audio.playback_rate,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Speech synthesis failed: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// GET /ai/results
/// The result log, most recent first
pub async fn list_results(State(state): State<AppState>) -> impl IntoResponse {
    let results: Vec<ResultView> = state
        .orchestrator
        .results()
        .await
        .into_iter()
        .map(ResultView::from)
        .collect();

    (StatusCode::OK, Json(results)).into_response()
}

/// POST /live/start
/// Start the live voice session (restarts if one is active)
pub async fn start_live(State(state): State<AppState>) -> impl IntoResponse {
    info!("Starting live session via HTTP");

    match state.live.start().await {
        Ok(()) => (
            StatusCode::OK,
            Json(LiveControlResponse {
                status: "live".to_string(),
                message: "Live session started".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to start live session: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// POST /live/stop
/// Stop the live voice session (idempotent)
pub async fn stop_live(State(state): State<AppState>) -> impl IntoResponse {
    match state.live.stop().await {
        Ok(()) => (
            StatusCode::OK,
            Json(LiveControlResponse {
                status: "idle".to_string(),
                message: "Live session stopped".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to stop live session: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// GET /live/status
/// Current live session statistics
pub async fn live_status(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.live.stats().await)).into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
