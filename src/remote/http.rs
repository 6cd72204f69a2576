use super::client::{RemoteServiceClient, VoiceSession};
use super::live::LiveVoiceSession;
use super::messages::{
    AspectRatio, ChatReply, GroundingRef, ImageQuality, ToolConfig, VideoJobHandle,
    VideoJobStatus, VoiceEvent,
};
use crate::config::RemoteConfig;
use crate::error::{HubError, Result};
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::info;

// Model routing. Maps grounding forces the lighter chat model; image quality
// above 1K requires the pro image model.
const CHAT_MODEL_PRO: &str = "gemini-3-pro-preview";
const CHAT_MODEL_LITE: &str = "gemini-2.5-flash-lite-latest";
const IMAGE_MODEL_FLASH: &str = "gemini-2.5-flash-image";
const IMAGE_MODEL_PRO: &str = "gemini-3-pro-image-preview";
const ENHANCE_MODEL: &str = "gemini-3-flash-preview";
const VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";
const TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
const VOICE_MODEL: &str = "gemini-2.5-flash-native-audio-preview-12-2025";

/// REST implementation of the remote service boundary.
pub struct HttpRemoteClient {
    http: reqwest::Client,
    base_url: String,
    voice_url: String,
    api_key: String,
}

impl HttpRemoteClient {
    pub fn new(config: &RemoteConfig, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            voice_url: config.voice_url.clone(),
            api_key,
        }
    }

    fn model_url(&self, model: &str, action: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}?key={}",
            self.base_url, model, action, self.api_key
        )
    }

    async fn generate_content(
        &self,
        model: &str,
        body: serde_json::Value,
    ) -> Result<GenerateContentResponse> {
        let url = self.model_url(model, "generateContent");

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| HubError::RemoteService(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(HubError::RemoteService(format!(
                "{} returned {}: {}",
                model, status, detail
            )));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| HubError::RemoteService(e.to_string()))
    }
}

#[async_trait::async_trait]
impl RemoteServiceClient for HttpRemoteClient {
    async fn chat_complete(
        &self,
        message: &str,
        tools: ToolConfig,
        thinking_budget: Option<u32>,
    ) -> Result<ChatReply> {
        let model = if tools.maps {
            CHAT_MODEL_LITE
        } else {
            CHAT_MODEL_PRO
        };

        let mut tool_list = Vec::new();
        if tools.search {
            tool_list.push(json!({ "googleSearch": {} }));
        }
        if tools.maps {
            tool_list.push(json!({ "googleMaps": {} }));
        }

        let mut config = json!({ "tools": tool_list });
        if let Some(budget) = thinking_budget {
            config["thinkingConfig"] = json!({ "thinkingBudget": budget });
        }

        let body = json!({
            "contents": [{ "parts": [{ "text": message }] }],
            "config": config,
        });

        let response = self.generate_content(model, body).await?;
        let text = response
            .first_text()
            .ok_or_else(|| HubError::RemoteService("chat reply carried no text".to_string()))?;

        Ok(ChatReply {
            text,
            grounding: response.grounding_refs(),
        })
    }

    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        quality: ImageQuality,
    ) -> Result<Vec<u8>> {
        let model = if quality == ImageQuality::OneK {
            IMAGE_MODEL_FLASH
        } else {
            IMAGE_MODEL_PRO
        };

        let mut image_config = json!({ "aspectRatio": aspect_ratio.as_str() });
        if model == IMAGE_MODEL_PRO {
            image_config["imageSize"] = json!(quality.as_str());
        }

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "config": { "imageConfig": image_config },
        });

        let response = self.generate_content(model, body).await?;
        response
            .first_inline_data()
            .ok_or_else(|| HubError::RemoteService("no image data generated".to_string()))
    }

    async fn edit_image(
        &self,
        image: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> Result<Vec<u8>> {
        let data = base64::engine::general_purpose::STANDARD.encode(image);

        let body = json!({
            "contents": [{ "parts": [
                { "inlineData": { "data": data, "mimeType": mime_type } },
                { "text": instruction },
            ]}],
        });

        let response = self.generate_content(IMAGE_MODEL_FLASH, body).await?;
        response
            .first_inline_data()
            .ok_or_else(|| HubError::RemoteService("could not edit image".to_string()))
    }

    async fn analyze(&self, media: &[u8], mime_type: &str, instruction: &str) -> Result<String> {
        let data = base64::engine::general_purpose::STANDARD.encode(media);

        let body = json!({
            "contents": [{ "parts": [
                { "inlineData": { "data": data, "mimeType": mime_type } },
                { "text": instruction },
            ]}],
        });

        let response = self.generate_content(CHAT_MODEL_PRO, body).await?;
        response
            .first_text()
            .ok_or_else(|| HubError::RemoteService("analysis returned no text".to_string()))
    }

    async fn enhance_prompt(&self, prompt: &str) -> Result<String> {
        let instruction = format!(
            "Enhance the following image generation prompt to be more descriptive \
             and artistic, while keeping the original intent. Only return the \
             enhanced prompt text: \"{}\"",
            prompt
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": instruction }] }],
        });

        let response = self.generate_content(ENHANCE_MODEL, body).await?;

        // Fall back to the caller's prompt when the model returns nothing
        Ok(response.first_text().unwrap_or_else(|| prompt.to_string()))
    }

    async fn submit_video_job(
        &self,
        prompt: &str,
        seed_image: Option<&[u8]>,
        aspect_ratio: AspectRatio,
    ) -> Result<VideoJobHandle> {
        let mut body = json!({
            "prompt": prompt,
            "config": {
                "numberOfVideos": 1,
                "resolution": "720p",
                "aspectRatio": aspect_ratio.as_str(),
            },
        });

        if let Some(image) = seed_image {
            body["image"] = json!({
                "imageBytes": base64::engine::general_purpose::STANDARD.encode(image),
                "mimeType": "image/png",
            });
        }

        let url = self.model_url(VIDEO_MODEL, "predictLongRunning");

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| HubError::RemoteService(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(HubError::RemoteService(format!(
                "video submission returned {}: {}",
                status, detail
            )));
        }

        let operation: OperationResponse = response
            .json()
            .await
            .map_err(|e| HubError::RemoteService(e.to_string()))?;

        let handle = VideoJobHandle {
            operation: operation
                .name
                .ok_or_else(|| HubError::RemoteService("no operation name returned".to_string()))?,
        };

        info!("Submitted video job: {}", handle.operation);

        Ok(handle)
    }

    async fn poll_video_job(&self, job: &VideoJobHandle) -> Result<VideoJobStatus> {
        let url = format!(
            "{}/v1beta/{}?key={}",
            self.base_url, job.operation, self.api_key
        );

        let operation: OperationResponse = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| HubError::RemoteService(e.to_string()))?
            .json()
            .await
            .map_err(|e| HubError::RemoteService(e.to_string()))?;

        Ok(VideoJobStatus {
            done: operation.done.unwrap_or(false),
            video_uri: operation.first_video_uri(),
        })
    }

    async fn fetch_video(&self, uri: &str) -> Result<Vec<u8>> {
        let url = format!("{}&key={}", uri, self.api_key);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| HubError::RemoteService(e.to_string()))?;

        if !response.status().is_success() {
            return Err(HubError::RemoteService(format!(
                "video download returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| HubError::RemoteService(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn open_voice_session(
        &self,
    ) -> Result<(Box<dyn VoiceSession>, mpsc::Receiver<VoiceEvent>)> {
        let (session, events) =
            LiveVoiceSession::connect(&self.voice_url, &self.api_key, VOICE_MODEL).await?;
        Ok((Box::new(session), events))
    }

    async fn synthesize_speech(&self, text: &str) -> Result<Vec<u8>> {
        let body = json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "config": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": "Kore" } }
                },
            },
        });

        let response = self.generate_content(TTS_MODEL, body).await?;
        response
            .first_inline_data()
            .ok_or_else(|| HubError::RemoteService("no speech audio returned".to_string()))
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    grounding_chunks: Option<Vec<GroundingChunk>>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    title: Option<String>,
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    name: Option<String>,
    done: Option<bool>,
    response: Option<OperationResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResult {
    generated_videos: Option<Vec<GeneratedVideo>>,
}

#[derive(Debug, Deserialize)]
struct GeneratedVideo {
    video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
struct VideoRef {
    uri: Option<String>,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .iter()
            .flatten()
            .filter_map(|c| c.content.as_ref())
            .filter_map(|c| c.parts.as_ref())
            .flatten()
    }

    fn first_text(&self) -> Option<String> {
        self.parts()
            .filter_map(|p| p.text.clone())
            .find(|t| !t.is_empty())
    }

    /// Decode the first inline payload back to raw bytes; base64 stops here.
    fn first_inline_data(&self) -> Option<Vec<u8>> {
        let data = self.parts().filter_map(|p| p.inline_data.as_ref()).next()?;
        base64::engine::general_purpose::STANDARD
            .decode(&data.data)
            .ok()
    }

    fn grounding_refs(&self) -> Vec<GroundingRef> {
        self.candidates
            .iter()
            .flatten()
            .filter_map(|c| c.grounding_metadata.as_ref())
            .filter_map(|m| m.grounding_chunks.as_ref())
            .flatten()
            .filter_map(|chunk| chunk.web.as_ref())
            .map(|web| GroundingRef {
                title: web.title.clone(),
                uri: web.uri.clone(),
            })
            .collect()
    }
}

impl OperationResponse {
    fn first_video_uri(&self) -> Option<String> {
        self.response
            .as_ref()?
            .generated_videos
            .as_ref()?
            .first()?
            .video
            .as_ref()?
            .uri
            .clone()
    }
}
