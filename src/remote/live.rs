use super::client::VoiceSession;
use super::messages::VoiceEvent;
use crate::error::{HubError, Result};
use base64::Engine;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{info, warn};

type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

const INPUT_MIME: &str = "audio/pcm;rate=16000";
const VOICE_NAME: &str = "Zephyr";

/// Websocket voice session against the live endpoint.
///
/// The read half runs on its own task and turns server messages into
/// `VoiceEvent`s; the write half lives behind a mutex so frames can be sent
/// from any task. Base64 encoding/decoding of PCM happens here and nowhere
/// else.
pub struct LiveVoiceSession {
    writer: Mutex<Option<WsWriter>>,
}

impl LiveVoiceSession {
    /// Connect, send the session setup, and start the reader task.
    pub async fn connect(
        url: &str,
        api_key: &str,
        model: &str,
    ) -> Result<(Self, mpsc::Receiver<VoiceEvent>)> {
        let endpoint = format!("{}?key={}", url, api_key);

        let (stream, _) = connect_async(&endpoint)
            .await
            .map_err(|e| HubError::Transport(format!("voice session failed to open: {}", e)))?;

        info!("Voice session connected");

        let (mut writer, mut reader) = stream.split();

        let setup = json!({
            "setup": {
                "model": format!("models/{}", model),
                "generationConfig": {
                    "responseModalities": ["AUDIO"],
                    "speechConfig": {
                        "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": VOICE_NAME } }
                    },
                },
            },
        });

        writer
            .send(Message::Text(setup.to_string()))
            .await
            .map_err(|e| HubError::Transport(format!("voice session setup failed: {}", e)))?;

        let (event_tx, event_rx) = mpsc::channel(64);

        tokio::spawn(async move {
            while let Some(message) = reader.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        for event in parse_server_message(text.as_bytes()) {
                            if event_tx.send(event).await.is_err() {
                                return;
                            }
                        }
                    }
                    Ok(Message::Binary(data)) => {
                        for event in parse_server_message(&data) {
                            if event_tx.send(event).await.is_err() {
                                return;
                            }
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Voice session read error: {}", e);
                        break;
                    }
                }
            }

            let _ = event_tx.send(VoiceEvent::Closed).await;
        });

        Ok((
            Self {
                writer: Mutex::new(Some(writer)),
            },
            event_rx,
        ))
    }
}

#[async_trait::async_trait]
impl VoiceSession for LiveVoiceSession {
    async fn send_frame(&self, pcm: &[u8]) -> Result<()> {
        let frame = json!({
            "realtimeInput": {
                "media": {
                    "data": base64::engine::general_purpose::STANDARD.encode(pcm),
                    "mimeType": INPUT_MIME,
                },
            },
        });

        let mut guard = self.writer.lock().await;
        let writer = guard
            .as_mut()
            .ok_or_else(|| HubError::Transport("voice session is closed".to_string()))?;

        writer
            .send(Message::Text(frame.to_string()))
            .await
            .map_err(|e| HubError::Transport(format!("voice session dropped: {}", e)))
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.writer.lock().await;
        if let Some(mut writer) = guard.take() {
            let _ = writer.send(Message::Close(None)).await;
            let _ = writer.close().await;
            info!("Voice session closed");
        }
        Ok(())
    }
}

/// Extract events from one server message. A message can carry audio and the
/// interrupted flag; the flag is emitted after the audio so a flush always
/// wins over fragments from the same message.
fn parse_server_message(payload: &[u8]) -> Vec<VoiceEvent> {
    let parsed: ServerMessage = match serde_json::from_slice(payload) {
        Ok(p) => p,
        Err(e) => {
            warn!("Failed to parse voice server message: {}", e);
            return Vec::new();
        }
    };

    let mut events = Vec::new();

    if let Some(content) = parsed.server_content {
        if let Some(turn) = content.model_turn {
            for part in turn.parts.unwrap_or_default() {
                if let Some(inline) = part.inline_data {
                    match base64::engine::general_purpose::STANDARD.decode(&inline.data) {
                        Ok(bytes) => events.push(VoiceEvent::AudioFragment(bytes)),
                        Err(e) => warn!("Failed to decode audio fragment: {}", e),
                    }
                }
            }
        }

        if content.interrupted.unwrap_or(false) {
            events.push(VoiceEvent::Interrupted);
        }
    }

    events
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerMessage {
    server_content: Option<ServerContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerContent {
    model_turn: Option<ModelTurn>,
    interrupted: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ModelTurn {
    parts: Option<Vec<TurnPart>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TurnPart {
    inline_data: Option<TurnInlineData>,
}

#[derive(Debug, Deserialize)]
struct TurnInlineData {
    data: String,
}
