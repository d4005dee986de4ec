//! Hugging Face Inference API adapter.
//!
//! One adapter covers every HF-hosted task; the `ProviderTask` on the spec
//! picks the request body shape and the decoder.

use crate::prompts;
use crate::providers::{
    error_for_status, error_for_transport, parse_object_payload, Provider,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use mindmirror_common::{
    normalize_emotion_label, CapabilityRequest, Payload, ProviderError, ProviderSpec,
    ProviderTask,
};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Input length caps, matching what the hosted models tolerate.
const CLASSIFICATION_INPUT_CHARS: usize = 512;
const TTS_INPUT_CHARS: usize = 500;

pub struct HuggingFaceProvider {
    spec: ProviderSpec,
    client: reqwest::Client,
}

impl HuggingFaceProvider {
    pub fn new(spec: ProviderSpec) -> Self {
        let client = reqwest::Client::builder()
            .timeout(spec.call_timeout)
            .build()
            .unwrap_or_default();
        Self { spec, client }
    }

    fn request_body(&self, request: &CapabilityRequest) -> Result<Value, ProviderError> {
        let body = match self.spec.task {
            ProviderTask::TextClassification => json!({
                "inputs": head(&request.raw_input, CLASSIFICATION_INPUT_CHARS),
            }),
            ProviderTask::TextGeneration => json!({
                "inputs": prompts::build_reflection_prompt(request),
                "parameters": {
                    "max_new_tokens": 400,
                    "temperature": 0.7,
                    "return_full_text": false,
                },
            }),
            ProviderTask::TextToImage => json!({
                "inputs": prompts::build_art_prompt(
                    request.primary_emotion(),
                    &request.raw_input,
                ),
                "parameters": {"width": 512, "height": 512},
            }),
            ProviderTask::TextToSpeech => json!({
                "inputs": head(&request.raw_input, TTS_INPUT_CHARS),
            }),
            ProviderTask::AutomaticSpeechRecognition | ProviderTask::ChatCompletion => {
                return Err(ProviderError::Hard(format!(
                    "task {:?} does not use a JSON body on this adapter",
                    self.spec.task
                )))
            }
        };
        Ok(body)
    }

    fn decode_classification(&self, raw: &[u8]) -> Result<Payload, ProviderError> {
        let data: Value = serde_json::from_slice(raw)
            .map_err(|e| ProviderError::InvalidResponse(format!("bad JSON: {}", e)))?;

        // Shape: [[{"label": ..., "score": ...}, ...]]
        let predictions = data
            .get(0)
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                ProviderError::InvalidResponse("expected nested prediction list".to_string())
            })?;

        let mut emotions = Vec::new();
        let mut scores = serde_json::Map::new();
        for prediction in predictions.iter().take(3) {
            let label = prediction
                .get("label")
                .and_then(|l| l.as_str())
                .unwrap_or_default();
            if label.is_empty() {
                continue;
            }
            let label = normalize_emotion_label(label);
            let score = prediction.get("score").and_then(|s| s.as_f64()).unwrap_or(0.0);
            emotions.push(Value::String(label.clone()));
            scores.insert(label, json!(score));
        }

        let mut payload = Payload::new();
        payload.insert("emotions".to_string(), Value::Array(emotions));
        payload.insert("scores".to_string(), Value::Object(scores));
        Ok(payload)
    }

    fn decode_generation(&self, raw: &[u8]) -> Result<Payload, ProviderError> {
        let data: Value = serde_json::from_slice(raw)
            .map_err(|e| ProviderError::InvalidResponse(format!("bad JSON: {}", e)))?;

        // Shape: [{"generated_text": ...}] or {"generated_text": ...}
        let text = data
            .get(0)
            .and_then(|v| v.get("generated_text"))
            .or_else(|| data.get("generated_text"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ProviderError::InvalidResponse("no generated_text in response".to_string())
            })?;

        parse_object_payload(text)
    }

    fn decode_image(&self, raw: &[u8]) -> Result<Payload, ProviderError> {
        let format = sniff_image_format(raw).ok_or_else(|| {
            ProviderError::InvalidResponse("response is not a recognized image".to_string())
        })?;

        let mut payload = Payload::new();
        payload.insert("image".to_string(), json!(BASE64.encode(raw)));
        payload.insert("format".to_string(), json!(format));
        Ok(payload)
    }

    fn decode_transcription(&self, raw: &[u8]) -> Result<Payload, ProviderError> {
        let data: Value = serde_json::from_slice(raw)
            .map_err(|e| ProviderError::InvalidResponse(format!("bad JSON: {}", e)))?;
        let text = data
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(ProviderError::InvalidResponse(
                "empty transcription text".to_string(),
            ));
        }

        let mut payload = Payload::new();
        payload.insert("text".to_string(), json!(text));
        Ok(payload)
    }

    fn decode_audio(&self, raw: &[u8]) -> Result<Payload, ProviderError> {
        if raw.is_empty() {
            return Err(ProviderError::InvalidResponse("empty audio body".to_string()));
        }

        let mut payload = Payload::new();
        payload.insert("audio".to_string(), json!(BASE64.encode(raw)));
        payload.insert("format".to_string(), json!(sniff_audio_format(raw)));
        Ok(payload)
    }
}

#[async_trait]
impl Provider for HuggingFaceProvider {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    async fn call(
        &self,
        request: &CapabilityRequest,
        timeout: Duration,
    ) -> Result<Vec<u8>, ProviderError> {
        let mut builder = self.client.post(&self.spec.endpoint).timeout(timeout);
        if let Some(token) = &self.spec.api_token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let builder = if self.spec.task == ProviderTask::AutomaticSpeechRecognition {
            // Audio arrives base64-encoded in raw_input and is posted raw.
            let audio = BASE64.decode(request.raw_input.trim()).map_err(|e| {
                ProviderError::Hard(format!("input is not valid base64 audio: {}", e))
            })?;
            builder.body(audio)
        } else {
            builder.json(&self.request_body(request)?)
        };

        debug!(provider = %self.spec.id, "calling Hugging Face inference API");
        let response = builder.send().await.map_err(error_for_transport)?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(error_for_transport)?
            .to_vec();
        if !status.is_success() {
            return Err(error_for_status(status, &String::from_utf8_lossy(&bytes)));
        }
        Ok(bytes)
    }

    fn decode(&self, _request: &CapabilityRequest, raw: &[u8]) -> Result<Payload, ProviderError> {
        match self.spec.task {
            ProviderTask::TextClassification => self.decode_classification(raw),
            ProviderTask::TextGeneration | ProviderTask::ChatCompletion => {
                self.decode_generation(raw)
            }
            ProviderTask::TextToImage => self.decode_image(raw),
            ProviderTask::AutomaticSpeechRecognition => self.decode_transcription(raw),
            ProviderTask::TextToSpeech => self.decode_audio(raw),
        }
    }
}

fn head(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn sniff_image_format(raw: &[u8]) -> Option<&'static str> {
    if raw.starts_with(b"\x89PNG") {
        Some("png")
    } else if raw.starts_with(b"\xff\xd8") {
        Some("jpeg")
    } else if raw.starts_with(b"<svg") || raw.starts_with(b"<?xml") {
        Some("svg")
    } else {
        None
    }
}

fn sniff_audio_format(raw: &[u8]) -> &'static str {
    if raw.starts_with(b"RIFF") {
        "wav"
    } else if raw.starts_with(b"fLaC") {
        "flac"
    } else {
        "mp3"
    }
}
