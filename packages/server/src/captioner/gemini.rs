use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{CaptionError, Captioner, ImageCaption};
use crate::config::CaptionerConfig;

const PROMPT: &str = r#"
Analyse this image and generate a JSON object with the following properties:
{
title (maximum 32 characters): A short and pleasing title that summarizes the image
description (maximum 1000 characters): A detailed description including main subjects, setting, and any notable actions or objects.
an array of tags in lowercase that describe the image (max 12): ["tag1", "tag2", "tag3"]
}
Answer ONLY in JSON format.
"#;

/// Captioner backed by the Gemini `generateContent` REST API.
pub struct GeminiCaptioner {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiCaptioner {
    pub fn new(config: &CaptionerConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Models sometimes wrap the JSON in a markdown code block. Strip the
/// fences before parsing.
fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

fn parse_caption(raw: &str) -> Result<ImageCaption, CaptionError> {
    let cleaned = strip_fences(raw);
    serde_json::from_str(&cleaned)
        .map_err(|e| CaptionError::Malformed(format!("{e}; reply was: {}", truncate(&cleaned, 200))))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[async_trait]
impl Captioner for GeminiCaptioner {
    async fn caption(
        &self,
        image: &[u8],
        content_type: &str,
    ) -> Result<ImageCaption, CaptionError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = json!({
            "contents": [{
                "parts": [
                    { "text": PROMPT },
                    {
                        "inline_data": {
                            "mime_type": content_type,
                            "data": base64::engine::general_purpose::STANDARD.encode(image),
                        }
                    }
                ]
            }]
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| CaptionError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CaptionError::Request(format!(
                "HTTP {status}: {}",
                truncate(&detail, 200)
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| CaptionError::Malformed(e.to_string()))?;

        let text: String = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| CaptionError::Malformed("no candidates in reply".into()))?;

        debug!("Gemini reply: {}", truncate(&text, 200));
        parse_caption(&text)
    }
}
