// SPDX-License-Identifier: MIT

//! Gemini generative-content API client.
//!
//! One synchronous call per image: inline image bytes plus an instruction
//! that pins the exact labeled-line response format. No retries; a failed
//! call must never cost the user a credit, so settlement happens upstream
//! only after extraction succeeds.

use crate::error::AppError;
use crate::i18n::{localized, Message};
use crate::models::{AnalysisMode, AnalysisOptions};
use crate::services::convert::NormalizedImage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model,
        }
    }

    /// Override the endpoint (tests).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Analyze a normalized image and return the model's free-form text.
    ///
    /// Single attempt; any transport or provider error surfaces as
    /// `AnalysisFailed` with a message localized to the request's locale.
    pub async fn analyze(
        &self,
        image: &NormalizedImage,
        options: &AnalysisOptions,
    ) -> Result<String, AppError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": image.mime_type,
                            "data": STANDARD.encode(&image.bytes),
                        }
                    },
                    { "text": build_instruction(image.mime_type, options) }
                ]
            }]
        });

        let failed = |cause: String| {
            tracing::error!(model = %self.model, error = %cause, "Gemini call failed");
            AppError::AnalysisFailed(localized(&options.locale, Message::AnalysisFailed).to_string())
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(failed(format!("HTTP {}: {}", status, body)));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| failed(format!("Invalid response body: {}", e)))?;

        let text = parsed.text();
        if text.is_empty() {
            return Err(failed("Response contained no text parts".to_string()));
        }
        Ok(text)
    }
}

/// Build the instruction text for one analysis call.
pub fn build_instruction(mime_type: &str, options: &AnalysisOptions) -> String {
    match options.mode {
        AnalysisMode::Meta => format!(
            "Analyze this {mime} image and generate comprehensive stock metadata.\n\
             \n\
             Respond EXACTLY in this format:\n\
             Title: <title>\n\
             Keywords: <comma-separated keywords>\n\
             Description: <description>\n\
             Category: <comma-separated categories>\n\
             \n\
             Requirements:\n\
             - Title: {min_t}-{max_t} words\n\
             - Keywords: {min_k}-{max_k} items\n\
             - Description: {min_d}-{max_d} words\n\
             - Respond in language: {lang}\n\
             - Be accurate and descriptive",
            mime = mime_type,
            min_t = options.min_title_words,
            max_t = options.max_title_words,
            min_k = options.min_keywords,
            max_k = options.max_keywords,
            min_d = options.min_desc_words,
            max_d = options.max_desc_words,
            lang = options.locale,
        ),
        AnalysisMode::Prompt => format!(
            "Describe this {mime} image in vivid detail as a single generative \
             image prompt. Respond with free-form descriptive prose only, with \
             no labels, headings or lists. Respond in language: {lang}.",
            mime = mime_type,
            lang = options.locale,
        ),
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GenerateContentResponse {
    /// Concatenate the text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}
