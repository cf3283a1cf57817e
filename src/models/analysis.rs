//! Per-request analysis types. Nothing here is persisted; results live only
//! in the response (the client caches them for CSV export).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Operating mode of the analysis step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Structured fields: title, keywords, description, category
    Meta,
    /// Free-form descriptive prose
    Prompt,
}

impl AnalysisMode {
    /// Parse the form field value; anything other than "prompt" means meta,
    /// matching the dashboard's default.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("prompt") {
            AnalysisMode::Prompt
        } else {
            AnalysisMode::Meta
        }
    }
}

/// Structural constraints for the generated metadata, with the dashboard's
/// defaults when a form field is absent.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub mode: AnalysisMode,
    pub locale: String,
    pub min_title_words: u32,
    pub max_title_words: u32,
    pub min_keywords: u32,
    pub max_keywords: u32,
    pub min_desc_words: u32,
    pub max_desc_words: u32,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::Meta,
            locale: "en".to_string(),
            min_title_words: 6,
            max_title_words: 18,
            min_keywords: 43,
            max_keywords: 48,
            min_desc_words: 12,
            max_desc_words: 30,
        }
    }
}

/// Structured fields extracted from the model's response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub title: String,
    pub keywords: Vec<String>,
    pub description: String,
    pub category: Vec<String>,
}

/// One analyzed file, as returned to the caller.
///
/// Serialized camelCase on the wire, and lenient on deserialization, so a
/// client can post rows from an analysis response straight back to the CSV
/// export endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub filename: String,
    #[serde(default)]
    pub mime_type: String,
    /// Hex SHA-256 of the uploaded bytes; stable retry/diagnostic key
    #[serde(default)]
    pub content_sha256: String,
    /// Present in meta mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ImageMetadata>,
    /// Present in prompt mode; in meta mode a short derived prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Unparsed model output, retained for diagnostics
    #[serde(default)]
    pub raw_response: String,
}

/// Hex SHA-256 of uploaded file content.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
