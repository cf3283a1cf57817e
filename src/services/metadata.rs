// SPDX-License-Identifier: MIT

//! Labeled-line metadata extraction.
//!
//! The model is asked for `Title:` / `Keywords:` / `Description:` /
//! `Category:` lines, but its formatting drifts; parsing is tolerant and a
//! missing label yields a placeholder instead of failing the request.
//! Everything here is pure and deterministic.

use crate::models::ImageMetadata;
use regex::Regex;
use std::sync::LazyLock;

pub const NO_TITLE: &str = "No title available";
pub const NO_KEYWORDS: &str = "No keywords available";
pub const NO_DESCRIPTION: &str = "No description available";
pub const NO_CATEGORY: &str = "Uncategorized";

// Title stops at the end of its line; keywords run until the next label
// (they often span several lines); description until Category or the end;
// category to the end of the text.
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Title:\s*(.+)").expect("title regex"));
static KEYWORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Keywords:\s*([\s\S]+?)\n(?:Description:|Category:)").expect("keywords regex")
});
static DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Description:\s*([\s\S]+?)(?:\nCategory:|\n?$)").expect("description regex")
});
static CATEGORY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Category:\s*([\s\S]+)").expect("category regex"));
static LIST_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\n•-]").expect("list split regex"));

/// Parse the model's free-form response into structured fields.
///
/// `max_keywords`, when set, truncates the keyword list after splitting.
pub fn extract_metadata(text: &str, max_keywords: Option<usize>) -> ImageMetadata {
    let title = TITLE_RE
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let mut keywords = KEYWORDS_RE
        .captures(text)
        .map(|c| split_list(&c[1]))
        .unwrap_or_default();
    if let Some(max) = max_keywords {
        keywords.truncate(max);
    }
    if keywords.is_empty() {
        keywords = vec![NO_KEYWORDS.to_string()];
    }

    let description = DESCRIPTION_RE
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    let mut category = CATEGORY_RE
        .captures(text)
        .map(|c| split_list(&c[1]))
        .unwrap_or_default();
    if category.is_empty() {
        category = vec![NO_CATEGORY.to_string()];
    }

    ImageMetadata {
        title,
        keywords,
        description,
        category,
    }
}

/// Split a comma/newline/bullet/hyphen separated list, dropping empties.
fn split_list(raw: &str) -> Vec<String> {
    LIST_SPLIT_RE
        .split(raw)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Short derived prompt shown alongside metadata in meta mode.
pub fn derive_prompt(metadata: &ImageMetadata) -> String {
    let keywords: Vec<&str> = metadata
        .keywords
        .iter()
        .take(3)
        .map(String::as_str)
        .collect();
    format!(
        "Image about \"{}\" with keywords: {}.",
        metadata.title,
        keywords.join(", ")
    )
}
