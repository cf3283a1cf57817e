// SPDX-License-Identifier: MIT

//! Image analysis endpoint: intake, AI invocation, extraction, settlement.
//!
//! Accepts one or more files per request. A batch is processed as a
//! bounded-concurrency set of independent operations; one file's failure
//! never aborts the rest, and a credit is deducted only after that file's
//! extraction succeeded.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::analysis::content_hash;
use crate::models::{AnalysisMode, AnalysisOptions, AnalysisResult};
use crate::services::metadata;
use crate::AppState;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use futures_util::{stream, StreamExt};
use serde::Serialize;
use std::sync::Arc;

/// Upper bound on simultaneous Gemini calls per request, to respect the
/// provider's rate limits.
const ANALYZE_CONCURRENCY: usize = 5;

/// Most files a single batch request may carry.
const MAX_BATCH_FILES: usize = 20;

pub fn routes(config: &Config) -> Router<Arc<AppState>> {
    // The multipart body may carry a whole batch; axum's 2 MB default is
    // replaced by a limit sized from the per-file ceiling.
    let body_limit = config
        .max_upload_bytes
        .saturating_mul(MAX_BATCH_FILES)
        .saturating_add(1024 * 1024);

    Router::new()
        .route("/analyze", post(analyze))
        .route("/formats", get(formats))
        .layer(DefaultBodyLimit::max(body_limit))
}

// ─── Capability Listing ──────────────────────────────────────

#[derive(Serialize)]
pub struct FormatsResponse {
    /// MIME types this deployment accepts
    pub accepted: Vec<&'static str>,
    pub svg_enabled: bool,
    pub eps_enabled: bool,
}

/// Which image categories are enabled. The dashboard checks this before
/// offering SVG/EPS upload.
async fn formats(State(state): State<Arc<AppState>>) -> Json<FormatsResponse> {
    use crate::services::ImageFormat;
    Json(FormatsResponse {
        accepted: state.converter.accepted_mime_types(),
        svg_enabled: state.converter.is_enabled(ImageFormat::Svg),
        eps_enabled: state.converter.is_enabled(ImageFormat::Eps),
    })
}

// ─── Analysis ────────────────────────────────────────────────

struct UploadedFile {
    filename: String,
    mime_type: String,
    bytes: Vec<u8>,
}

struct AnalyzeForm {
    files: Vec<UploadedFile>,
    uid: Option<String>,
    options: AnalysisOptions,
}

/// Pull files and parameters out of the multipart form, applying the
/// dashboard's defaults for absent fields.
async fn read_form(mut multipart: Multipart) -> Result<AnalyzeForm> {
    let mut form = AnalyzeForm {
        files: Vec::new(),
        uid: None,
        options: AnalysisOptions::default(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                if form.files.len() >= MAX_BATCH_FILES {
                    return Err(AppError::BadRequest(format!(
                        "Too many files; at most {} per request",
                        MAX_BATCH_FILES
                    )));
                }
                let filename = field
                    .file_name()
                    .unwrap_or("uploaded_file")
                    .to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("image/jpeg")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;
                form.files.push(UploadedFile {
                    filename,
                    mime_type,
                    bytes: bytes.to_vec(),
                });
            }
            "uid" => form.uid = read_text(field).await?,
            "locale" => {
                if let Some(locale) = read_text(field).await? {
                    form.options.locale = locale;
                }
            }
            "mode" => {
                if let Some(mode) = read_text(field).await? {
                    form.options.mode = AnalysisMode::parse(&mode);
                }
            }
            "minTitle" => read_number(field, &mut form.options.min_title_words).await?,
            "maxTitle" => read_number(field, &mut form.options.max_title_words).await?,
            "minKeywords" => read_number(field, &mut form.options.min_keywords).await?,
            "maxKeywords" => read_number(field, &mut form.options.max_keywords).await?,
            "minDesc" => read_number(field, &mut form.options.min_desc_words).await?,
            "maxDesc" => read_number(field, &mut form.options.max_desc_words).await?,
            // Unknown fields are ignored rather than rejected
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<Option<String>> {
    let text = field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed form field: {}", e)))?;
    let text = text.trim().to_string();
    Ok(if text.is_empty() { None } else { Some(text) })
}

async fn read_number(field: axum::extract::multipart::Field<'_>, target: &mut u32) -> Result<()> {
    if let Some(text) = read_text(field).await? {
        // Unparseable numbers keep the default, like the original form
        if let Ok(value) = text.parse() {
            *target = value;
        }
    }
    Ok(())
}

/// One file's outcome inside a batch response.
enum FileOutcome {
    Ok(AnalysisResult),
    Failed { filename: String, error: AppError },
}

/// Analyze uploaded images and settle credits.
async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    let form = read_form(multipart).await?;

    let uid = form
        .uid
        .ok_or_else(|| AppError::BadRequest("UID is required".to_string()))?;
    if form.files.is_empty() {
        return Err(AppError::BadRequest("No valid file uploaded".to_string()));
    }

    // Cheap pre-check so a zero-balance user never triggers converter or AI
    // work. The authoritative check is the transactional deduction below.
    let user = state
        .db
        .get_user(&uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", uid)))?;
    if (user.credits as usize) < form.files.len() {
        return Err(AppError::InsufficientCredits);
    }

    tracing::info!(
        uid,
        files = form.files.len(),
        mode = ?form.options.mode,
        locale = %form.options.locale,
        "Analyzing batch"
    );

    let single = form.files.len() == 1;
    let options = Arc::new(form.options);

    let outcomes: Vec<FileOutcome> = stream::iter(form.files)
        .map(|file| {
            let state = state.clone();
            let options = options.clone();
            let uid = uid.clone();
            async move {
                let filename = file.filename.clone();
                match process_file(&state, &uid, file, &options).await {
                    Ok(result) => FileOutcome::Ok(result),
                    Err(error) => {
                        tracing::warn!(uid, filename, error = %error, "File analysis failed");
                        FileOutcome::Failed { filename, error }
                    }
                }
            }
        })
        .buffer_unordered(ANALYZE_CONCURRENCY)
        .collect()
        .await;

    // Balance after settlement; per-file deductions raced, so re-read
    let credits = state
        .db
        .get_user(&uid)
        .await?
        .map(|u| u.credits)
        .unwrap_or(0);

    if single {
        // One file gets the flat response shape; a failure surfaces as the
        // plain error
        return match outcomes.into_iter().next() {
            Some(FileOutcome::Ok(result)) => Ok(Json(single_response(result, credits))),
            Some(FileOutcome::Failed { error, .. }) => Err(error),
            None => Err(AppError::Internal(anyhow::anyhow!(
                "no outcome produced for a single-file batch"
            ))),
        };
    }

    let results: Vec<serde_json::Value> = outcomes
        .into_iter()
        .map(|outcome| match outcome {
            FileOutcome::Ok(result) => {
                let mut value = single_response(result, 0);
                if let Some(object) = value.as_object_mut() {
                    object.remove("credits");
                }
                value
            }
            FileOutcome::Failed { filename, error } => serde_json::json!({
                "filename": filename,
                "error": error.status_code().as_u16(),
                "details": error.to_string(),
            }),
        })
        .collect();

    Ok(Json(serde_json::json!({
        "results": results,
        "credits": credits,
    })))
}

/// Intake → AI call → extraction → credit settlement for one file.
///
/// Order matters: the deduction runs only after extraction succeeded, so a
/// conversion or provider failure never costs a credit.
async fn process_file(
    state: &AppState,
    uid: &str,
    file: UploadedFile,
    options: &AnalysisOptions,
) -> Result<AnalysisResult> {
    let sha256 = content_hash(&file.bytes);
    tracing::debug!(
        uid,
        filename = %file.filename,
        mime_type = %file.mime_type,
        content_sha256 = %sha256,
        "Processing file"
    );

    let normalized = state
        .converter
        .normalize(&file.bytes, &file.mime_type, &options.locale)
        .await?;

    let raw_response = state.gemini.analyze(&normalized, options).await?;

    let (parsed, prompt) = match options.mode {
        AnalysisMode::Meta => {
            let meta =
                metadata::extract_metadata(&raw_response, Some(options.max_keywords as usize));
            let prompt = metadata::derive_prompt(&meta);
            (Some(meta), prompt)
        }
        AnalysisMode::Prompt => (None, raw_response.trim().to_string()),
    };

    // Settlement: one credit per successfully analyzed file
    state.db.deduct_credits(uid, 1).await?;

    Ok(AnalysisResult {
        filename: file.filename,
        mime_type: normalized.mime_type.to_string(),
        content_sha256: sha256,
        metadata: parsed,
        prompt: Some(prompt),
        raw_response,
    })
}

/// The spec'd response shape for one analyzed file.
fn single_response(result: AnalysisResult, credits: u32) -> serde_json::Value {
    let metadata = match &result.metadata {
        Some(meta) => serde_json::json!({
            "filename": result.filename,
            "mimeType": result.mime_type,
            "contentSha256": result.content_sha256,
            "title": meta.title,
            "keywords": meta.keywords,
            "description": meta.description,
            "category": meta.category,
        }),
        None => serde_json::json!({}),
    };

    serde_json::json!({
        "filename": result.filename,
        "metadata": metadata,
        "prompt": result.prompt,
        "rawResponse": result.raw_response,
        "credits": credits,
    })
}
