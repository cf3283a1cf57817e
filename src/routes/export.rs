// SPDX-License-Identifier: MIT

//! Server-side CSV export of cached analysis results.

use crate::error::{AppError, Result};
use crate::models::{AnalysisMode, AnalysisResult};
use crate::services::export::{write_csv, write_prompt_csv, Marketplace};
use crate::AppState;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/export", post(export_csv))
}

#[derive(Deserialize)]
struct ExportRequest {
    results: Vec<AnalysisResult>,
    #[serde(default)]
    marketplace: String,
    #[serde(default = "default_mode")]
    mode: AnalysisMode,
}

fn default_mode() -> AnalysisMode {
    AnalysisMode::Meta
}

/// Render results as a marketplace CSV download.
///
/// Prompt mode ignores the marketplace and emits a single Prompt column.
async fn export_csv(Json(request): Json<ExportRequest>) -> Result<Response> {
    if request.results.is_empty() {
        return Err(AppError::BadRequest("No results to export".to_string()));
    }

    let marketplace = Marketplace::parse(&request.marketplace);
    let (csv, filename) = match request.mode {
        AnalysisMode::Prompt => (
            write_prompt_csv(&request.results),
            "prompt_results.csv".to_string(),
        ),
        AnalysisMode::Meta => (
            write_csv(&request.results, marketplace),
            marketplace.export_filename(),
        ),
    };

    tracing::debug!(
        marketplace = marketplace.name(),
        rows = request.results.len(),
        "CSV export"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    )
        .into_response())
}
