// SPDX-License-Identifier: MIT

//! Plan catalog endpoint.

use crate::error::Result;
use crate::models::Plan;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/plans", get(list_plans))
}

#[derive(Serialize)]
struct PlansResponse {
    success: bool,
    data: Vec<Plan>,
}

/// List the plan catalog (read-only reference data).
async fn list_plans(State(state): State<Arc<AppState>>) -> Result<Json<PlansResponse>> {
    let data = state.db.list_plans().await?;
    Ok(Json(PlansResponse {
        success: true,
        data,
    }))
}
