// SPDX-License-Identifier: MIT

//! Plan purchase flow: order creation and capture against PayPal.

use crate::error::{AppError, Result};
use crate::AppState;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/payments/create-order", post(create_order))
        .route("/payments/capture-order", post(capture_order))
}

// ─── Order Creation ──────────────────────────────────────────

#[derive(Deserialize)]
struct CreateOrderRequest {
    #[serde(rename = "planId")]
    plan_id: String,
}

#[derive(Serialize)]
struct CreateOrderResponse {
    #[serde(rename = "orderId")]
    order_id: String,
}

/// Create a PayPal order priced from the plan catalog.
async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>> {
    let plan = state
        .db
        .find_plan(&request.plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Plan {} not found", request.plan_id)))?;

    let order_id = state.paypal.create_order(plan.price).await?;

    tracing::info!(plan_id = %plan.plan_id, order_id, "Order created");

    Ok(Json(CreateOrderResponse { order_id }))
}

// ─── Order Capture ───────────────────────────────────────────

#[derive(Deserialize)]
struct CaptureOrderRequest {
    #[serde(rename = "orderId")]
    order_id: String,
    uid: String,
    #[serde(rename = "planId")]
    plan_id: String,
}

/// Capture payment for an order and apply the plan to the user.
///
/// Only a PayPal status of COMPLETED mutates the user record, and a given
/// order id is applied at most once no matter how often the capture
/// callback is delivered.
async fn capture_order(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CaptureOrderRequest>,
) -> Result<Response> {
    let plan = state
        .db
        .find_plan(&request.plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Plan {} not found", request.plan_id)))?;

    let outcome = state.paypal.capture_order(&request.order_id).await?;

    if !outcome.is_completed() {
        tracing::warn!(
            order_id = %request.order_id,
            status = %outcome.status,
            "Capture not completed; user untouched"
        );
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "data": outcome.payload,
            })),
        )
            .into_response());
    }

    // Replayed captures are skipped inside the transaction; both paths are
    // success from the caller's point of view.
    let applied = state
        .db
        .credit_capture(&request.uid, &plan, &request.order_id)
        .await?;

    tracing::info!(
        uid = %request.uid,
        order_id = %request.order_id,
        plan_id = %plan.plan_id,
        applied,
        "Capture completed"
    );

    Ok(Json(serde_json::json!({ "success": true })).into_response())
}
