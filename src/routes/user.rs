// SPDX-License-Identifier: MIT

//! User record and credit ledger endpoints.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::User;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/user", get(get_user))
}

/// Routes behind the bearer-token middleware (applied in routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/credits/deduct", post(deduct_credits))
}

// ─── User Record ─────────────────────────────────────────────

#[derive(Deserialize)]
struct UserQuery {
    uid: Option<String>,
    /// Identity-provider profile data, used only to seed a new record
    #[serde(rename = "displayName")]
    display_name: Option<String>,
    #[serde(rename = "photoUrl")]
    photo_url: Option<String>,
}

/// Get the user record, creating it on first access.
async fn get_user(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserQuery>,
) -> Result<Json<User>> {
    let uid = params
        .uid
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| AppError::BadRequest("UID is required".to_string()))?;

    let user = state
        .db
        .get_or_create_user(
            &uid,
            params.display_name,
            params.photo_url,
            state.config.initial_credits,
        )
        .await?;

    Ok(Json(user))
}

// ─── Credit Deduction ────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct DeductRequest {
    /// Credits to deduct; must be positive
    #[validate(range(min = 1))]
    amount: u32,
}

#[derive(Serialize)]
struct DeductResponse {
    success: bool,
    credits: u32,
}

/// Deduct credits from the authenticated user's balance.
///
/// The check-and-decrement is one atomic store operation; a request that
/// would drive the balance negative is refused with 403 and no mutation.
async fn deduct_credits(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<DeductRequest>,
) -> Result<Json<DeductResponse>> {
    request
        .validate()
        .map_err(|_| AppError::BadRequest("Invalid deduction amount".to_string()))?;

    let credits = state.db.deduct_credits(&user.uid, request.amount).await?;

    tracing::info!(uid = %user.uid, amount = request.amount, credits, "Credits deducted");

    Ok(Json(DeductResponse {
        success: true,
        credits,
    }))
}
