// SPDX-License-Identifier: MIT

//! StockMeta: AI-generated stock image metadata with credit metering
//!
//! This crate provides the backend API for analyzing uploaded images with
//! the Gemini generative-content API, parsing the response into marketplace
//! metadata, and settling the cost against a per-user credit balance.

pub mod config;
pub mod db;
pub mod error;
pub mod i18n;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{GeminiClient, ImageConverter, PaypalClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub converter: ImageConverter,
    pub gemini: GeminiClient,
    pub paypal: PaypalClient,
}
