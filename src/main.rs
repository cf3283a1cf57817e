// SPDX-License-Identifier: MIT

//! StockMeta API Server
//!
//! Turns uploaded images into stock-marketplace metadata via the Gemini
//! API, metered by a per-user credit balance with plans purchased through
//! PayPal.

use std::sync::Arc;
use stockmeta::{
    config::Config,
    db::FirestoreDb,
    services::{GeminiClient, ImageConverter, PaypalClient},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting StockMeta API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // External converter processes (ImageMagick / Ghostscript)
    let converter = ImageConverter::from_config(&config);
    tracing::info!(
        svg = config.enable_svg,
        eps = config.enable_eps,
        "Image converter initialized"
    );

    // Gemini client
    let gemini = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone());
    tracing::info!(model = %config.gemini_model, "Gemini client initialized");

    // PayPal client
    let paypal = PaypalClient::new(
        config.paypal_client_id.clone(),
        config.paypal_client_secret.clone(),
        &config.paypal_env,
    );
    tracing::info!(environment = %config.paypal_env, "PayPal client initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        converter,
        gemini,
        paypal,
    });

    // Build router
    let app = stockmeta::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stockmeta=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
