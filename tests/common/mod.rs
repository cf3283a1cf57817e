// SPDX-License-Identifier: MIT

use std::sync::Arc;
use stockmeta::config::Config;
use stockmeta::db::FirestoreDb;
use stockmeta::routes::create_router;
use stockmeta::services::{GeminiClient, ImageConverter, PaypalClient};
use stockmeta::AppState;

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(Config::test_default())
}

/// Same, with a caller-tweaked config (upload limits, toggles).
#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> (axum::Router, Arc<AppState>) {
    let db = test_db_offline();
    let converter = ImageConverter::from_config(&config);
    let gemini = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone());
    let paypal = PaypalClient::new(
        config.paypal_client_id.clone(),
        config.paypal_client_secret.clone(),
        &config.paypal_env,
    );

    let state = Arc::new(AppState {
        config,
        db,
        converter,
        gemini,
        paypal,
    });

    (create_router(state.clone()), state)
}
