// SPDX-License-Identifier: MIT

//! PayPal Orders API client (create + capture).
//!
//! Payment capture and settlement themselves are PayPal's problem; this
//! client only creates an order for a plan's price and later asks PayPal to
//! capture it, surfacing the processor's status and diagnostic payload.

use crate::error::AppError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

const LIVE_BASE_URL: &str = "https://api-m.paypal.com";
const SANDBOX_BASE_URL: &str = "https://api-m.sandbox.paypal.com";

/// Outcome of a capture call. `status` is PayPal's order status
/// ("COMPLETED" on success); `payload` is the full response body, passed
/// through to the caller on non-completed captures.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub status: String,
    pub payload: serde_json::Value,
}

impl CaptureOutcome {
    pub fn is_completed(&self) -> bool {
        self.status == "COMPLETED"
    }
}

/// PayPal REST client.
#[derive(Clone)]
pub struct PaypalClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl PaypalClient {
    /// Create a client for the given environment ("live" or anything else
    /// for sandbox).
    pub fn new(client_id: String, client_secret: String, environment: &str) -> Self {
        let base_url = if environment == "live" {
            LIVE_BASE_URL
        } else {
            SANDBOX_BASE_URL
        };
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.to_string(),
            client_id,
            client_secret,
        }
    }

    /// Override the endpoint (tests).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn basic_auth(&self) -> String {
        let credentials = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(credentials))
    }

    /// Create an order for a USD amount; returns PayPal's order id.
    pub async fn create_order(&self, amount: f64) -> Result<String, AppError> {
        let url = format!("{}/v2/checkout/orders", self.base_url);
        let body = serde_json::json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": { "currency_code": "USD", "value": format!("{:.2}", amount) }
            }]
        });

        let response = self
            .http
            .post(&url)
            .header("Authorization", self.basic_auth())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Payment(format!("Order creation request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Payment(format!(
                "Order creation failed: HTTP {}: {}",
                status, body
            )));
        }

        let order: CreatedOrder = response
            .json()
            .await
            .map_err(|e| AppError::Payment(format!("Invalid order response: {}", e)))?;

        tracing::info!(order_id = %order.id, amount, "PayPal order created");
        Ok(order.id)
    }

    /// Capture payment for an order.
    pub async fn capture_order(&self, order_id: &str) -> Result<CaptureOutcome, AppError> {
        let url = format!("{}/v2/checkout/orders/{}/capture", self.base_url, order_id);

        let response = self
            .http
            .post(&url)
            .header("Authorization", self.basic_auth())
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| AppError::Payment(format!("Capture request failed: {}", e)))?;

        let http_status = response.status();
        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Payment(format!("Invalid capture response: {}", e)))?;

        if !http_status.is_success() {
            return Err(AppError::Payment(format!(
                "Capture failed: HTTP {}: {}",
                http_status, payload
            )));
        }

        let status = payload
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(CaptureOutcome { status, payload })
    }
}

#[derive(Debug, Deserialize)]
struct CreatedOrder {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_selects_base_url() {
        let live = PaypalClient::new("id".into(), "secret".into(), "live");
        assert_eq!(live.base_url, LIVE_BASE_URL);

        let sandbox = PaypalClient::new("id".into(), "secret".into(), "sandbox");
        assert_eq!(sandbox.base_url, SANDBOX_BASE_URL);

        let unknown = PaypalClient::new("id".into(), "secret".into(), "");
        assert_eq!(unknown.base_url, SANDBOX_BASE_URL);
    }

    #[test]
    fn test_basic_auth_encoding() {
        let client = PaypalClient::new("id".into(), "secret".into(), "sandbox");
        assert_eq!(client.basic_auth(), format!("Basic {}", STANDARD.encode("id:secret")));
    }

    #[test]
    fn test_capture_outcome_status() {
        let completed = CaptureOutcome {
            status: "COMPLETED".to_string(),
            payload: serde_json::json!({}),
        };
        assert!(completed.is_completed());

        let pending = CaptureOutcome {
            status: "PENDING".to_string(),
            payload: serde_json::json!({}),
        };
        assert!(!pending.is_completed());
    }
}
