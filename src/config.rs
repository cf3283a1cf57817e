//! Application configuration loaded from environment variables.
//!
//! Secrets (Gemini API key, PayPal credentials, JWT signing key) are read
//! once at startup and held in memory for the lifetime of the process.

use std::env;

/// Default per-file upload ceiling: 50 MB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Gemini model name
    pub gemini_model: String,
    /// PayPal environment ("live" or "sandbox")
    pub paypal_env: String,
    /// Credits granted to a newly created user
    pub initial_credits: u32,
    /// Per-file upload ceiling in bytes
    pub max_upload_bytes: usize,
    /// Raster converter binary (ImageMagick)
    pub convert_bin: String,
    /// PostScript interpreter binary (Ghostscript, for EPS)
    pub ghostscript_bin: String,
    /// External converter timeout in seconds
    pub convert_timeout_secs: u64,
    /// Whether SVG intake is enabled (requires a converter that handles it)
    pub enable_svg: bool,
    /// Whether EPS intake is enabled (requires Ghostscript on the host)
    pub enable_eps: bool,

    // --- Secrets ---
    /// Gemini API key
    pub gemini_api_key: String,
    /// PayPal REST client ID
    pub paypal_client_id: String,
    /// PayPal REST client secret
    pub paypal_client_secret: String,
    /// JWT signing key for bearer tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash-latest".to_string()),
            paypal_env: env::var("PAYPAL_ENV").unwrap_or_else(|_| "sandbox".to_string()),
            initial_credits: env::var("INITIAL_CREDITS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            convert_bin: env::var("CONVERT_BIN").unwrap_or_else(|_| "magick".to_string()),
            ghostscript_bin: env::var("GHOSTSCRIPT_BIN").unwrap_or_else(|_| "gs".to_string()),
            convert_timeout_secs: env::var("CONVERT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            enable_svg: env_flag("ENABLE_SVG"),
            enable_eps: env_flag("ENABLE_EPS"),

            gemini_api_key: env::var("GEMINI_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GEMINI_API_KEY"))?,
            paypal_client_id: env::var("PAYPAL_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("PAYPAL_CLIENT_ID"))?,
            paypal_client_secret: env::var("PAYPAL_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("PAYPAL_CLIENT_SECRET"))?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Config for tests only: no real credentials, converters disabled.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            gemini_model: "gemini-1.5-flash-latest".to_string(),
            paypal_env: "sandbox".to_string(),
            initial_credits: 10,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            convert_bin: "magick".to_string(),
            ghostscript_bin: "gs".to_string(),
            convert_timeout_secs: 30,
            enable_svg: false,
            enable_eps: false,
            gemini_api_key: "test_gemini_key".to_string(),
            paypal_client_id: "test_paypal_id".to_string(),
            paypal_client_secret: "test_paypal_secret".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
        }
    }
}

fn env_flag(name: &str) -> bool {
    matches!(
        env::var(name).as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE") | Ok("yes")
    )
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
