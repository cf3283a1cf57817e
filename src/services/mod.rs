// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod convert;
pub mod export;
pub mod gemini;
pub mod metadata;
pub mod paypal;

pub use convert::{ImageConverter, ImageFormat, NormalizedImage};
pub use export::Marketplace;
pub use gemini::GeminiClient;
pub use paypal::PaypalClient;
