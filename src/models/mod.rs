// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod analysis;
pub mod plan;
pub mod user;

pub use analysis::{AnalysisMode, AnalysisOptions, AnalysisResult, ImageMetadata};
pub use plan::Plan;
pub use user::{PaymentInfo, User};
