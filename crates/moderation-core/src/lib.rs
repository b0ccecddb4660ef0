//! Moderation Core
//!
//! Core types and utilities shared across the moderation components.
//!
//! This crate provides:
//! - Error types and result handling
//! - Raw request text extraction and the prediction value returned by the
//!   classification pipeline

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Prediction, RawText};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{Prediction, RawText};
}
