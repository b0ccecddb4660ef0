//! Moderation Server
//!
//! HTTP front of the moderation classifier. The model is loaded once into an
//! [`AppState`] before the listener binds, then shared read-only by every
//! request.

pub mod config;
pub mod routes;
pub mod state;

pub use config::{ConfigOverrides, ServiceConfig};
pub use routes::{create_router, CheckResponse, HealthResponse};
pub use state::AppState;
