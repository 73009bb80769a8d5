//! Middleware for the reporter gateway.
//!
//! Layer order: Request → Trace → BodyLimit → WebhookSecret (`/chainhook` only) → Handler

pub mod auth;

pub use auth::{constant_time_compare, WebhookSecretLayer, SECRET_HEADER};
