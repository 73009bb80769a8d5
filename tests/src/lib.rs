//! # Chainhook Reporter Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Gateway → pipeline → adapters, over HTTP
//!     ├── webhook.rs    # POST /chainhook
//!     └── topics.rs     # GET /api/voting-topics, /health, /metrics
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p reporter-tests
//! cargo test -p reporter-tests integration::webhook
//! ```

pub mod integration;
