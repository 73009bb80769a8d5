//! # Domain Module
//!
//! Core types for proposal reporting: entities, outcomes, errors and configuration.

pub mod config;
pub mod entities;
pub mod errors;
pub mod outcome;

pub use config::*;
pub use entities::*;
pub use errors::*;
pub use outcome::*;
