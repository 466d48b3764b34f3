//! # TokenWarden Domain
//!
//! Domain types for delegated OAuth token management.
//!
//! This crate contains:
//! - Token data types (`TokenRecord`, `EphemeralEntry`, `TokenExchangeResult`)
//! - Command-permission payloads consumed by downstream API calls
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other TokenWarden crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
