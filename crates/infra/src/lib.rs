//! # TokenWarden Infrastructure
//!
//! Infrastructure implementations of the core token ports.
//!
//! This crate contains:
//! - SQLite token record store (r2d2 pool, schema migrations)
//! - HTTP client and the OAuth token endpoint client
//! - Downstream API calls that consume delegated tokens
//! - Configuration loading from environment and files
//!
//! ## Architecture
//! - Implements traits defined in `tokenwarden-core`
//! - Contains all "impure" code (I/O, network)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod oauth;

// Re-export commonly used items
pub use database::{DbManager, SqliteTokenRecordRepository};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::CommandPermissionsClient;
pub use oauth::OAuthExchangeClient;
