//! # TokenWarden App
//!
//! Command-line entry point for the token lifecycle service.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - CLI definition and command handlers
//! - Logging setup
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod cli;
pub mod commands;
pub mod context;
pub mod utils;

pub use context::AppContext;
