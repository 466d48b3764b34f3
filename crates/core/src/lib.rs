//! # TokenWarden Core
//!
//! Token lifecycle logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for the token store, the token endpoint and
//!   the clock
//! - The in-process ephemeral token cache
//! - The token lifecycle manager and its refresh decision
//!
//! ## Architecture Principles
//! - Only depends on `tokenwarden-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod auth;
pub mod clock;

pub use auth::ephemeral::{spawn_ephemeral_sweeper, EphemeralTokenCache};
pub use auth::lifecycle::{RefreshOutcome, TokenLifecycleManager};
pub use auth::ports::{TokenExchangeClient, TokenRecordStore};
pub use clock::{Clock, MockClock, SystemClock};
