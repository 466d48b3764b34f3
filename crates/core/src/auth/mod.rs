//! Delegated OAuth token lifecycle
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────┐
//! │ TokenLifecycleManager  │  get_valid_token / force_refresh
//! └───────────┬────────────┘
//!             │
//!             ├──► EphemeralTokenCache   (process-local fast path)
//!             ├──► TokenRecordStore      (persisted refresh-token records)
//!             ├──► TokenExchangeClient   (refresh-token grant)
//!             └──► Clock                 (expiry decisions)
//! ```
//!
//! The manager prefers a live ephemeral token, otherwise loads the
//! persisted record, refreshes it when expired and writes the rotated
//! credentials back. Concurrent callers for the same user share a single
//! refresh.

pub mod ephemeral;
pub mod lifecycle;
pub mod ports;
