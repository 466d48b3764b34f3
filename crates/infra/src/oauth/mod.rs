//! OAuth provider endpoints

pub mod exchange_client;

pub use exchange_client::OAuthExchangeClient;
