//! Database implementations

pub mod manager;
pub mod token_record_repository;

pub use manager::*;
pub use token_record_repository::*;
