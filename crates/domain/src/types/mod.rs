//! Domain types

pub mod permissions;
pub mod token;

pub use permissions::*;
pub use token::*;
