pub mod config;
pub mod error;
pub mod provision;
pub mod session;
