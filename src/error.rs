/// Error types for the bootstrap run
use thiserror::Error;

/// Errors that can occur while provisioning database users
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The configured connection string was rejected by the driver
    #[error("Invalid MongoDB connection string: {0}")]
    InvalidConnectionString(String),

    /// The server failed or rejected a createUser command
    #[error("createUser on '{database}' failed: {reason}")]
    CreateUser {
        /// Database the request was issued against
        database: String,
        /// Server/driver error text
        reason: String,
    },
}
