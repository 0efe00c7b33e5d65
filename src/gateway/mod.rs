//! Remote Data Gateway
//!
//! The only component allowed to talk to the Workaasana API.
//! One operation = one HTTP round trip; retries are left to callers.

mod args;
mod http;
mod traits;

#[cfg(test)]
mod tests;

use thiserror::Error;

pub use http::{HttpGateway, DEFAULT_API_BASE};
pub use traits::Gateway;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The request could not be sent or no response arrived
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-success status
    #[error("server rejected request with status {status}: {body}")]
    ServerRejected { status: u16, body: String },
    /// A success response whose body was not the expected JSON
    #[error("unexpected response body: {0}")]
    Decode(String),
}
