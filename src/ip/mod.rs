mod http;

use std::net::IpAddr;

use thiserror::Error;

pub use self::http::HttpSource;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Cannot connect to {endpoint}: {reason}")]
    Transport { endpoint: Box<str>, reason: Box<str> },

    #[error("Error getting the IP from {endpoint} (HTTP {code}):\n\n{body}")]
    Status {
        endpoint: Box<str>,
        code: u16,
        body: Box<str>,
    },

    #[error("No IP in the response from {endpoint}:\n\n{detail}")]
    Payload { endpoint: Box<str>, detail: Box<str> },
}

/// Somewhere the machine's public address can be learned from. It is asked
/// exactly once per run.
pub trait AddressSource {
    fn public_address(&self) -> Result<IpAddr, ResolveError>;
}
