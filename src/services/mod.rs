pub mod cloudflare;
pub mod endpoint;

use std::net::IpAddr;

use thiserror::Error;

use crate::config::HostDescriptor;

#[derive(Clone, Error, Debug, PartialEq, Eq)]
pub enum ProviderError {
    // connection refused, timeout and redirect loops all end up here
    #[error("cannot connect to {endpoint}: {reason}")]
    Transport { endpoint: Box<str>, reason: Box<str> },

    #[error("provider returned HTTP {code}:\n\n{body}")]
    Status { code: u16, body: Box<str> },

    // used when the provider answered, but not with what we asked for
    #[error("provider returned an unexpected response:\n\n{0}")]
    Payload(Box<str>),
}

pub trait DnsProvider {
    /// Fetch the address currently published for the host. The record must
    /// belong to `host.host_name`, anything else is an error.
    fn fetch_record(&mut self, host: &HostDescriptor) -> Result<Box<str>, ProviderError>;

    /// Point the host's record at `address`. No retry is attempted on failure.
    fn update_record(&mut self, host: &HostDescriptor, address: IpAddr) -> Result<(), ProviderError>;
}
