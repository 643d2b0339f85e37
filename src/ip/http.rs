use std::net::IpAddr;

use serde_json::Value;

use crate::http::{Client, Error};

use super::{AddressSource, ResolveError};

pub const IPINFO_URL: &str = "https://ipinfo.io/json";

/// Looks the address up through a JSON service answering with an `ip` field.
pub struct HttpSource {
    client: Client,
    url: Box<str>,
}

impl HttpSource {
    pub fn ipinfo(client: Client) -> Self {
        Self {
            client,
            url: IPINFO_URL.into(),
        }
    }
}

pub(super) fn extract_address(endpoint: &str, response: &Value) -> Result<IpAddr, ResolveError> {
    let payload_error = || ResolveError::Payload {
        endpoint: endpoint.into(),
        detail: serde_json::to_string_pretty(response)
            .unwrap_or_else(|_| response.to_string())
            .into(),
    };

    response
        .get("ip")
        .and_then(|ip| ip.as_str())
        .and_then(|ip| ip.trim().parse::<IpAddr>().ok())
        .ok_or_else(payload_error)
}

impl AddressSource for HttpSource {
    fn public_address(&self) -> Result<IpAddr, ResolveError> {
        log::debug!("looking up the public address at {}", self.url);

        let response = match self.client.get(&self.url).call() {
            Ok(r) => r,
            Err(Error::Status(code, response)) => Err(ResolveError::Status {
                endpoint: self.url.clone(),
                code,
                body: response.into_string().unwrap_or_default().into(),
            })?,
            Err(Error::Transport(reason)) => Err(ResolveError::Transport {
                endpoint: self.url.clone(),
                reason,
            })?,
        };

        let response = response
            .into_json::<Value>()
            .map_err(|e| ResolveError::Payload {
                endpoint: self.url.clone(),
                detail: e.to_string().into(),
            })?;

        extract_address(&self.url, &response)
    }
}
