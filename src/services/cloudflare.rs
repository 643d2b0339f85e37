use std::net::IpAddr;

use serde_json::Value;

use crate::config::HostDescriptor;
use crate::http::{Client, Error, Response};

use super::{DnsProvider, ProviderError};

/// Records are always written as A records.
const RECORD_TYPE: &str = "A";

pub struct Service {
    client: Client,
}

impl Service {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn pretty(value: &Value) -> Box<str> {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|_| value.to_string())
        .into()
}

fn parse_response(
    endpoint: &str,
    response: Result<Response, Error>,
) -> Result<Value, ProviderError> {
    match response {
        Ok(r) => r
            .into_json::<Value>()
            .map_err(|e| ProviderError::Payload(e.to_string().into())),

        Err(Error::Status(code, resp)) => Err(ProviderError::Status {
            code,
            body: resp.into_string().unwrap_or_default().into(),
        }),

        Err(Error::Transport(reason)) => Err(ProviderError::Transport {
            endpoint: endpoint.into(),
            reason,
        }),
    }
}

fn is_success(response: &Value) -> bool {
    response
        .get("success")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

/// Extracts the published address out of a record lookup, making sure the
/// provider agrees on both the outcome and the record name.
pub(super) fn check_record(host_name: &str, response: &Value) -> Result<Box<str>, ProviderError> {
    let result = response.get("result");
    let name = result.and_then(|r| r.get("name")).and_then(|v| v.as_str());
    let content = result.and_then(|r| r.get("content")).and_then(|v| v.as_str());

    match (is_success(response), name, content) {
        (true, Some(name), Some(content)) if name == host_name => Ok(content.into()),
        _ => Err(ProviderError::Payload(pretty(response))),
    }
}

pub(super) fn check_update(response: &Value) -> Result<(), ProviderError> {
    if is_success(response) {
        Ok(())
    } else {
        Err(ProviderError::Payload(pretty(response)))
    }
}

pub(super) fn authorization(host: &HostDescriptor) -> String {
    format!("Bearer {}", host.bearer)
}

pub(super) fn update_body(host: &HostDescriptor, address: IpAddr) -> Value {
    serde_json::json!({
        "content": address.to_string(),
        "name": host.host_name.as_ref(),
        "type": RECORD_TYPE,
    })
}

impl DnsProvider for Service {
    fn fetch_record(&mut self, host: &HostDescriptor) -> Result<Box<str>, ProviderError> {
        let url = host.updater.render(&host.zone_id, &host.dns_record_id);
        log::debug!("fetching record of {} from {}", host.host_name, url);

        let response = self
            .client
            .get(&url)
            .set("Authorization", &authorization(host))
            .call();

        let response = parse_response(&url, response)?;
        check_record(&host.host_name, &response)
    }

    fn update_record(&mut self, host: &HostDescriptor, address: IpAddr) -> Result<(), ProviderError> {
        let url = host.updater.render(&host.zone_id, &host.dns_record_id);
        log::debug!("updating record of {} at {}", host.host_name, url);

        let response = self
            .client
            .patch(&url)
            .set("Authorization", &authorization(host))
            .send_json(update_body(host, address));

        let response = parse_response(&url, response)?;
        check_update(&response)
    }
}
