use std::net::IpAddr;

use serde_json::Value;

use crate::config::{redacted_entry, HostDescriptor};
use crate::ip::{AddressSource, ResolveError};
use crate::notify::{Notifier, Push};
use crate::services::DnsProvider;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Updated,
    UpToDate,
    /// The provider could not be read or refused the update.
    Failed,
}

/// Per-run tally, reported once at the end.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub updated: usize,
    pub up_to_date: usize,
    pub failed: usize,
    pub invalid: usize,
}

pub struct Updater<'a> {
    provider: &'a mut dyn DnsProvider,
    notifier: &'a Notifier,
    push_up_to_date: bool,
}

impl<'a> Updater<'a> {
    pub fn new(provider: &'a mut dyn DnsProvider, notifier: &'a Notifier, push_up_to_date: bool) -> Self {
        Self {
            provider,
            notifier,
            push_up_to_date,
        }
    }

    /// Brings a single host in line with `public_ip`. At most one update
    /// request is sent.
    pub fn reconcile(&mut self, host: &HostDescriptor, public_ip: IpAddr) -> Outcome {
        log::debug!("reconciling {:?}", host);

        let current = match self.provider.fetch_record(host) {
            Ok(current) => current,
            Err(e) => {
                let message = format!("Error getting the IP of {} from the provider: {}", host.host_name, e);
                self.notifier.error(&message, Push::Never);
                return Outcome::Failed;
            }
        };

        let is_current = current.trim().parse::<IpAddr>().ok() == Some(public_ip);

        if is_current && !host.always_update {
            let push = if self.push_up_to_date {
                Push::Silent
            } else {
                Push::Never
            };
            let message = format!("Host {} IP is already up to date", host.host_name);
            self.notifier.info(&message, push);
            return Outcome::UpToDate;
        }

        match self.provider.update_record(host, public_ip) {
            Ok(()) => {
                let message = format!("Host {} new IP: {}", host.host_name, public_ip);
                self.notifier.info(&message, Push::Loud);
                Outcome::Updated
            }
            Err(e) => {
                let message = format!("Error while updating the IP of {}: {}", host.host_name, e);
                self.notifier.error(&message, Push::Loud);
                Outcome::Failed
            }
        }
    }

    /// Walks the host list in order. Entries that do not describe a host are
    /// reported and skipped without contacting the provider.
    pub fn run(&mut self, hosts: &[Value], public_ip: IpAddr) -> Summary {
        let mut summary = Summary::default();

        for entry in hosts {
            let host = match HostDescriptor::from_entry(entry) {
                Ok(host) => host,
                Err(e) => {
                    let entry = redacted_entry(entry);
                    let pretty = serde_json::to_string_pretty(&entry).unwrap_or_else(|_| entry.to_string());
                    let message = format!("Invalid host configuration ({}):\n\n{}", e, pretty);
                    self.notifier.warning(&message, Push::Never);
                    summary.invalid += 1;
                    continue;
                }
            };

            match self.reconcile(&host, public_ip) {
                Outcome::Updated => summary.updated += 1,
                Outcome::UpToDate => summary.up_to_date += 1,
                Outcome::Failed => summary.failed += 1,
            }
        }

        summary
    }
}

/// Resolves the public address once, then reconciles every host. Failing to
/// resolve the address aborts the run before any provider is contacted.
pub fn run(
    hosts: &[Value],
    source: &dyn AddressSource,
    provider: &mut dyn DnsProvider,
    notifier: &Notifier,
    push_up_to_date: bool,
) -> Result<Summary, ResolveError> {
    let public_ip = match source.public_address() {
        Ok(ip) => ip,
        Err(e) => {
            notifier.error(&e.to_string(), Push::Never);
            return Err(e);
        }
    };

    log::debug!("public address is {}", public_ip);

    let summary = Updater::new(provider, notifier, push_up_to_date).run(hosts, public_ip);

    let message = format!(
        "Run finished: {} updated, {} up to date, {} failed, {} invalid",
        summary.updated, summary.up_to_date, summary.failed, summary.invalid
    );
    notifier.info(&message, Push::Never);

    Ok(summary)
}
