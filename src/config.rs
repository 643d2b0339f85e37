use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_derive::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::services::endpoint::EndpointTemplate;

pub const CONFIG_DIR: &str = "/etc/ip_updater";

/// Overrides `CONFIG_DIR` when set.
pub const CONFIG_DIR_ENV: &str = "IP_UPDATER_CONFIG_DIR";

const CONFIG_FILE: &str = "ip_updater.conf";

const HOSTS_FILE: &str = "hosts_c.data";

/// Telegram accepts either a numeric chat id or a `@channel` name. It is sent
/// back in whichever shape it was configured.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChatId {
    Numeric(i64),
    Named(Box<str>),
}

/// This stores the values of ip_updater.conf. Every key is optional; missing
/// Telegram credentials only disable the push channel.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub telegram_token: Option<Box<str>>,

    #[serde(default)]
    pub telegram_chat_id: Option<ChatId>,

    #[serde(default = "default_user_agent")]
    pub user_agent: Box<str>,

    /// Also push the "already up to date" message (silently).
    #[serde(default)]
    pub push_up_to_date: bool,
}

/// One entry of hosts_c.data.
#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct HostDescriptor {
    pub always_update: bool,
    pub host_name: Box<str>,
    pub updater: EndpointTemplate,
    pub zone_id: Box<str>,
    pub dns_record_id: Box<str>,
    pub bearer: Box<str>,
}

// The bearer token must never end up in a log line.
impl fmt::Debug for HostDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostDescriptor")
            .field("always_update", &self.always_update)
            .field("host_name", &self.host_name)
            .field("updater", &self.updater)
            .field("zone_id", &self.zone_id)
            .field("dns_record_id", &self.dns_record_id)
            .field("bearer", &"<REDACTED>")
            .finish()
    }
}

impl HostDescriptor {
    /// Validates a single raw entry of the host list. Entries are checked one
    /// by one so that a broken entry does not take the rest of the list down.
    pub fn from_entry(entry: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(entry.clone())
    }
}

/// Copy of a raw host entry that is safe to log.
pub fn redacted_entry(entry: &Value) -> Value {
    let mut entry = entry.clone();
    if let Some(bearer) = entry.get_mut("bearer") {
        *bearer = Value::from("<REDACTED>");
    }
    entry
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Configuration,
    Hosts,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Configuration => write!(f, "configuration"),
            FileKind::Hosts => write!(f, "hosts"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot find configuration directory {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Cannot find {kind} file {}", .path.display())]
    MissingFile { kind: FileKind, path: PathBuf },

    #[error("Cannot read {kind} file: {source}")]
    Read {
        kind: FileKind,
        #[source]
        source: io::Error,
    },

    #[error("Cannot parse {kind} file: {source}")]
    Parse {
        kind: FileKind,
        #[source]
        source: serde_json::Error,
    },
}

/// The read-only inputs of a run. Host entries are kept raw until the
/// reconciler validates them.
#[derive(Debug)]
pub struct Inputs {
    pub config: Config,
    pub hosts: Vec<Value>,
}

pub fn config_dir() -> PathBuf {
    std::env::var_os(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_DIR))
}

fn read_file(kind: FileKind, path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read { kind, source })
}

pub fn load(dir: &Path) -> Result<Inputs, ConfigError> {
    if !dir.is_dir() {
        return Err(ConfigError::MissingDirectory(dir.to_owned()));
    }

    // Both files must exist before either one is parsed.
    let config_path = dir.join(CONFIG_FILE);
    let hosts_path = dir.join(HOSTS_FILE);

    if !config_path.is_file() {
        return Err(ConfigError::MissingFile {
            kind: FileKind::Configuration,
            path: config_path,
        });
    }

    if !hosts_path.is_file() {
        return Err(ConfigError::MissingFile {
            kind: FileKind::Hosts,
            path: hosts_path,
        });
    }

    let config_str = read_file(FileKind::Configuration, &config_path)?;
    let config = serde_json::from_str::<Config>(&config_str).map_err(|source| {
        ConfigError::Parse {
            kind: FileKind::Configuration,
            source,
        }
    })?;

    let hosts_str = read_file(FileKind::Hosts, &hosts_path)?;
    let hosts = serde_json::from_str::<Vec<Value>>(&hosts_str).map_err(|source| {
        ConfigError::Parse {
            kind: FileKind::Hosts,
            source,
        }
    })?;

    Ok(Inputs { config, hosts })
}

fn default_user_agent() -> Box<str> {
    concat!("ip-updater ", env!("CARGO_PKG_VERSION")).into()
}
