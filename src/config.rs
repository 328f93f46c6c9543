use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

/// SNMP protocol version for v1/v2c community authentication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnmpVersion {
    V1,
    #[default]
    V2c,
}

/// One candidate community/credential record tried during the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Security name attached to requests.
    #[serde(default = "default_security_name")]
    pub name: String,

    /// Community string.
    #[serde(default = "default_community")]
    pub community: String,

    #[serde(default)]
    pub version: SnmpVersion,

    /// Per-credential port override; falls back to the client default.
    #[serde(default)]
    pub port: Option<u16>,
}

impl Default for Credential {
    fn default() -> Self {
        Self {
            name: default_security_name(),
            community: default_community(),
            version: SnmpVersion::V2c,
            port: None,
        }
    }
}

impl Credential {
    /// Credential for a plain v2c community string.
    pub fn community(community: &str) -> Self {
        Self {
            community: community.to_string(),
            ..Self::default()
        }
    }
}

/// Client tuning knobs. All defaults are explicit here rather than buried
/// at call sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Attempts the table join engine makes before giving up.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,

    /// Agent port used when a credential does not override it.
    #[serde(default = "default_port")]
    pub default_port: u16,

    /// Max-repetitions passed to bulk walks.
    #[serde(default = "default_max_repetitions")]
    pub max_repetitions: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            retry_limit: default_retry_limit(),
            default_port: default_port(),
            max_repetitions: default_max_repetitions(),
        }
    }
}

/// Client settings as loaded from a TOML file: tuning knobs plus the
/// ordered credential candidate list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(flatten)]
    pub config: ClientConfig,

    #[serde(default, rename = "credential")]
    pub credentials: Vec<Credential>,
}

impl ClientSettings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let settings: ClientSettings = toml::from_str(&content)?;
        info!(
            credentials = settings.credentials.len(),
            retry_limit = settings.config.retry_limit,
            "client settings loaded"
        );
        Ok(settings)
    }
}

fn default_security_name() -> String {
    "snmptables".to_string()
}

fn default_community() -> String {
    "public".to_string()
}

fn default_retry_limit() -> u32 {
    5
}

fn default_port() -> u16 {
    161
}

fn default_max_repetitions() -> u32 {
    100
}
