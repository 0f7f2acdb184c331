//! CLI utilities for binaries
//!
//! Handles configuration loading, environment variables and argument
//! parsing for the linkwire tools.

use anyhow::{bail, Context};
use linkwire::{ConnectionSettings, Protocol};
use std::path::{Path, PathBuf};

/// Type of configuration to load
#[derive(Debug, Clone)]
pub enum ConfigType {
    /// Connection settings (config/linkwire.yaml)
    Connection,
    /// Custom path
    Custom(String),
}

impl ConfigType {
    /// Get the default path for this config type
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::Connection => "config/linkwire.yaml",
            ConfigType::Custom(path) => path,
        }
    }

    /// Get the environment variable name for this config type
    pub fn env_var_name(&self) -> &str {
        "LINKWIRE_CONFIG_PATH"
    }
}

/// Load configuration path from environment or use default
///
/// # Examples
/// ```
/// use linkwire_tools::bin_common::{load_config_from_env, ConfigType};
///
/// let path = load_config_from_env(ConfigType::Connection);
/// ```
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    match config_type {
        ConfigType::Custom(path) => path.into(),
        other => std::env::var(other.env_var_name())
            .unwrap_or_else(|_| other.default_path().to_string())
            .into(),
    }
}

/// Load connection settings from `path`, then apply `LINKWIRE_*` overrides
///
/// A missing file is not an error; defaults are used instead.
pub fn load_settings(path: &Path) -> anyhow::Result<ConnectionSettings> {
    let settings = if path.exists() {
        ConnectionSettings::from_file(path)?
    } else {
        ConnectionSettings::default()
    };
    Ok(settings.with_env_overrides()?)
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

/// Arguments of `linkwire-probe`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeArgs {
    pub endpoint: String,
    pub protocols: Vec<Protocol>,
}

/// Parse `<host:port> [--protocol ID[:VERSION]]...`
///
/// Offers protocol `1:1` when none is given.
pub fn parse_probe_args(args: &[String]) -> anyhow::Result<ProbeArgs> {
    let mut endpoint = None;
    let mut protocols = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--protocol" | "-p" => {
                let value = iter.next().context("--protocol needs a value")?;
                protocols.push(parse_protocol(value)?);
            }
            flag if flag.starts_with('-') => bail!("unknown option {}", flag),
            value => {
                if endpoint.replace(value.to_string()).is_some() {
                    bail!("more than one endpoint given");
                }
            }
        }
    }

    if protocols.is_empty() {
        protocols.push(Protocol::new(1, 1));
    }

    Ok(ProbeArgs {
        endpoint: endpoint.context("usage: linkwire-probe <host:port> [--protocol ID[:VERSION]]...")?,
        protocols,
    })
}

fn parse_protocol(value: &str) -> anyhow::Result<Protocol> {
    let (id, version) = match value.split_once(':') {
        Some((id, version)) => (id, version),
        None => (value, "1"),
    };
    Ok(Protocol::new(
        id.parse().with_context(|| format!("bad protocol id {:?}", id))?,
        version
            .parse()
            .with_context(|| format!("bad protocol version {:?}", version))?,
    ))
}
