//! File and environment backed connection settings
//!
//! ```yaml
//! connect_timeout_ms: 5000
//! receive_buffer_size: 8192
//! max_frame_size: 1048576
//! handshake: true
//! close_timeout_ms: 5000
//! ```
//!
//! Every key is optional. Environment variables (`LINKWIRE_CONNECT_TIMEOUT_MS`,
//! `LINKWIRE_RECEIVE_BUFFER_SIZE`, `LINKWIRE_MAX_FRAME_SIZE`,
//! `LINKWIRE_HANDSHAKE`, `LINKWIRE_CLOSE_TIMEOUT_MS`) override whatever the
//! file says.

use crate::traits::{LinkError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_CONNECT_TIMEOUT_MS: &str = "LINKWIRE_CONNECT_TIMEOUT_MS";
pub const ENV_RECEIVE_BUFFER_SIZE: &str = "LINKWIRE_RECEIVE_BUFFER_SIZE";
pub const ENV_MAX_FRAME_SIZE: &str = "LINKWIRE_MAX_FRAME_SIZE";
pub const ENV_HANDSHAKE: &str = "LINKWIRE_HANDSHAKE";
pub const ENV_CLOSE_TIMEOUT_MS: &str = "LINKWIRE_CLOSE_TIMEOUT_MS";

/// Tunables that can come from outside the program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    pub connect_timeout_ms: u64,
    pub receive_buffer_size: usize,
    pub max_frame_size: usize,
    pub handshake: bool,
    /// Upper bound for flushing queued frames on a graceful disconnect
    pub close_timeout_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            receive_buffer_size: 8 * 1024,
            max_frame_size: 1024 * 1024,
            handshake: true,
            close_timeout_ms: 5_000,
        }
    }
}

impl ConnectionSettings {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let settings: Self = serde_yaml::from_str(yaml)
            .map_err(|e| LinkError::Configuration(format!("invalid settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            LinkError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Apply `LINKWIRE_*` overrides from the process environment
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = parse_override(&lookup, ENV_CONNECT_TIMEOUT_MS)? {
            self.connect_timeout_ms = value;
        }
        if let Some(value) = parse_override(&lookup, ENV_RECEIVE_BUFFER_SIZE)? {
            self.receive_buffer_size = value;
        }
        if let Some(value) = parse_override(&lookup, ENV_MAX_FRAME_SIZE)? {
            self.max_frame_size = value;
        }
        if let Some(value) = parse_override(&lookup, ENV_HANDSHAKE)? {
            self.handshake = value;
        }
        if let Some(value) = parse_override(&lookup, ENV_CLOSE_TIMEOUT_MS)? {
            self.close_timeout_ms = value;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout_ms == 0 {
            return Err(LinkError::Configuration("connect_timeout_ms must be positive".into()));
        }
        if self.receive_buffer_size == 0 {
            return Err(LinkError::Configuration("receive_buffer_size must be positive".into()));
        }
        if self.max_frame_size < self.receive_buffer_size {
            return Err(LinkError::Configuration(format!(
                "max_frame_size ({}) is smaller than receive_buffer_size ({})",
                self.max_frame_size, self.receive_buffer_size
            )));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_millis(self.close_timeout_ms)
    }
}

fn parse_override<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| LinkError::Configuration(format!("{}={:?}: {}", key, raw, e))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings = ConnectionSettings::from_yaml_str("connect_timeout_ms: 250\n").unwrap();
        assert_eq!(settings.connect_timeout(), Duration::from_millis(250));
        assert_eq!(settings.receive_buffer_size, ConnectionSettings::default().receive_buffer_size);
        assert!(settings.handshake);
        assert_eq!(settings.close_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let env: HashMap<&str, &str> = [
            (ENV_HANDSHAKE, "false"),
            (ENV_MAX_FRAME_SIZE, "65536"),
            (ENV_CLOSE_TIMEOUT_MS, "250"),
        ]
            .into_iter()
            .collect();

        let settings = ConnectionSettings::from_yaml_str("handshake: true\n")
            .unwrap()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert!(!settings.handshake);
        assert_eq!(settings.max_frame_size, 65536);
        assert_eq!(settings.close_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_bad_override_is_configuration_error() {
        let result = ConnectionSettings::default().with_overrides(|key| {
            (key == ENV_CONNECT_TIMEOUT_MS).then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(LinkError::Configuration(_))));
    }

    #[test]
    fn test_validation_rejects_inconsistent_sizes() {
        let yaml = "receive_buffer_size: 4096\nmax_frame_size: 1024\n";
        assert!(ConnectionSettings::from_yaml_str(yaml).is_err());
        assert!(ConnectionSettings::from_yaml_str("connect_timeout_ms: 0\n").is_err());
    }
}
