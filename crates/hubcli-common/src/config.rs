//! Per-host credential configuration.
//!
//! Configuration is loaded from `~/.config/hubcli/hosts.toml`, or from
//! `$HUBCLI_CONFIG_DIR/hosts.toml` when that variable is set.
//!
//! ## Example Configuration
//!
//! ```toml
//! [hosts."github.com"]
//! user = "monalisa"
//! oauth_token = "gho_xxxxxxxxxxxxxxxxxxxx"
//! git_protocol = "https"
//!
//! [hosts."ghe.example.com"]
//! user = "hubot"
//! oauth_token = "ghp_xxxxxxxxxxxxxxxxxxxx"
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::credentials::{CredentialLookup, OAUTH_TOKEN_KEY};
use crate::error::{ConfigError, Result};
use crate::hostname::normalize_hostname;

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "HUBCLI_CONFIG_DIR";

const HOSTS_FILE: &str = "hosts.toml";

/// Settings stored for a single host.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostEntry {
    /// Login of the authenticated user.
    #[serde(default)]
    pub user: Option<String>,

    /// API token for this host.
    #[serde(default)]
    pub oauth_token: Option<SecretString>,

    /// Preferred git protocol (`https` or `ssh`).
    #[serde(default)]
    pub git_protocol: Option<String>,
}

impl HostEntry {
    fn value(&self, key: &str) -> Option<String> {
        match key {
            OAUTH_TOKEN_KEY => self
                .oauth_token
                .as_ref()
                .map(|token| token.expose_secret().to_string()),
            "user" => self.user.clone(),
            "git_protocol" => self.git_protocol.clone(),
            _ => None,
        }
    }
}

/// Host credential configuration loaded from TOML.
///
/// Host keys are normalized on load, so `[hosts."API.GitHub.com"]` answers
/// lookups for `github.com`.
#[derive(Debug, Clone, Default)]
pub struct HostsConfig {
    hosts: HashMap<String, HostEntry>,
}

#[derive(Deserialize)]
struct HostsFile {
    #[serde(default)]
    hosts: HashMap<String, HostEntry>,
}

impl HostsConfig {
    /// Loads configuration from the default location.
    ///
    /// A missing file yields an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config directory cannot be determined
    /// - The file exists but cannot be read
    /// - Deserialization fails
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads configuration from an explicit path.
    ///
    /// A missing file yields an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no hosts file at {}", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid hosts configuration.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: HostsFile = toml::from_str(contents)?;
        let hosts = file
            .hosts
            .into_iter()
            .map(|(host, entry)| (normalize_hostname(&host), entry))
            .collect();

        Ok(Self { hosts })
    }

    /// Returns the default configuration file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir).join(HOSTS_FILE));
        }

        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::ConfigDir)?
            .join("hubcli");

        Ok(config_dir.join(HOSTS_FILE))
    }

    /// Returns the entry stored for `host`, normalizing it first.
    #[must_use]
    pub fn host(&self, host: &str) -> Option<&HostEntry> {
        self.hosts.get(&normalize_hostname(host))
    }

    /// Lists the configured hosts.
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts.keys().map(String::as_str)
    }
}

impl CredentialLookup for HostsConfig {
    fn get(&self, host: &str, key: &str) -> Result<String> {
        self.hosts
            .get(host)
            .and_then(|entry| entry.value(key))
            .ok_or_else(|| ConfigError::not_found(host, key))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r#"
[hosts."github.com"]
user = "monalisa"
oauth_token = "gho_public"
git_protocol = "https"

[hosts."GHE.Example.com"]
oauth_token = "ghp_enterprise"
"#;

    #[test]
    fn test_lookup_token() {
        let config = HostsConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.get("github.com", OAUTH_TOKEN_KEY).unwrap(), "gho_public");
        assert_eq!(config.get("github.com", "user").unwrap(), "monalisa");
        assert_eq!(config.get("github.com", "git_protocol").unwrap(), "https");
    }

    #[test]
    fn test_hosts_are_normalized_on_load() {
        let config = HostsConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(
            config.get("ghe.example.com", OAUTH_TOKEN_KEY).unwrap(),
            "ghp_enterprise"
        );
        assert!(config.host("GHE.EXAMPLE.COM:443").is_some());
    }

    #[test]
    fn test_missing_values_are_not_found() {
        let config = HostsConfig::from_toml(SAMPLE).unwrap();
        assert!(config.get("ghe.example.com", "user").unwrap_err().is_not_found());
        assert!(config.get("unknown.io", OAUTH_TOKEN_KEY).unwrap_err().is_not_found());
        assert!(config.get("github.com", "unknown_key").unwrap_err().is_not_found());
    }

    #[test]
    fn test_token_is_redacted_in_debug() {
        let config = HostsConfig::from_toml(SAMPLE).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("gho_public"));
    }

    #[test]
    fn test_empty_document() {
        let config = HostsConfig::from_toml("").unwrap();
        assert_eq!(config.hosts().count(), 0);
    }

    #[test]
    fn test_invalid_toml() {
        let result = HostsConfig::from_toml("[hosts.\"github.com\"\noauth_token =");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = HostsConfig::load_from(file.path()).unwrap();
        assert_eq!(config.hosts().count(), 2);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = HostsConfig::load_from(&dir.path().join("hosts.toml")).unwrap();
        assert_eq!(config.hosts().count(), 0);
    }
}
