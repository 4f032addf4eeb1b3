//! # hubcli-common
//!
//! Shared building blocks for the hubcli crates:
//!
//! - [`CredentialLookup`]: the host-keyed secret store consulted before every request
//! - [`HostsConfig`]: the on-disk `hosts.toml` implementation of that store
//! - [`EnvCredentials`]: environment-variable token overrides layered over any store
//! - [`normalize_hostname`]: the canonical host form credentials are keyed by
//! - [`is_debug_enabled`]: the `HUBCLI_DEBUG` / `DEBUG` switch for wire-level logging
//!
//! ## Example
//!
//! ```no_run
//! use hubcli_common::{CredentialLookup, EnvCredentials, HostsConfig, OAUTH_TOKEN_KEY};
//!
//! # fn example() -> Result<(), hubcli_common::ConfigError> {
//! let credentials = EnvCredentials::new(HostsConfig::load()?);
//! let token = credentials.get("github.com", OAUTH_TOKEN_KEY)?;
//! # let _ = token;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credentials;
pub mod debug;
pub mod error;
pub mod hostname;

pub use config::{HostEntry, HostsConfig};
pub use credentials::{CredentialLookup, EnvCredentials, NoCredentials, OAUTH_TOKEN_KEY};
pub use debug::{debug_enabled_with, is_debug_enabled};
pub use error::{ConfigError, Result};
pub use hostname::{DEFAULT_HOSTNAME, LOCALHOST, normalize_hostname};
