//! Host-keyed credential lookup.
//!
//! The HTTP layer only ever reads credentials; it never stores or refreshes them.
//! Anything able to answer "what is `key` for `host`?" can back an authenticated client.

use std::fmt;
use std::sync::Arc;

use crate::error::{ConfigError, Result};
use crate::hostname::{DEFAULT_HOSTNAME, LOCALHOST};

/// Credential kind holding the API token for a host.
pub const OAUTH_TOKEN_KEY: &str = "oauth_token";

/// A store mapping `(host, credential kind)` to a secret value.
///
/// Implementations are queried once per outgoing request and must be safe to call
/// from several requests at once. A lookup failure is not fatal to the request that
/// triggered it: the request simply goes out without credentials.
pub trait CredentialLookup: Send + Sync {
    /// Returns the value stored for `key` on `host`.
    ///
    /// `host` is expected in the form produced by [`crate::normalize_hostname`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] when nothing is stored, or another
    /// [`ConfigError`] when the backing store cannot be read.
    fn get(&self, host: &str, key: &str) -> Result<String>;
}

impl<T: CredentialLookup + ?Sized> CredentialLookup for Arc<T> {
    fn get(&self, host: &str, key: &str) -> Result<String> {
        (**self).get(host, key)
    }
}

impl<T: CredentialLookup + ?Sized> CredentialLookup for Box<T> {
    fn get(&self, host: &str, key: &str) -> Result<String> {
        (**self).get(host, key)
    }
}

type EnvReader = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Layers token environment variables over another credential store.
///
/// For [`OAUTH_TOKEN_KEY`] the environment wins:
/// - `GH_TOKEN`, then `GITHUB_TOKEN` for `github.com` and `github.localhost`
/// - `GH_ENTERPRISE_TOKEN`, then `GITHUB_ENTERPRISE_TOKEN` for every other host
///
/// Empty variables are ignored. Every other key is answered by the inner store.
#[derive(Clone)]
pub struct EnvCredentials<L> {
    inner: L,
    env: EnvReader,
}

impl<L> fmt::Debug for EnvCredentials<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvCredentials").finish_non_exhaustive()
    }
}

impl<L: CredentialLookup> EnvCredentials<L> {
    /// Wraps `inner`, reading overrides from the process environment.
    pub fn new(inner: L) -> Self {
        Self::with_env(inner, |name| std::env::var(name).ok())
    }

    /// Wraps `inner`, reading overrides through `env` instead of the process environment.
    pub fn with_env<F>(inner: L, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            inner,
            env: Arc::new(env),
        }
    }

    /// Returns the token supplied by the environment for `host`, if any.
    #[must_use]
    pub fn token_from_env(&self, host: &str) -> Option<String> {
        let names: [&str; 2] = if host == DEFAULT_HOSTNAME || host == LOCALHOST {
            ["GH_TOKEN", "GITHUB_TOKEN"]
        } else {
            ["GH_ENTERPRISE_TOKEN", "GITHUB_ENTERPRISE_TOKEN"]
        };

        names
            .iter()
            .filter_map(|name| (self.env)(name))
            .find(|value| !value.is_empty())
    }
}

impl<L: CredentialLookup> CredentialLookup for EnvCredentials<L> {
    fn get(&self, host: &str, key: &str) -> Result<String> {
        if key == OAUTH_TOKEN_KEY
            && let Some(token) = self.token_from_env(host)
        {
            log::debug!("using token from environment for {host}");
            return Ok(token);
        }
        self.inner.get(host, key)
    }
}

/// A store with no credentials at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialLookup for NoCredentials {
    fn get(&self, host: &str, key: &str) -> Result<String> {
        Err(ConfigError::not_found(host, key))
    }
}
