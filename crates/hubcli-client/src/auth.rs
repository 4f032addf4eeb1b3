//! Per-host token injection.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use http::Extensions;
use hubcli_common::{CredentialLookup, OAUTH_TOKEN_KEY, normalize_hostname};
use reqwest::header::{AUTHORIZATION, HOST, HeaderValue};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};

/// Adds an `Authorization: token <value>` header for the host a request targets.
///
/// The host is the request's explicit `Host` header when set, otherwise the
/// host of its URL, normalized with [`normalize_hostname`]. The credential store
/// is consulted on every request; nothing is cached here.
///
/// A failed lookup, an empty token, or a token that cannot be sent as a header
/// all leave the request as it was. The request then goes out unauthenticated
/// and the server decides what to do about it.
#[derive(Clone)]
pub struct AuthTokenHeader {
    credentials: Arc<dyn CredentialLookup>,
}

impl fmt::Debug for AuthTokenHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthTokenHeader").finish_non_exhaustive()
    }
}

impl AuthTokenHeader {
    /// Injects tokens found in `credentials`.
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialLookup>) -> Self {
        Self { credentials }
    }

    /// Returns the `Authorization` value to send with `req`, if any.
    #[must_use]
    pub fn authorization_for(&self, req: &Request) -> Option<HeaderValue> {
        let hostname = normalize_hostname(&request_host(req));

        let token = match self.credentials.get(&hostname, OAUTH_TOKEN_KEY) {
            Ok(token) if !token.is_empty() => token,
            Ok(_) => {
                log::debug!("empty token stored for {hostname}");
                return None;
            }
            Err(e) => {
                log::debug!("no token for {hostname}: {e}");
                return None;
            }
        };

        match HeaderValue::from_str(&format!("token {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                Some(value)
            }
            Err(_) => {
                log::warn!("token stored for {hostname} is not a valid header value; ignoring it");
                None
            }
        }
    }
}

#[async_trait]
impl Middleware for AuthTokenHeader {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        if let Some(value) = self.authorization_for(&req) {
            req.headers_mut().insert(AUTHORIZATION, value);
        }
        next.run(req, extensions).await
    }
}

/// Returns the host a request is addressed to.
///
/// A non-empty `Host` header takes precedence over the URL.
#[must_use]
pub fn request_host(req: &Request) -> String {
    req.headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .filter(|host| !host.is_empty())
        .or_else(|| req.url().host_str())
        .unwrap_or_default()
        .to_string()
}
