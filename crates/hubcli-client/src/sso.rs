//! SAML single sign-on challenges.
//!
//! When an organization enforces SSO and the token in use has not been
//! authorized for it, the API answers with an `X-GitHub-SSO` header such as
//!
//! ```text
//! X-GitHub-SSO: required; url=https://github.com/orgs/acme/sso?authorization_request=AbC
//! ```
//!
//! Clients built by [`crate::new_http_client`] capture that header; [`sso_url`]
//! turns the latest capture into the URL a user has to visit.

use crate::capture::CapturedHeader;

/// Response header carrying the SSO challenge.
pub const SSO_HEADER: &str = "x-github-sso";

/// Returns the SSO URL from the most recent challenge seen by any client
/// using the process-wide capture cell.
///
/// Returns `None` before any challenge was seen, and when the latest captured
/// header holds no `url=` attribute.
#[must_use]
pub fn sso_url() -> Option<String> {
    CapturedHeader::global().sso_url()
}

impl CapturedHeader {
    /// Returns the SSO URL embedded in the value captured by this cell.
    #[must_use]
    pub fn sso_url(&self) -> Option<String> {
        self.get()
            .as_deref()
            .and_then(parse_sso_url)
            .map(str::to_string)
    }
}

/// Extracts the `url` attribute from an `X-GitHub-SSO` header value.
///
/// The value is a `;`-separated list of `key=value` attributes. The first
/// attribute whose key is exactly `url` and whose value is non-empty wins; the
/// value is returned as written, without decoding.
///
/// Only whole attributes are considered: a `url=` buried inside another
/// attribute, as in `required url=...` or `a=url=...`, is not recognized.
///
/// # Examples
///
/// ```
/// use hubcli_client::sso::parse_sso_url;
///
/// assert_eq!(
///     parse_sso_url("url=https://example.com/sso; other=x"),
///     Some("https://example.com/sso"),
/// );
/// assert_eq!(parse_sso_url("foo=bar"), None);
/// ```
#[must_use]
pub fn parse_sso_url(value: &str) -> Option<&str> {
    value.split(';').find_map(|attribute| {
        let (key, url) = attribute.trim_start().split_once('=')?;
        (key == "url" && !url.is_empty()).then_some(url)
    })
}
