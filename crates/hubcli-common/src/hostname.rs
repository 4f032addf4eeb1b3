//! Canonical hostname form used to key stored credentials.

/// The public GitHub host.
pub const DEFAULT_HOSTNAME: &str = "github.com";

/// Host used by local development instances.
pub const LOCALHOST: &str = "github.localhost";

/// Normalizes a hostname the way the credential store keys hosts.
///
/// - lower-cases the input
/// - drops a leading `scheme://` and anything from the first `/` after it
/// - drops a `:port` suffix (bracketed IPv6 literals keep their brackets)
/// - drops a trailing `.`
/// - collapses any subdomain of [`DEFAULT_HOSTNAME`] or [`LOCALHOST`] to that host,
///   so `api.github.com` and `github.com` share credentials
///
/// # Examples
///
/// ```
/// use hubcli_common::normalize_hostname;
///
/// assert_eq!(normalize_hostname("API.GitHub.com:443"), "github.com");
/// assert_eq!(normalize_hostname("ghe.example.com"), "ghe.example.com");
/// ```
#[must_use]
pub fn normalize_hostname(host: &str) -> String {
    let mut hostname = host.trim().to_lowercase();

    if let Some((_, rest)) = hostname.split_once("://") {
        hostname = rest.to_string();
    }
    if let Some(idx) = hostname.find('/') {
        hostname.truncate(idx);
    }

    strip_port(&mut hostname);

    if hostname.ends_with('.') {
        hostname.pop();
    }

    for root in [DEFAULT_HOSTNAME, LOCALHOST] {
        if hostname
            .strip_suffix(root)
            .is_some_and(|prefix| prefix.ends_with('.'))
        {
            return root.to_string();
        }
    }

    hostname
}

fn strip_port(hostname: &mut String) {
    if hostname.starts_with('[') {
        // [::1]:8080
        if let Some(end) = hostname.find(']') {
            hostname.truncate(end + 1);
        }
        return;
    }

    if let Some((host, port)) = hostname.rsplit_once(':')
        && !host.contains(':')
        && port.chars().all(|c| c.is_ascii_digit())
    {
        let len = host.len();
        hostname.truncate(len);
    }
}
