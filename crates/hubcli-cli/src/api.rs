//! The `api` subcommand.

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use hubcli_client::{ClientWithMiddleware, sso_url};
use hubcli_common::{DEFAULT_HOSTNAME, LOCALHOST, normalize_hostname};
use reqwest::Method;
use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

use crate::{ClientArgs, default_hostname};

/// Arguments for `hubcli api`.
#[derive(clap::Args, Debug)]
pub struct ApiArgs {
    /// Endpoint path (e.g. `user` or `/repos/OWNER/REPO`) or an absolute URL
    endpoint: String,

    /// Host to send the request to
    #[arg(long, default_value_t = default_hostname())]
    hostname: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Extra request header in `key: value` form
    #[arg(short = 'H', long = "header", value_name = "KEY:VALUE")]
    headers: Vec<String>,

    #[command(flatten)]
    pub(crate) client: ClientArgs,
}

/// Root of the REST API for `hostname`.
fn api_base(hostname: &str) -> Result<Url> {
    let host = normalize_hostname(hostname);
    let base = if host == DEFAULT_HOSTNAME {
        "https://api.github.com/".to_string()
    } else if host == LOCALHOST {
        "http://api.github.localhost/".to_string()
    } else {
        format!("https://{host}/api/v3/")
    };
    Url::parse(&base).with_context(|| format!("invalid hostname '{hostname}'"))
}

fn endpoint_url(hostname: &str, endpoint: &str) -> Result<Url> {
    if endpoint.starts_with("https://") || endpoint.starts_with("http://") {
        return Url::parse(endpoint).with_context(|| format!("invalid URL '{endpoint}'"));
    }
    api_base(hostname)?
        .join(endpoint.trim_start_matches('/'))
        .with_context(|| format!("invalid endpoint '{endpoint}'"))
}

fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue)> {
    let Some((name, value)) = raw.split_once(':') else {
        bail!("header '{raw}' is not in 'key: value' form");
    };
    let name = HeaderName::try_from(name.trim())
        .with_context(|| format!("invalid header name in '{raw}'"))?;
    let value = HeaderValue::try_from(value.trim())
        .with_context(|| format!("invalid header value in '{raw}'"))?;
    Ok((name, value))
}

/// Sends the request, prints the body to stdout and reports SSO challenges.
pub async fn run(client: &ClientWithMiddleware, args: &ApiArgs) -> Result<ExitCode> {
    let url = endpoint_url(&args.hostname, &args.endpoint)?;
    let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
        .with_context(|| format!("invalid method '{}'", args.method))?;

    let mut request = client.request(method, url.clone());
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        request = request.header(name, value);
    }

    log::debug!("sending request to {url}");
    let response = request.send().await.context("request failed")?;
    let status = response.status();
    let body = response.bytes().await.context("failed to read response body")?;

    std::io::stdout()
        .write_all(&body)
        .context("failed to write response")?;

    if status.is_success() {
        return Ok(ExitCode::SUCCESS);
    }

    eprintln!("{} HTTP {status}", "error:".bright_red());
    if let Some(url) = sso_url() {
        eprintln!(
            "{} Authorize in your web browser: {}",
            "!".bright_yellow(),
            url.as_str().bold()
        );
    }
    Ok(ExitCode::FAILURE)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_endpoint_url_for_github() {
        let url = endpoint_url("github.com", "/repos/o/r").unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/repos/o/r");
    }

    #[test]
    fn test_endpoint_url_for_enterprise() {
        let url = endpoint_url("GHE.Example.com", "user").unwrap();
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/user");
    }

    #[test]
    fn test_absolute_endpoint_is_used_verbatim() {
        let url = endpoint_url("github.com", "https://uploads.github.com/x").unwrap();
        assert_eq!(url.as_str(), "https://uploads.github.com/x");
    }

    #[test]
    fn test_parse_header() {
        let (name, value) = parse_header("Accept: application/vnd.github.raw").unwrap();
        assert_eq!(name, "accept");
        assert_eq!(value, "application/vnd.github.raw");
        assert!(parse_header("no-colon").is_err());
    }
}
