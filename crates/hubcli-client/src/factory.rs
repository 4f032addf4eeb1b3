//! Assembling the authenticated client.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use hubcli_common::{CredentialLookup, is_debug_enabled};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest_middleware::ClientWithMiddleware;
use typed_builder::TypedBuilder;

use crate::auth::AuthTokenHeader;
use crate::cache::{DEFAULT_CACHE_TTL, ResponseCache};
use crate::capture::CapturedHeader;
use crate::debug_log::{DebugLog, LogSink};
use crate::error::ClientError;
use crate::extract::ExtractHeader;
use crate::sso::SSO_HEADER;

/// Media types requested unless [`HttpClientOptions::skip_accept_headers`] is set.
pub const DEFAULT_ACCEPT: &str =
    "application/vnd.github.merge-info-preview+json, application/vnd.github.nebula-preview";

const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Options for [`new_http_client`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use hubcli_client::HttpClientOptions;
/// use hubcli_common::NoCredentials;
///
/// let options = HttpClientOptions::builder()
///     .app_version("1.2.3")
///     .credentials(Arc::new(NoCredentials))
///     .enable_cache(true)
///     .cache_ttl(Duration::from_secs(3600))
///     .build();
/// # let _ = options;
/// ```
#[derive(Clone, TypedBuilder)]
pub struct HttpClientOptions {
    /// Version reported in the `User-Agent` header.
    #[builder(setter(into))]
    pub app_version: String,

    /// How long cached responses stay fresh.
    #[builder(default = DEFAULT_CACHE_TTL)]
    pub cache_ttl: Duration,

    /// Store consulted for each request's token.
    pub credentials: Arc<dyn CredentialLookup>,

    /// Whether read requests are answered from an in-memory cache.
    #[builder(default)]
    pub enable_cache: bool,

    /// Where wire traces go when debugging is enabled in the environment.
    #[builder(default, setter(strip_option))]
    pub log: Option<LogSink>,

    /// Suppress the default `Accept` header.
    #[builder(default)]
    pub skip_accept_headers: bool,

    /// Cell receiving `X-GitHub-SSO` values.
    #[builder(default = CapturedHeader::global())]
    pub sso_header: CapturedHeader,
}

impl fmt::Debug for HttpClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClientOptions")
            .field("app_version", &self.app_version)
            .field("cache_ttl", &self.cache_ttl)
            .field("enable_cache", &self.enable_cache)
            .field("log", &self.log.as_ref().map(|_| "LogSink"))
            .field("skip_accept_headers", &self.skip_accept_headers)
            .finish_non_exhaustive()
    }
}

impl HttpClientOptions {
    /// Headers the underlying client adds to requests that don't set them.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidHeader`] if the application version cannot
    /// be sent as a header value.
    pub fn default_headers(&self) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            header_value(&USER_AGENT, &format!("hubcli {}", self.app_version))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        if !self.skip_accept_headers {
            headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        }
        Ok(headers)
    }
}

fn header_value(name: &HeaderName, value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value).map_err(|source| ClientError::InvalidHeader {
        name: name.to_string(),
        source,
    })
}

/// Builds the HTTP client used for every API call.
///
/// Requests pass through, outermost first:
///
/// 1. [`ExtractHeader`] recording `X-GitHub-SSO` into `options.sso_header`
/// 2. [`AuthTokenHeader`] adding the token for the target host
/// 3. [`DebugLog`], when `HUBCLI_DEBUG` is set and a sink was given
/// 4. [`ResponseCache`], when caching is enabled
/// 5. the reqwest client, which adds the default headers and does the I/O
///
/// # Errors
///
/// Returns an error if the default headers are invalid or the reqwest client
/// cannot be built. Nothing after that point can fail.
pub fn new_http_client(options: HttpClientOptions) -> Result<ClientWithMiddleware, ClientError> {
    build_client(options, is_debug_enabled())
}

pub(crate) fn build_client(
    options: HttpClientOptions,
    debug_enabled: bool,
) -> Result<ClientWithMiddleware, ClientError> {
    let base = reqwest::Client::builder()
        .default_headers(options.default_headers()?)
        .build()?;

    let mut builder = reqwest_middleware::ClientBuilder::new(base)
        .with(ExtractHeader::new(
            HeaderName::from_static(SSO_HEADER),
            options.sso_header,
        ))
        .with(AuthTokenHeader::new(options.credentials));

    if debug_enabled && let Some(sink) = options.log {
        builder = builder.with(DebugLog::new(sink));
    }

    if options.enable_cache {
        log::debug!("response cache enabled, ttl {:?}", options.cache_ttl);
        builder = builder.with(ResponseCache::new(options.cache_ttl));
    }

    Ok(builder.build())
}
