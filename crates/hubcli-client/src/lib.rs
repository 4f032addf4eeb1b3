//! # hubcli-client
//!
//! Authenticated HTTP transport for the hubcli command-line tool.
//!
//! The client is a plain reqwest client decorated with a fixed middleware chain:
//! - [`ExtractHeader`]: records the `X-GitHub-SSO` challenge of every response
//! - [`AuthTokenHeader`]: adds `Authorization: token <value>` for the target host
//! - [`DebugLog`]: traces requests and responses when `HUBCLI_DEBUG` is set
//! - [`ResponseCache`]: answers repeated reads from memory when caching is on
//!
//! [`RoundTripFn`] turns any function into a further layer.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use hubcli_client::{HttpClientOptions, new_http_client, sso_url};
//! use hubcli_common::{EnvCredentials, HostsConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let credentials = EnvCredentials::new(HostsConfig::load()?);
//! let client = new_http_client(
//!     HttpClientOptions::builder()
//!         .app_version(env!("CARGO_PKG_VERSION"))
//!         .credentials(Arc::new(credentials))
//!         .build(),
//! )?;
//!
//! let response = client.get("https://api.github.com/user").send().await?;
//! if response.status() == 403
//!     && let Some(url) = sso_url()
//! {
//!     eprintln!("Authorize in your web browser: {url}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cache;
pub mod capture;
pub mod debug_log;
pub mod error;
pub mod extract;
pub mod factory;
pub mod sso;
pub mod transport;

pub use auth::AuthTokenHeader;
pub use cache::{DEFAULT_CACHE_TTL, ResponseCache};
pub use capture::CapturedHeader;
pub use debug_log::{DebugLog, LogSink, log_sink};
pub use error::ClientError;
pub use extract::ExtractHeader;
pub use factory::{DEFAULT_ACCEPT, HttpClientOptions, new_http_client};
pub use reqwest_middleware::ClientWithMiddleware;
pub use sso::{SSO_HEADER, sso_url};
pub use transport::RoundTripFn;
