//! Capturing a named header from every successful response.

use async_trait::async_trait;
use http::Extensions;
use reqwest::header::HeaderName;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};

use crate::capture::CapturedHeader;

/// Records the value of one response header into a [`CapturedHeader`].
///
/// The request is passed on untouched. When the rest of the chain answers with a
/// response carrying a non-empty `name` header, its value overwrites the
/// destination. Responses without the header and failed round trips leave the
/// destination as it was. The response or error is returned unchanged either way.
#[derive(Debug, Clone)]
pub struct ExtractHeader {
    name: HeaderName,
    dest: CapturedHeader,
}

impl ExtractHeader {
    /// Captures `name` into `dest`.
    #[must_use]
    pub const fn new(name: HeaderName, dest: CapturedHeader) -> Self {
        Self { name, dest }
    }

    /// Name of the captured header.
    #[must_use]
    pub const fn header_name(&self) -> &HeaderName {
        &self.name
    }

    fn capture(&self, response: &Response) {
        let Some(value) = response.headers().get(&self.name) else {
            return;
        };
        if value.is_empty() {
            return;
        }

        let value = String::from_utf8_lossy(value.as_bytes());
        log::debug!("captured {} header from {}", self.name, response.url());
        self.dest.set(value);
    }
}

#[async_trait]
impl Middleware for ExtractHeader {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let response = next.run(req, extensions).await?;
        self.capture(&response);
        Ok(response)
    }
}
