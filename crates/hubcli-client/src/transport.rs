//! Turning plain functions into transport layers.
//!
//! The layers [`crate::new_http_client`] installs are named middleware types;
//! `RoundTripFn` is for callers adding their own layers to a
//! [`reqwest_middleware::ClientBuilder`] without declaring a type for each.

use std::fmt;

use async_trait::async_trait;
use futures::future::BoxFuture;
use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};

/// A middleware whose behavior is entirely given by a function.
///
/// The function receives the request and the rest of the chain and decides
/// what to do with them: delegate via [`Next::run`], rewrite the request first,
/// or answer without touching the network at all. `RoundTripFn` itself holds
/// no state and adds no behavior.
///
/// # Examples
///
/// ```
/// use hubcli_client::RoundTripFn;
/// use reqwest::header::{HeaderValue, ACCEPT_LANGUAGE};
///
/// let layer = RoundTripFn::new(|mut req, extensions, next| {
///     req.headers_mut()
///         .insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en"));
///     next.run(req, extensions)
/// });
///
/// let client = reqwest_middleware::ClientBuilder::new(reqwest::Client::new())
///     .with(layer)
///     .build();
/// # let _ = client;
/// ```
pub struct RoundTripFn<F> {
    round_trip: F,
}

impl<F> RoundTripFn<F> {
    /// Wraps `round_trip` as a middleware.
    pub fn new(round_trip: F) -> Self
    where
        F: for<'a> Fn(Request, &'a mut Extensions, Next<'a>) -> BoxFuture<'a, Result<Response>>
            + Send
            + Sync
            + 'static,
    {
        Self { round_trip }
    }
}

impl<F> fmt::Debug for RoundTripFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoundTripFn").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> Middleware for RoundTripFn<F>
where
    F: for<'a> Fn(Request, &'a mut Extensions, Next<'a>) -> BoxFuture<'a, Result<Response>>
        + Send
        + Sync
        + 'static,
{
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        (self.round_trip)(req, extensions, next).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn refuse<'a>(
        _req: Request,
        _extensions: &'a mut Extensions,
        _next: Next<'a>,
    ) -> BoxFuture<'a, Result<Response>> {
        Box::pin(async { Err(reqwest_middleware::Error::Middleware(anyhow::anyhow!("refused"))) })
    }

    #[tokio::test]
    async fn test_delegates_to_function() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("x-layer", "yes"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let layer = RoundTripFn::new(move |mut req, extensions, next| {
            counter.fetch_add(1, Ordering::SeqCst);
            req.headers_mut()
                .insert("x-layer", reqwest::header::HeaderValue::from_static("yes"));
            next.run(req, extensions)
        });

        let client = reqwest_middleware::ClientBuilder::new(reqwest::Client::new())
            .with(layer)
            .build();

        let response = client.get(mock_server.uri()).send().await.unwrap();
        assert_eq!(response.status(), 204);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_short_circuit_error_is_returned_verbatim() {
        let client = reqwest_middleware::ClientBuilder::new(reqwest::Client::new())
            .with(RoundTripFn::new(refuse))
            .build();

        let err = client.get("http://127.0.0.1:9/").send().await.unwrap_err();
        assert!(matches!(err, reqwest_middleware::Error::Middleware(_)));
        assert!(err.to_string().contains("refused"));
    }
}
