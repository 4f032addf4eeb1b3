//! In-memory response cache.

use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use http::{Extensions, StatusCode, Version};
use reqwest::header::{AUTHORIZATION, HeaderMap};
use reqwest::{Method, Request, Response, ResponseBuilderExt, Url};
use reqwest_middleware::{Middleware, Next, Result};

/// Default time a cached response stays fresh.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct CachedResponse {
    stored_at: Instant,
    url: Url,
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl CachedResponse {
    fn to_response(&self) -> Result<Response> {
        let mut builder = http::Response::builder()
            .status(self.status)
            .version(self.version)
            .url(self.url.clone());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(self.headers.clone());
        }

        let response = builder
            .body(self.body.clone())
            .map_err(|e| reqwest_middleware::Error::Middleware(e.into()))?;
        Ok(Response::from(response))
    }
}

/// Answers repeated read requests from memory for a fixed time.
///
/// Cached requests:
/// - `GET` and `HEAD`
/// - `POST` to a path ending in `/graphql`, when the body is held in memory
///
/// Entries are keyed by method, URL, and fingerprints of the `Authorization`
/// header and request body, so different tokens never share entries. Responses
/// with a status below 500 other than 403 are stored; their bodies are read
/// fully before being handed back. Transport errors are never cached.
pub struct ResponseCache {
    ttl: Duration,
    entries: DashMap<String, CachedResponse>,
}

impl fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl ResponseCache {
    /// Creates an empty cache whose entries stay fresh for `ttl`.
    ///
    /// A zero `ttl` falls back to [`DEFAULT_CACHE_TTL`].
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let ttl = if ttl.is_zero() { DEFAULT_CACHE_TTL } else { ttl };
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    /// How long entries stay fresh.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, fresh or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, key: &str) -> Option<Result<Response>> {
        let hit = self
            .entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.to_response());

        if hit.is_none() {
            self.entries
                .remove_if(key, |_, entry| entry.stored_at.elapsed() >= self.ttl);
        }
        hit
    }

    /// Drops every entry older than the TTL.
    fn purge_expired(&self) {
        self.entries
            .retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
    }
}

fn fingerprint(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

fn cache_key(req: &Request) -> Option<String> {
    let method = req.method();
    let body = if method == Method::GET || method == Method::HEAD {
        None
    } else if method == Method::POST && req.url().path().ends_with("/graphql") {
        Some(fingerprint(req.body()?.as_bytes()?))
    } else {
        return None;
    };
    let auth = req
        .headers()
        .get(AUTHORIZATION)
        .map(|value| fingerprint(value.as_bytes()));

    Some(format!("{method} {} auth={auth:x?} body={body:x?}", req.url()))
}

fn is_cacheable(status: StatusCode) -> bool {
    status.as_u16() < 500 && status != StatusCode::FORBIDDEN
}

#[async_trait]
impl Middleware for ResponseCache {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let Some(key) = cache_key(&req) else {
            return next.run(req, extensions).await;
        };

        if let Some(hit) = self.lookup(&key) {
            log::debug!("cache hit: {key}");
            return hit;
        }

        let response = next.run(req, extensions).await?;
        if !is_cacheable(response.status()) {
            return Ok(response);
        }

        let entry = CachedResponse {
            stored_at: Instant::now(),
            url: response.url().clone(),
            status: response.status(),
            version: response.version(),
            headers: response.headers().clone(),
            body: response.bytes().await?.to_vec(),
        };
        let response = entry.to_response()?;

        self.purge_expired();
        log::debug!("cache store: {key}");
        self.entries.insert(key, entry);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn cached(cache: ResponseCache) -> reqwest_middleware::ClientWithMiddleware {
        reqwest_middleware::ClientBuilder::new(reqwest::Client::new())
            .with_arc(Arc::new(cache))
            .build()
    }

    #[tokio::test]
    async fn test_repeated_get_is_served_from_cache() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("etag", "\"v1\"")
                    .set_body_string("[1,2,3]"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = cached(ResponseCache::default());
        let url = format!("{}/repos", mock_server.uri());

        for _ in 0..3 {
            let response = client.get(&url).send().await.unwrap();
            assert_eq!(response.status(), 200);
            assert_eq!(response.headers()["etag"], "\"v1\"");
            assert_eq!(response.url().as_str(), url);
            assert_eq!(response.text().await.unwrap(), "[1,2,3]");
        }
    }

    #[tokio::test]
    async fn test_expired_entries_are_refetched() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = cached(ResponseCache::new(Duration::from_millis(50)));

        client.get(mock_server.uri()).send().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        client.get(mock_server.uri()).send().await.unwrap();
    }

    #[tokio::test]
    async fn test_stale_entries_for_other_urls_are_dropped_on_store() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let cache = Arc::new(ResponseCache::new(Duration::from_millis(50)));
        let client = reqwest_middleware::ClientBuilder::new(reqwest::Client::new())
            .with_arc(cache.clone())
            .build();

        for n in 0..10 {
            client
                .get(format!("{}/repos/{n}", mock_server.uri()))
                .send()
                .await
                .unwrap();
        }
        assert_eq!(cache.len(), 10);

        tokio::time::sleep(Duration::from_millis(100)).await;
        client
            .get(format!("{}/user", mock_server.uri()))
            .send()
            .await
            .unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_different_tokens_do_not_share_entries() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = cached(ResponseCache::default());
        for token in ["token a", "token b", "token a"] {
            client
                .get(mock_server.uri())
                .header(AUTHORIZATION, token)
                .send()
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_forbidden_and_server_errors_are_not_cached() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forbidden"))
            .respond_with(ResponseTemplate::new(403))
            .expect(2)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(502))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = cached(ResponseCache::default());
        for route in ["/forbidden", "/broken", "/forbidden", "/broken"] {
            client
                .get(format!("{}{route}", mock_server.uri()))
                .send()
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_mutations_bypass_cache() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos"))
            .respond_with(ResponseTemplate::new(201))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = cached(ResponseCache::default());
        for _ in 0..2 {
            client
                .post(format!("{}/repos", mock_server.uri()))
                .body("{}")
                .send()
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_graphql_queries_are_keyed_by_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"data\":{}}"))
            .expect(2)
            .mount(&mock_server)
            .await;

        let cache = Arc::new(ResponseCache::default());
        let client = reqwest_middleware::ClientBuilder::new(reqwest::Client::new())
            .with_arc(cache.clone())
            .build();
        let url = format!("{}/graphql", mock_server.uri());

        for query in ["{viewer{login}}", "{viewer{name}}", "{viewer{login}}"] {
            client.post(&url).body(query).send().await.unwrap();
        }
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_ttl_uses_default() {
        assert_eq!(ResponseCache::new(Duration::ZERO).ttl(), DEFAULT_CACHE_TTL);
        assert!(ResponseCache::default().is_empty());
    }
}
