//! Wire-level request tracing for `HUBCLI_DEBUG`.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use http::Extensions;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};

/// Destination for debug traces, shared between clients and threads.
pub type LogSink = Arc<Mutex<dyn Write + Send>>;

/// Wraps a writer as a [`LogSink`].
pub fn log_sink<W: Write + Send + 'static>(writer: W) -> LogSink {
    Arc::new(Mutex::new(writer))
}

const REDACTED: &str = "token [REDACTED]";

/// Writes a human-readable trace of every round trip to a [`LogSink`].
///
/// ```text
/// * Request at 2024-05-01T10:00:00.000Z
/// > GET https://api.github.com/user
/// > authorization: token [REDACTED]
/// < HTTP/1.1 200 OK
/// < content-type: application/json
/// * Request took 84ms
/// ```
///
/// Headers added by the underlying client after the chain runs (its defaults)
/// do not appear. Failing to write the trace never fails the request.
#[derive(Clone)]
pub struct DebugLog {
    sink: LogSink,
}

impl fmt::Debug for DebugLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugLog").finish_non_exhaustive()
    }
}

impl DebugLog {
    /// Traces into `sink`.
    #[must_use]
    pub fn new(sink: LogSink) -> Self {
        Self { sink }
    }

    fn emit(&self, lines: &[String]) {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let result = lines
            .iter()
            .try_for_each(|line| writeln!(sink, "{line}"))
            .and_then(|()| sink.flush());

        if let Err(e) = result {
            log::warn!("failed to write debug trace: {e}");
        }
    }
}

fn header_lines(prefix: char, headers: &HeaderMap) -> impl Iterator<Item = String> + '_ {
    headers.iter().map(move |(name, value)| {
        let value = if name == AUTHORIZATION {
            REDACTED.into()
        } else {
            String::from_utf8_lossy(value.as_bytes())
        };
        format!("{prefix} {name}: {value}")
    })
}

#[async_trait]
impl Middleware for DebugLog {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let started = Instant::now();

        let mut lines = vec![
            format!(
                "* Request at {}",
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
            format!("> {} {}", req.method(), req.url()),
        ];
        lines.extend(header_lines('>', req.headers()));
        self.emit(&lines);

        let result = next.run(req, extensions).await;

        let mut lines = Vec::new();
        match &result {
            Ok(response) => {
                lines.push(format!("< {:?} {}", response.version(), response.status()));
                lines.extend(header_lines('<', response.headers()));
                lines.push(format!("* Request took {:?}", started.elapsed()));
            }
            Err(e) => lines.push(format!("* Request failed: {e}")),
        }
        self.emit(&lines);

        result
    }
}
