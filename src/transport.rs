/*!
 * Single-shot HTTP transport shared by all providers.
 *
 * A call is bound to a `CallContext`: a cancellation token plus an optional
 * deadline. The exchange is raced against both, so a cancelled or expired
 * call returns immediately and never yields a partial response.
 */

use async_trait::async_trait;
use log::trace;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::fmt::Debug;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::errors::TransportFailure;

/// Cancellation and deadline for one operation
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that only ends when cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now
    ///
    /// A timeout too large to represent as an instant means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => Self::new(),
        }
    }

    /// A context that expires at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Use an existing token, e.g. one wired to Ctrl-C
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// A context cancelled together with this one, keeping the same deadline
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel every call bound to this context
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Time left before the deadline, `None` when there is no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Fail fast when the context already ended
    pub fn check(&self) -> Result<(), TransportFailure> {
        if self.token.is_cancelled() {
            return Err(TransportFailure::Canceled);
        }
        if self.remaining() == Some(Duration::ZERO) {
            return Err(TransportFailure::DeadlineExceeded);
        }
        Ok(())
    }

    /// Resolves once the context is cancelled or its deadline passes
    pub async fn done(&self) -> TransportFailure {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.token.cancelled() => TransportFailure::Canceled,
                _ = tokio::time::sleep_until(deadline) => TransportFailure::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                TransportFailure::Canceled
            }
        }
    }
}

/// Outbound JSON POST
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Full request URL, query included
    pub url: String,
    /// Backend-specific headers (auth, versioning)
    pub headers: Vec<(String, String)>,
    /// Serialized JSON body
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of the first header named `name`, case-insensitive
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and raw body of a completed exchange
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes one JSON POST per call
///
/// Implementations set `Content-Type: application/json` themselves and never
/// retry. Provider-specific headers arrive in the request.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn post_json(
        &self,
        ctx: &CallContext,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportFailure>;
}

/// reqwest-backed transport
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with a default client
    ///
    /// The client carries no timeout of its own; deadlines come from the
    /// `CallContext` of each call.
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        ctx: &CallContext,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportFailure> {
        ctx.check()?;

        let mut builder = self
            .client
            .post(&request.url)
            .header(CONTENT_TYPE, "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let builder = builder.body(request.body);

        let exchange = async move {
            // URLs may carry an API key, keep them out of error text
            let response = builder
                .send()
                .await
                .map_err(|e| TransportFailure::Connection(e.without_url().to_string()))?;
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| TransportFailure::Body(e.without_url().to_string()))?;
            trace!("HTTP {} with {} byte body", status, body.len());
            Ok(HttpResponse { status, body })
        };

        tokio::select! {
            biased;
            failure = ctx.done() => Err(failure),
            result = exchange => result,
        }
    }
}
