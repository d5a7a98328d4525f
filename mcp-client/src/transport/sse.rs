// mcp-client/src/transport/sse.rs
//! Client transport for SSE: receives messages over a Server-Sent Events
//! stream and sends each outbound message as a separate POST request.
//!
//! The POST target is not known up front. The server announces it with an
//! `endpoint` event on the stream, and [`SseClientTransport::start`] does not
//! return until that event has arrived.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use mcp_protocol::{codec, messages::JsonRpcMessage};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use super::set_once::SetOnce;
use super::{Callbacks, Lifecycle, Transport, TransportState};
use crate::error::TransportError;

/// Builder for [`SseClientTransport`]
pub struct SseClientTransportBuilder {
    url: String,
    client: Option<reqwest::Client>,
    headers: HeaderMap,
    reconnection_time: Option<Duration>,
}

impl SseClientTransportBuilder {
    /// Create a builder for a transport connecting to `url`
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: None,
            headers: HeaderMap::new(),
            reconnection_time: None,
        }
    }

    /// Use an existing HTTP client instead of a default one
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Add a header sent with the stream request and with every POST
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add several headers at once
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Delay an outer layer should wait before reconnecting, unless the
    /// server advertises its own
    pub fn reconnection_time(mut self, delay: Duration) -> Self {
        self.reconnection_time = Some(delay);
        self
    }

    /// Build the transport
    pub fn build(self) -> Result<SseClientTransport, TransportError> {
        let url = Url::parse(&self.url).map_err(|source| TransportError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;

        Ok(SseClientTransport {
            inner: Arc::new(Inner {
                http: self.client.unwrap_or_default(),
                url,
                headers: self.headers,
                reconnection_time: StdMutex::new(self.reconnection_time),
                lifecycle: Lifecycle::default(),
                callbacks: Callbacks::default(),
                endpoint: SetOnce::new(),
            }),
            task: Mutex::new(None),
        })
    }
}

/// SSE client transport
pub struct SseClientTransport {
    inner: Arc<Inner>,
    task: Mutex<Option<JoinHandle<()>>>,
}

struct Inner {
    http: reqwest::Client,
    url: Url,
    headers: HeaderMap,
    reconnection_time: StdMutex<Option<Duration>>,
    lifecycle: Lifecycle,
    callbacks: Callbacks,
    endpoint: SetOnce<Result<Url, TransportError>>,
}

impl SseClientTransport {
    /// Start building a transport for the stream at `url`
    pub fn builder(url: &str) -> SseClientTransportBuilder {
        SseClientTransportBuilder::new(url)
    }

    /// Create a transport with default settings
    pub fn new(url: &str) -> Result<Self, TransportError> {
        Self::builder(url).build()
    }

    /// The POST target announced by the server, once known
    pub fn endpoint(&self) -> Option<Url> {
        self.inner.endpoint.get().and_then(Result::ok)
    }

    /// Reconnection delay advertised by the server, or the configured one
    pub fn reconnection_time(&self) -> Option<Duration> {
        *self
            .inner
            .reconnection_time
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Inner {
    async fn connect(&self) -> Result<reqwest::Response, TransportError> {
        debug!("Opening SSE stream at {}", self.url);
        let response = self
            .http
            .get(self.url.clone())
            .headers(self.headers.clone())
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::HttpStatus { status, body });
        }

        Ok(response)
    }

    async fn receive(self: Arc<Self>, response: reqwest::Response) {
        let base = response.url().clone();
        let mut events = std::pin::pin!(response.bytes_stream().eventsource());

        while let Some(event) = events.next().await {
            let event = match event {
                Ok(event) => event,
                Err(err) => {
                    self.fail(err.into());
                    return;
                }
            };

            if let Some(retry) = event.retry {
                debug!("Server advertised reconnection time of {:?}", retry);
                *self
                    .reconnection_time
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(retry);
            }

            match event.event.as_str() {
                "open" => debug!("SSE stream open, waiting for endpoint"),
                "endpoint" => {
                    if let Err(err) = self.resolve_endpoint(&base, &event.data) {
                        self.fail(err);
                        return;
                    }
                }
                "error" => {
                    self.fail(TransportError::ServerEvent(event.data));
                    return;
                }
                _ => match codec::decode(&event.data) {
                    Ok(message) => self.callbacks.message(message),
                    Err(err) => self.callbacks.error(&err.into()),
                },
            }
        }

        if self.endpoint.get().is_none() {
            self.fail(TransportError::StreamEnded);
        } else {
            warn!(
                "SSE stream from {} ended, no further messages will be received",
                self.url
            );
        }
    }

    fn resolve_endpoint(&self, base: &Url, data: &str) -> Result<(), TransportError> {
        if let Some(current) = self.endpoint.get() {
            warn!(
                "Ignoring repeated endpoint event {:?}, already resolved to {:?}",
                data, current
            );
            return Ok(());
        }

        let path = data.trim();
        let endpoint = base
            .join(path)
            .map_err(|source| TransportError::InvalidEndpoint {
                endpoint: path.to_string(),
                source,
            })?;

        debug!("Resolved SSE endpoint: {}", endpoint);
        if self.endpoint.set(Ok(endpoint)).is_err() {
            warn!("Endpoint already settled, ignoring {:?}", path);
        }
        Ok(())
    }

    async fn post(&self, endpoint: Url, message: &JsonRpcMessage) -> Result<(), TransportError> {
        let body = codec::encode(message)?;
        debug!("Sending message to {}: {}", endpoint, body);

        let response = self
            .http
            .post(endpoint)
            .headers(self.headers.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::HttpStatus { status, body });
        }

        Ok(())
    }

    /// Report a fatal error and close.
    fn fail(&self, err: TransportError) {
        self.callbacks.error(&err);
        self.shutdown(err);
    }

    /// Settle the endpoint with `reason` if still pending, then close.
    fn shutdown(&self, reason: TransportError) {
        // Wakes any start or send still waiting for the endpoint.
        let _ = self.endpoint.set(Err(reason));

        if self.lifecycle.finish() != TransportState::Closed {
            debug!("Closing SSE transport for {}", self.url);
        }
        self.callbacks.close();
    }
}

struct StartGuard<'a> {
    inner: &'a Inner,
    armed: bool,
}

impl StartGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for StartGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("SSE start cancelled before the stream was established");
            self.inner.shutdown(TransportError::Closed);
        }
    }
}

#[async_trait]
impl Transport for SseClientTransport {
    async fn start(&self) -> Result<(), TransportError> {
        if let Err(err) = self.inner.lifecycle.begin() {
            self.inner.callbacks.error(&err);
            return Err(err);
        }

        // Closes the transport if this future is dropped before the
        // receive task exists, so no send waits on an endpoint nobody reads.
        let guard = StartGuard {
            inner: &self.inner,
            armed: true,
        };

        let response = match self.inner.connect().await {
            Ok(response) => response,
            Err(err) => {
                guard.disarm();
                self.inner.fail(err.clone());
                return Err(err);
            }
        };

        {
            let mut task = self.task.lock().await;
            if self.inner.lifecycle.get() == TransportState::Closed {
                guard.disarm();
                return Err(TransportError::Closed);
            }
            let inner = Arc::clone(&self.inner);
            *task = Some(tokio::spawn(inner.receive(response)));
            guard.disarm();
        }

        let endpoint = self.inner.endpoint.wait().await?;
        debug!("SSE transport ready, posting to {}", endpoint);
        Ok(())
    }

    async fn send(&self, message: JsonRpcMessage) -> Result<(), TransportError> {
        let endpoint = match self.inner.lifecycle.get() {
            TransportState::NotStarted => Err(TransportError::NotStarted),
            TransportState::Closed => Err(TransportError::Closed),
            // Suspends while the endpoint event is still outstanding.
            TransportState::Started => self.inner.endpoint.wait().await,
        };

        let result = match endpoint {
            Ok(endpoint) => self.inner.post(endpoint, &message).await,
            Err(err) => Err(err),
        };

        if let Err(err) = &result {
            self.inner.callbacks.error(err);
        }
        result
    }

    async fn close(&self) -> Result<(), TransportError> {
        if self.inner.lifecycle.get() == TransportState::NotStarted {
            let err = TransportError::NotStarted;
            self.inner.callbacks.error(&err);
            return Err(err);
        }

        self.inner.shutdown(TransportError::Closed);

        let task = self.task.lock().await.take();
        if let Some(task) = task {
            task.abort();
            if let Err(err) = task.await {
                if err.is_panic() {
                    warn!("SSE receive task panicked: {}", err);
                }
            }
        }

        Ok(())
    }

    fn callbacks(&self) -> &Callbacks {
        &self.inner.callbacks
    }

    fn state(&self) -> TransportState {
        self.inner.lifecycle.get()
    }
}

impl Drop for SseClientTransport {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn rejects_invalid_base_url() {
        let err = SseClientTransport::new("not a url").err().unwrap();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn builder_keeps_configured_reconnection_time() {
        let transport = SseClientTransport::builder("http://localhost:3000/sse")
            .reconnection_time(Duration::from_secs(3))
            .header(
                HeaderName::from_static("x-api-key"),
                HeaderValue::from_static("secret"),
            )
            .build()
            .unwrap();

        assert_eq!(transport.reconnection_time(), Some(Duration::from_secs(3)));
        assert_eq!(transport.endpoint(), None);
        assert_eq!(transport.state(), TransportState::NotStarted);
    }

    #[tokio::test]
    async fn send_before_start_fails() {
        let transport = SseClientTransport::new("http://localhost:3000/sse").unwrap();
        let err = transport
            .send(JsonRpcMessage::notification("ping", None))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::NotStarted));
    }

    #[tokio::test]
    async fn close_before_start_fails() {
        let transport = SseClientTransport::new("http://localhost:3000/sse").unwrap();
        assert!(matches!(
            transport.close().await,
            Err(TransportError::NotStarted)
        ));
        assert_eq!(transport.state(), TransportState::NotStarted);
    }
}
