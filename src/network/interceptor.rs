// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network interceptor for capturing fetch and request-object traffic
//!
//! [`NetworkLogger::setup_interceptor`] swaps a host's entry points for
//! logging wrappers. The wrappers delegate every call unchanged and push one
//! [`TrafficRecord`] per settled call into the [`LogStore`].

use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use parking_lot::Mutex;

use super::config::LoggerConfig;
use super::host::{Fetch, NetworkHost};
use super::normalize::{
    header_map_fields, normalize_headers, normalize_optional_body, parse_raw_header_block,
    render_xhr_response, truncate_body,
};
use super::record::{HeaderFields, RecordBuilder, TrafficRecord};
use super::store::{LogStore, Snapshot, Subscription};
use super::xhr::{
    ErrorHandler, HandlerSlot, ReadyState, ReadyStateEvent, ReadyStateHandler, ResponseType,
    XhrFactory, XhrRequest,
};
use crate::error::Result;
use crate::http::{Body, FetchInput, FetchOptions, Response};

lazy_static! {
    static ref NETWORK_LOGGER: NetworkLogger = NetworkLogger::new(LoggerConfig::default());
}

/// The process-wide logger, created on first use
pub fn network_logger() -> &'static NetworkLogger {
    &NETWORK_LOGGER
}

/// Front door for installing interception and reading the log
#[derive(Debug, Clone)]
pub struct NetworkLogger {
    store: LogStore,
    config: LoggerConfig,
}

impl NetworkLogger {
    /// Create a logger with its own store
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            store: LogStore::new(&config),
            config,
        }
    }

    /// Wrap the host's fetch and request-object entry points.
    ///
    /// Returns `true` only for the call that actually installed the hooks.
    /// Nothing is installed while the logger is disabled, and a host is
    /// never wrapped twice.
    pub fn setup_interceptor(&self, host: &NetworkHost) -> bool {
        if !self.store.is_enabled() {
            tracing::debug!("network logger disabled, interceptor not installed");
            return false;
        }

        let capture = Capture {
            store: self.store.clone(),
            max_body_size: self.config.max_body_size,
        };
        let xhr_capture = capture.clone();

        let installed = host.intercept(
            move |fetch| -> Arc<dyn Fetch> { Arc::new(LoggingFetch::new(fetch, capture)) },
            move |xhr| -> Arc<dyn XhrFactory> {
                Arc::new(LoggingXhrFactory::new(xhr, xhr_capture))
            },
        );

        if installed {
            tracing::info!(
                max_entries = self.store.capacity(),
                "network interceptor installed"
            );
        } else {
            tracing::debug!("network interceptor already installed on this host");
        }
        installed
    }

    /// Register a callback receiving a snapshot after every change
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Snapshot) + Send + Sync + 'static,
    {
        self.store.subscribe(callback)
    }

    /// Remove every record
    pub fn clear_logs(&self) {
        self.store.clear();
    }

    pub fn enable(&self) {
        self.store.enable();
    }

    pub fn disable(&self) {
        self.store.disable();
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_enabled()
    }

    /// Current records, newest first
    pub fn logs(&self) -> Snapshot {
        self.store.snapshot()
    }

    pub fn log_count(&self) -> usize {
        self.store.len()
    }

    /// Underlying store
    pub fn store(&self) -> &LogStore {
        &self.store
    }
}

impl Default for NetworkLogger {
    fn default() -> Self {
        Self::new(LoggerConfig::default())
    }
}

/// What the wrappers need to settle a record
#[derive(Clone)]
struct Capture {
    store: LogStore,
    max_body_size: Option<usize>,
}

impl Capture {
    fn body(&self, body: String) -> String {
        truncate_body(body, self.max_body_size)
    }

    fn push(&self, record: TrafficRecord) {
        tracing::debug!(
            id = record.id(),
            method = record.method(),
            url = record.url(),
            status = record.response().map(|r| r.status),
            failed = record.is_failed(),
            duration_ms = record.duration().as_millis() as u64,
            "captured network call"
        );
        self.store.record(record);
    }
}

/// Fetch wrapper recording every settled call
pub struct LoggingFetch {
    inner: Arc<dyn Fetch>,
    capture: Capture,
}

impl LoggingFetch {
    fn new(inner: Arc<dyn Fetch>, capture: Capture) -> Self {
        Self { inner, capture }
    }

    fn open_record(&self, input: &FetchInput, init: Option<&FetchOptions>) -> RecordBuilder {
        let request = match input {
            FetchInput::Request(request) => Some(request),
            FetchInput::Url(_) => None,
        };

        let method = init
            .and_then(|o| o.method.clone())
            .or_else(|| request.map(|r| r.method.to_string()))
            .unwrap_or_else(|| "GET".to_string());

        let headers = match (init.and_then(|o| o.headers.as_ref()), request) {
            (Some(headers), _) => normalize_headers(headers),
            (None, Some(request)) => header_map_fields(&request.headers),
            (None, None) => HeaderFields::new(),
        };

        let body: Option<&Body> = init
            .and_then(|o| o.body.as_ref())
            .or_else(|| request.and_then(|r| r.body.as_ref()));

        let mut builder = RecordBuilder::new(method, input.url());
        builder.set_headers(headers);
        builder.set_body(normalize_optional_body(body).map(|b| self.capture.body(b)));
        builder
    }
}

#[async_trait]
impl Fetch for LoggingFetch {
    async fn fetch(&self, input: FetchInput, init: Option<FetchOptions>) -> Result<Response> {
        let builder = self.open_record(&input, init.as_ref());

        match self.inner.fetch(input, init).await {
            Ok(response) => {
                // Read the duplicate; the caller's response is returned untouched
                let copy = response.clone();
                let body = copy.text_lossy();
                let record = builder.complete(
                    copy.status_code(),
                    copy.status_text,
                    header_map_fields(&copy.headers),
                    self.capture.body(body),
                );
                self.capture.push(record);
                Ok(response)
            }
            Err(error) => {
                self.capture.push(builder.fail(error.to_string()));
                Err(error)
            }
        }
    }
}

/// Request-object factory producing [`LoggedXhr`] wrappers
pub struct LoggingXhrFactory {
    inner: Arc<dyn XhrFactory>,
    capture: Capture,
}

impl LoggingXhrFactory {
    fn new(inner: Arc<dyn XhrFactory>, capture: Capture) -> Self {
        Self { inner, capture }
    }
}

impl XhrFactory for LoggingXhrFactory {
    fn create(&self) -> Box<dyn XhrRequest> {
        Box::new(LoggedXhr::new(self.inner.create(), self.capture.clone()))
    }
}

/// Capture progress of one request object
enum XhrCapture {
    /// Collecting method, URL and headers
    Capturing(RecordBuilder),
    /// Sent; waiting for the terminal ready state
    Sent(RecordBuilder),
    /// Pushed to the store
    Settled,
}

/// Request object wrapper recording the exchange it carries
pub struct LoggedXhr {
    inner: Box<dyn XhrRequest>,
    state: Arc<Mutex<XhrCapture>>,
    caller_handler: Arc<HandlerSlot<ReadyStateHandler>>,
    capture: Capture,
}

impl LoggedXhr {
    fn new(mut inner: Box<dyn XhrRequest>, capture: Capture) -> Self {
        let state = Arc::new(Mutex::new(XhrCapture::Capturing(RecordBuilder::new("", ""))));
        let caller_handler = Arc::new(HandlerSlot::new());

        // The wrapper owns the inner handler slot for the object's lifetime;
        // the caller's handler is chained behind it.
        let handler_state = state.clone();
        let handler_slot = caller_handler.clone();
        let handler_capture = capture.clone();
        inner.set_on_ready_state_change(Some(Box::new(move |event: &ReadyStateEvent| {
            if event.is_done() {
                settle(&handler_state, &handler_capture, event);
            }
            handler_slot.call(|handler: &mut ReadyStateHandler| handler(event));
        })));

        Self {
            inner,
            state,
            caller_handler,
            capture,
        }
    }
}

fn settle(state: &Mutex<XhrCapture>, capture: &Capture, event: &ReadyStateEvent) {
    let builder = {
        let mut state = state.lock();
        match std::mem::replace(&mut *state, XhrCapture::Settled) {
            XhrCapture::Sent(builder) => builder,
            other => {
                *state = other;
                return;
            }
        }
    };

    let body = render_xhr_response(&event.response_type, &event.response);
    let record = builder.complete(
        event.status,
        event.status_text.clone(),
        parse_raw_header_block(&event.response_headers),
        capture.body(body),
    );
    capture.push(record);
}

impl XhrRequest for LoggedXhr {
    fn open(&mut self, method: &str, url: &str) -> Result<()> {
        {
            let mut state = self.state.lock();
            *state = match std::mem::replace(&mut *state, XhrCapture::Settled) {
                XhrCapture::Capturing(mut builder) => {
                    builder.set_method(method);
                    builder.set_url(url);
                    XhrCapture::Capturing(builder)
                }
                // Re-opened: the previous exchange is abandoned or already logged
                XhrCapture::Sent(_) | XhrCapture::Settled => {
                    XhrCapture::Capturing(RecordBuilder::new(method, url))
                }
            };
        }
        self.inner.open(method, url)
    }

    fn set_request_header(&mut self, name: &str, value: &str) -> Result<()> {
        if let XhrCapture::Capturing(builder) = &mut *self.state.lock() {
            builder.set_header(name, value);
        }
        self.inner.set_request_header(name, value)
    }

    fn send(&mut self, body: Option<Body>) -> Result<()> {
        {
            let mut state = self.state.lock();
            *state = match std::mem::replace(&mut *state, XhrCapture::Settled) {
                XhrCapture::Capturing(mut builder) => {
                    let captured = normalize_optional_body(body.as_ref());
                    builder.set_body(captured.map(|b| self.capture.body(b)));
                    builder.mark_started();
                    XhrCapture::Sent(builder)
                }
                other => other,
            };
        }
        self.inner.send(body)
    }

    fn set_response_type(&mut self, response_type: ResponseType) {
        self.inner.set_response_type(response_type);
    }

    fn response_type(&self) -> ResponseType {
        self.inner.response_type()
    }

    fn ready_state(&self) -> ReadyState {
        self.inner.ready_state()
    }

    fn set_on_ready_state_change(&mut self, handler: Option<ReadyStateHandler>) {
        self.caller_handler.set(handler);
    }

    fn set_on_error(&mut self, handler: Option<ErrorHandler>) {
        self.inner.set_on_error(handler);
    }
}
