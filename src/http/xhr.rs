// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Event-based request object on top of [`HttpClient`]
//!
//! `send` spawns the exchange on the current tokio runtime. When it
//! finishes the object moves to [`ReadyState::Done`] and the ready-state
//! handler receives the decoded response. Transport failures never reach
//! `Done`: only the error handler is called. Re-opening aborts the exchange
//! in flight, and nothing it produces is reported afterwards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::Method;
use tokio::task::JoinHandle;

use super::client::HttpClient;
use super::request::{Body, Request};
use super::response::Response;
use crate::error::{Error, Result};
use crate::network::HandlerSlot;
use crate::network::{
    ErrorHandler, ReadyState, ReadyStateEvent, ReadyStateHandler, ResponseType, XhrFactory,
    XhrPayload, XhrRequest,
};

/// State shared with the in-flight exchange
#[derive(Default)]
struct Shared {
    ready_state: Mutex<ReadyState>,
    /// Bumped by every `open`; a finished exchange only reports if it is current
    exchange: AtomicU64,
    on_ready_state_change: HandlerSlot<ReadyStateHandler>,
    on_error: HandlerSlot<ErrorHandler>,
}

impl Shared {
    fn transition(&self, event: &ReadyStateEvent) {
        *self.ready_state.lock() = event.ready_state;
        self.on_ready_state_change.call(|handler| handler(event));
    }

    fn fail(&self, error: &Error) {
        self.on_error.call(|handler| handler(error));
    }

    fn is_current(&self, exchange: u64) -> bool {
        self.exchange.load(Ordering::Acquire) == exchange
    }
}

/// Request object backed by reqwest
pub struct HttpXhr {
    client: HttpClient,
    request: Option<Request>,
    response_type: ResponseType,
    shared: Arc<Shared>,
    in_flight: Option<JoinHandle<()>>,
}

impl HttpXhr {
    /// Create an unsent request object
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            request: None,
            response_type: ResponseType::default(),
            shared: Arc::new(Shared::default()),
            in_flight: None,
        }
    }
}

impl XhrRequest for HttpXhr {
    fn open(&mut self, method: &str, url: &str) -> Result<()> {
        let method = Method::from_bytes(method.to_uppercase().as_bytes())
            .map_err(|_| Error::invalid_state(format!("Invalid HTTP method: {}", method)))?;
        self.request = Some(Request::new(method, url)?);

        self.shared.exchange.fetch_add(1, Ordering::AcqRel);
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        self.shared.transition(&ReadyStateEvent::progress(
            ReadyState::Opened,
            self.response_type.clone(),
        ));
        Ok(())
    }

    fn set_request_header(&mut self, name: &str, value: &str) -> Result<()> {
        let request = self
            .request
            .take()
            .ok_or_else(|| Error::invalid_state("setRequestHeader called before open"))?;
        self.request = Some(request.header(name, value));
        Ok(())
    }

    fn send(&mut self, body: Option<Body>) -> Result<()> {
        if *self.shared.ready_state.lock() != ReadyState::Opened {
            return Err(Error::invalid_state("send called outside the opened state"));
        }
        let mut request = self
            .request
            .take()
            .ok_or_else(|| Error::invalid_state("send called before open"))?;
        request.body = body;

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::invalid_state(format!("no async runtime: {}", e)))?;

        let client = self.client.clone();
        let shared = self.shared.clone();
        let response_type = self.response_type.clone();
        let exchange = shared.exchange.load(Ordering::Acquire);

        self.in_flight = Some(runtime.spawn(async move {
            let url = request.url.to_string();
            let result = client.execute(request).await;
            if !shared.is_current(exchange) {
                tracing::trace!(url = %url, "dropping result of a superseded exchange");
                return;
            }
            match result {
                Ok(response) => shared.transition(&done_event(&response, response_type)),
                Err(error) => {
                    tracing::debug!(url = %url, error = %error, "request object transport failure");
                    shared.fail(&error);
                }
            }
        }));

        Ok(())
    }

    fn set_response_type(&mut self, response_type: ResponseType) {
        self.response_type = response_type;
    }

    fn response_type(&self) -> ResponseType {
        self.response_type.clone()
    }

    fn ready_state(&self) -> ReadyState {
        *self.shared.ready_state.lock()
    }

    fn set_on_ready_state_change(&mut self, handler: Option<ReadyStateHandler>) {
        self.shared.on_ready_state_change.set(handler);
    }

    fn set_on_error(&mut self, handler: Option<ErrorHandler>) {
        self.shared.on_error.set(handler);
    }
}

/// Build the terminal event, decoding the body per the declared type
fn done_event(response: &Response, response_type: ResponseType) -> ReadyStateEvent {
    let payload = match response_type {
        ResponseType::Text => XhrPayload::Text(response.text_lossy()),
        ResponseType::Json => response
            .json::<serde_json::Value>()
            .map(XhrPayload::Json)
            .unwrap_or(XhrPayload::Empty),
        ResponseType::ArrayBuffer | ResponseType::Blob => XhrPayload::Binary(response.body.clone()),
        ResponseType::Document => XhrPayload::Document(response.text_lossy()),
        ResponseType::Unknown(_) => XhrPayload::Empty,
    };

    let response_headers = response
        .headers
        .iter()
        .map(|(name, value)| format!("{}: {}", name, String::from_utf8_lossy(value.as_bytes())))
        .collect::<Vec<_>>()
        .join("\r\n");

    ReadyStateEvent {
        ready_state: ReadyState::Done,
        status: response.status_code(),
        status_text: response.status_text.clone(),
        response_type,
        response: Ok(payload),
        response_headers,
    }
}

/// Factory producing [`HttpXhr`] objects
#[derive(Clone)]
pub struct HttpXhrFactory {
    client: HttpClient,
}

impl HttpXhrFactory {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

impl XhrFactory for HttpXhrFactory {
    fn create(&self) -> Box<dyn XhrRequest> {
        Box::new(HttpXhr::new(self.client.clone()))
    }
}
