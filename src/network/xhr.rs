// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Event-based request object (XMLHttpRequest-style)
//!
//! A request object is opened, configured, sent, and then reports progress
//! through a ready-state handler. The terminal [`ReadyState::Done`] event
//! carries the status, the raw response header block and the response
//! decoded according to the requested [`ResponseType`].

use bytes::Bytes;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::http::Body;

/// Lifecycle of a request object
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ReadyState {
    #[default]
    Unsent = 0,
    Opened = 1,
    HeadersReceived = 2,
    Loading = 3,
    Done = 4,
}

/// Declared response type of a request object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ResponseType {
    /// `""` or `"text"`
    #[default]
    Text,
    Json,
    ArrayBuffer,
    Blob,
    Document,
    /// Anything the platform reports that we do not model
    Unknown(String),
}

impl ResponseType {
    /// Parse the platform's response type string
    pub fn parse(value: &str) -> Self {
        match value {
            "" | "text" => ResponseType::Text,
            "json" => ResponseType::Json,
            "arraybuffer" => ResponseType::ArrayBuffer,
            "blob" => ResponseType::Blob,
            "document" => ResponseType::Document,
            other => ResponseType::Unknown(other.to_string()),
        }
    }

    /// Platform string for this response type
    pub fn as_str(&self) -> &str {
        match self {
            ResponseType::Text => "text",
            ResponseType::Json => "json",
            ResponseType::ArrayBuffer => "arraybuffer",
            ResponseType::Blob => "blob",
            ResponseType::Document => "document",
            ResponseType::Unknown(other) => other,
        }
    }
}

/// Decoded response of a request object
#[derive(Debug, Clone, PartialEq)]
pub enum XhrPayload {
    /// No response (e.g. JSON that failed to parse)
    Empty,
    Text(String),
    Json(serde_json::Value),
    /// `arraybuffer` or `blob` content
    Binary(Bytes),
    /// Parsed document, kept as its source text
    Document(String),
}

impl XhrPayload {
    /// Size in bytes, where the payload has one
    pub fn size(&self) -> Option<usize> {
        match self {
            XhrPayload::Binary(bytes) => Some(bytes.len()),
            XhrPayload::Text(text) | XhrPayload::Document(text) => Some(text.len()),
            XhrPayload::Empty | XhrPayload::Json(_) => None,
        }
    }
}

/// Snapshot of a request object handed to its ready-state handler
#[derive(Debug, Clone)]
pub struct ReadyStateEvent {
    pub ready_state: ReadyState,
    pub status: u16,
    pub status_text: String,
    pub response_type: ResponseType,
    /// The decoded response, or the message of the failure to read it
    pub response: std::result::Result<XhrPayload, String>,
    /// Raw `Name: value` block, CRLF delimited
    pub response_headers: String,
}

impl ReadyStateEvent {
    /// Event for a state before any response is available
    pub fn progress(ready_state: ReadyState, response_type: ResponseType) -> Self {
        Self {
            ready_state,
            status: 0,
            status_text: String::new(),
            response_type,
            response: Ok(XhrPayload::Empty),
            response_headers: String::new(),
        }
    }

    /// Check if this is the terminal event
    pub fn is_done(&self) -> bool {
        self.ready_state == ReadyState::Done
    }
}

/// Ready-state change handler
pub type ReadyStateHandler = Box<dyn FnMut(&ReadyStateEvent) + Send>;

/// Transport failure handler
pub type ErrorHandler = Box<dyn FnMut(&Error) + Send>;

/// Storage for one installable handler.
///
/// The lock is released while the handler runs, so the handler may call
/// back into its request object. A handler replaced or cleared during its
/// own call is not reinstated afterwards. Events raised while the handler
/// is running are not delivered to it.
pub(crate) struct HandlerSlot<H> {
    state: Mutex<SlotState<H>>,
}

struct SlotState<H> {
    handler: Option<H>,
    generation: u64,
}

impl<H> HandlerSlot<H> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                handler: None,
                generation: 0,
            }),
        }
    }

    /// Install or clear the handler
    pub(crate) fn set(&self, handler: Option<H>) {
        let mut state = self.state.lock();
        state.generation = state.generation.wrapping_add(1);
        state.handler = handler;
    }

    /// Run `f` with the handler, if one is installed
    pub(crate) fn call(&self, f: impl FnOnce(&mut H)) {
        let (taken, generation) = {
            let mut state = self.state.lock();
            (state.handler.take(), state.generation)
        };
        let Some(mut handler) = taken else {
            return;
        };

        f(&mut handler);

        let mut state = self.state.lock();
        if state.generation == generation {
            state.handler = Some(handler);
        }
    }
}

impl<H> Default for HandlerSlot<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Event-based request object
pub trait XhrRequest: Send {
    /// Initialize the request
    fn open(&mut self, method: &str, url: &str) -> Result<()>;

    /// Add a request header; must be called after `open`
    fn set_request_header(&mut self, name: &str, value: &str) -> Result<()>;

    /// Start the request
    fn send(&mut self, body: Option<Body>) -> Result<()>;

    /// Declare how the response should be decoded
    fn set_response_type(&mut self, response_type: ResponseType);

    /// Declared response type
    fn response_type(&self) -> ResponseType;

    /// Current ready state
    fn ready_state(&self) -> ReadyState;

    /// Replace the ready-state change handler
    fn set_on_ready_state_change(&mut self, handler: Option<ReadyStateHandler>);

    /// Replace the transport failure handler
    fn set_on_error(&mut self, handler: Option<ErrorHandler>);
}

/// Constructor for request objects
pub trait XhrFactory: Send + Sync {
    fn create(&self) -> Box<dyn XhrRequest>;
}
