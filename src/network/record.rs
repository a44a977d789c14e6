// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Traffic record types
//!
//! A call is captured into a [`RecordBuilder`] while in flight. Settlement
//! consumes the builder and yields an immutable [`TrafficRecord`], so a
//! record can only ever be completed or failed once.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Header name to value mapping
pub type HeaderFields = HashMap<String, String>;

/// Settled outcome of a call
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The call produced a response (any HTTP status)
    Completed(ResponseInfo),
    /// The call itself failed
    Failed { error: String, duration: Duration },
}

/// Response side of a completed call
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseInfo {
    /// Status code
    pub status: u16,
    /// Status text
    pub status_text: String,
    /// Response headers
    pub headers: HeaderFields,
    /// Response body as text or placeholder
    pub body: String,
    /// Time from call start to settlement
    pub duration: Duration,
}

/// One logged network call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireRecord", from = "WireRecord")]
pub struct TrafficRecord {
    id: String,
    method: String,
    url: String,
    headers: HeaderFields,
    body: Option<String>,
    timestamp: DateTime<Utc>,
    start_time: i64,
    outcome: Outcome,
}

impl TrafficRecord {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request headers as captured
    pub fn headers(&self) -> &HeaderFields {
        &self.headers
    }

    /// Look up a request header ignoring case
    pub fn request_header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    /// Normalized request body
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Wall-clock time the call started
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Call start in epoch milliseconds
    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Response details, if the call completed
    pub fn response(&self) -> Option<&ResponseInfo> {
        match &self.outcome {
            Outcome::Completed(response) => Some(response),
            Outcome::Failed { .. } => None,
        }
    }

    /// Failure message, if the call failed
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failed { error, .. } => Some(error),
            Outcome::Completed(_) => None,
        }
    }

    /// Time from call start to settlement
    pub fn duration(&self) -> Duration {
        match &self.outcome {
            Outcome::Completed(response) => response.duration,
            Outcome::Failed { duration, .. } => *duration,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }

    /// Serialize to the wire format
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Look up a header ignoring case
pub fn header_value<'a>(headers: &'a HeaderFields, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// A call under construction
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    id: String,
    method: String,
    url: String,
    headers: HeaderFields,
    body: Option<String>,
    timestamp: DateTime<Utc>,
    started: Instant,
}

impl RecordBuilder {
    /// Open a record now, with a fresh id
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        let timestamp = Utc::now();
        Self {
            id: generate_id(&timestamp),
            method: method.into(),
            url: url.into(),
            headers: HeaderFields::new(),
            body: None,
            timestamp,
            started: Instant::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_method(&mut self, method: impl Into<String>) {
        self.method = method.into();
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Set a request header, overwriting an earlier value under the same name
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    pub fn set_headers(&mut self, headers: HeaderFields) {
        self.headers = headers;
    }

    pub fn set_body(&mut self, body: Option<String>) {
        self.body = body;
    }

    /// Restart the clock (the call is actually leaving now)
    pub fn mark_started(&mut self) {
        self.timestamp = Utc::now();
        self.started = Instant::now();
    }

    /// Time since the call started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Settle with a response
    pub fn complete(
        self,
        status: u16,
        status_text: impl Into<String>,
        headers: HeaderFields,
        body: impl Into<String>,
    ) -> TrafficRecord {
        let response = ResponseInfo {
            status,
            status_text: status_text.into(),
            headers,
            body: body.into(),
            duration: self.elapsed(),
        };
        self.finish(Outcome::Completed(response))
    }

    /// Settle with a failure
    pub fn fail(self, error: impl Into<String>) -> TrafficRecord {
        let duration = self.elapsed();
        self.finish(Outcome::Failed {
            error: error.into(),
            duration,
        })
    }

    fn finish(self, outcome: Outcome) -> TrafficRecord {
        TrafficRecord {
            id: self.id,
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            start_time: self.timestamp.timestamp_millis(),
            timestamp: self.timestamp,
            outcome,
        }
    }
}

/// Timestamp plus random suffix, unique within a millisecond
fn generate_id(timestamp: &DateTime<Utc>) -> String {
    format!(
        "{}-{:08x}",
        timestamp.timestamp_millis(),
        rand::random::<u32>()
    )
}

/// Serialized shape of a record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRecord {
    id: String,
    method: String,
    url: String,
    headers: HeaderFields,
    body: Option<String>,
    timestamp: DateTime<Utc>,
    start_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response: Option<WireResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    status: u16,
    status_text: String,
    headers: HeaderFields,
    body: String,
    duration: f64,
}

fn to_millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Saturates at `Duration::MAX`; negative and NaN inputs become zero
fn from_millis(millis: f64) -> Duration {
    if millis.is_nan() || millis <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(millis / 1000.0).unwrap_or(Duration::MAX)
}

impl From<TrafficRecord> for WireRecord {
    fn from(record: TrafficRecord) -> Self {
        let (response, error, duration) = match record.outcome {
            Outcome::Completed(response) => (
                Some(WireResponse {
                    status: response.status,
                    status_text: response.status_text,
                    headers: response.headers,
                    body: response.body,
                    duration: to_millis(response.duration),
                }),
                None,
                None,
            ),
            Outcome::Failed { error, duration } => (None, Some(error), Some(to_millis(duration))),
        };

        Self {
            id: record.id,
            method: record.method,
            url: record.url,
            headers: record.headers,
            body: record.body,
            timestamp: record.timestamp,
            start_time: record.start_time,
            response,
            error,
            duration,
        }
    }
}

impl From<WireRecord> for TrafficRecord {
    fn from(wire: WireRecord) -> Self {
        let outcome = match (wire.response, wire.error) {
            (Some(response), _) => Outcome::Completed(ResponseInfo {
                status: response.status,
                status_text: response.status_text,
                headers: response.headers,
                body: response.body,
                duration: from_millis(response.duration),
            }),
            (None, error) => Outcome::Failed {
                error: error.unwrap_or_else(|| "Unknown error".to_string()),
                duration: from_millis(wire.duration.unwrap_or(0.0)),
            },
        };

        Self {
            id: wire.id,
            method: wire.method,
            url: wire.url,
            headers: wire.headers,
            body: wire.body,
            timestamp: wire.timestamp,
            start_time: wire.start_time,
            outcome,
        }
    }
}
