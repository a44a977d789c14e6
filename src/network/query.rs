// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Read-side helpers for displaying and filtering captured traffic

use std::fmt::Write;

use super::record::{HeaderFields, TrafficRecord};

/// Filter applied to a log listing
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    /// Case-insensitive substring matched against URL or method
    pub search: String,
    /// Only keep URLs containing `api`
    pub api_only: bool,
}

impl LogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set search term
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    /// Restrict to API calls
    pub fn api_only(mut self, api_only: bool) -> Self {
        self.api_only = api_only;
        self
    }

    /// Check if a record passes the filter
    pub fn matches(&self, record: &TrafficRecord) -> bool {
        let url = record.url().to_lowercase();
        let term = self.search.to_lowercase();

        let matches_search = url.contains(&term) || record.method().to_lowercase().contains(&term);
        if self.api_only {
            return matches_search && url.contains("api");
        }
        matches_search
    }

    /// Keep matching records, preserving order
    pub fn apply<'a>(&self, records: &'a [TrafficRecord]) -> Vec<&'a TrafficRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Coarse status category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Redirect,
    Error,
    Unknown,
}

impl StatusClass {
    /// Classify a status code; `None` and codes below 200 are unknown
    pub fn from_status(status: Option<u16>) -> Self {
        match status {
            Some(200..=299) => Self::Success,
            Some(300..=399) => Self::Redirect,
            Some(s) if s >= 400 => Self::Error,
            _ => Self::Unknown,
        }
    }
}

impl TrafficRecord {
    /// Status category of the response
    pub fn status_class(&self) -> StatusClass {
        StatusClass::from_status(self.response().map(|r| r.status).filter(|s| *s != 0))
    }

    /// Status code, `ERROR`, or `PENDING`
    pub fn status_label(&self) -> String {
        match (self.response(), self.error()) {
            (Some(response), _) if response.status != 0 => response.status.to_string(),
            (_, Some(_)) => "ERROR".to_string(),
            _ => "PENDING".to_string(),
        }
    }

    /// Duration to display, in milliseconds
    pub fn display_duration_ms(&self) -> f64 {
        self.duration().as_secs_f64() * 1000.0
    }

    /// Export as a curl command line
    pub fn to_curl(&self) -> String {
        let mut curl = format!("curl -X {}", self.method());

        for (name, value) in sorted(self.headers()) {
            let _ = write!(curl, " \\\n  -H \"{}: {}\"", name, value);
        }
        if let Some(body) = self.body().filter(|b| !b.is_empty()) {
            let _ = write!(curl, " \\\n  -d '{}'", body);
        }
        let _ = write!(curl, " \\\n  \"{}\"", self.url());

        curl
    }
}

/// Render headers as `name: value` lines
pub fn format_headers(headers: &HeaderFields) -> String {
    if headers.is_empty() {
        return "No headers".to_string();
    }
    sorted(headers)
        .into_iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pretty-print JSON bodies; other text is returned as is
pub fn format_body(body: Option<&str>) -> String {
    match body {
        None | Some("") => "No body".to_string(),
        Some(text) => serde_json::from_str::<serde_json::Value>(text)
            .and_then(|value| serde_json::to_string_pretty(&value))
            .unwrap_or_else(|_| text.to_string()),
    }
}

fn sorted(headers: &HeaderFields) -> Vec<(&String, &String)> {
    let mut entries: Vec<_> = headers.iter().collect();
    entries.sort();
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::record::RecordBuilder;

    fn completed(method: &str, url: &str, status: u16) -> TrafficRecord {
        RecordBuilder::new(method, url).complete(status, "", HeaderFields::new(), "")
    }

    #[test]
    fn test_filter_search() {
        let records = vec![
            completed("GET", "https://example.com/API/users", 200),
            completed("POST", "https://example.com/login", 200),
            completed("GET", "https://cdn.example.com/logo.png", 200),
        ];

        let filter = LogFilter::new().search("post");
        assert_eq!(filter.apply(&records).len(), 1);

        let filter = LogFilter::new().search("EXAMPLE");
        assert_eq!(filter.apply(&records).len(), 3);

        let filter = LogFilter::new().api_only(true);
        let kept = filter.apply(&records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url(), "https://example.com/API/users");

        assert!(LogFilter::new().search("logo").api_only(true).apply(&records).is_empty());
    }

    #[test]
    fn test_status_class() {
        assert_eq!(StatusClass::from_status(Some(204)), StatusClass::Success);
        assert_eq!(StatusClass::from_status(Some(301)), StatusClass::Redirect);
        assert_eq!(StatusClass::from_status(Some(404)), StatusClass::Error);
        assert_eq!(StatusClass::from_status(Some(503)), StatusClass::Error);
        assert_eq!(StatusClass::from_status(Some(101)), StatusClass::Unknown);
        assert_eq!(StatusClass::from_status(None), StatusClass::Unknown);

        let failed = RecordBuilder::new("GET", "https://example.com").fail("offline");
        assert_eq!(failed.status_class(), StatusClass::Unknown);
    }

    #[test]
    fn test_status_label() {
        assert_eq!(completed("GET", "https://example.com", 404).status_label(), "404");
        assert_eq!(completed("GET", "https://example.com", 0).status_label(), "PENDING");

        let failed = RecordBuilder::new("GET", "https://example.com").fail("offline");
        assert_eq!(failed.status_label(), "ERROR");
        assert!(failed.display_duration_ms() >= 0.0);
    }

    #[test]
    fn test_format_headers() {
        assert_eq!(format_headers(&HeaderFields::new()), "No headers");

        let mut headers = HeaderFields::new();
        headers.insert("x-b".into(), "2".into());
        headers.insert("accept".into(), "*/*".into());
        assert_eq!(format_headers(&headers), "accept: */*\nx-b: 2");
    }

    #[test]
    fn test_format_body() {
        assert_eq!(format_body(None), "No body");
        assert_eq!(format_body(Some("")), "No body");
        assert_eq!(format_body(Some("plain text")), "plain text");
        assert_eq!(format_body(Some(r#"{"a":1}"#)), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_to_curl() {
        let mut builder = RecordBuilder::new("POST", "https://example.com/posts");
        builder.set_header("Content-Type", "application/json");
        builder.set_body(Some(r#"{"title":"foo"}"#.to_string()));
        let record = builder.complete(201, "Created", HeaderFields::new(), "");

        assert_eq!(
            record.to_curl(),
            "curl -X POST \\\n  -H \"Content-Type: application/json\" \\\n  -d '{\"title\":\"foo\"}' \\\n  \"https://example.com/posts\""
        );

        let bare = completed("GET", "https://example.com", 200);
        assert_eq!(bare.to_curl(), "curl -X GET \\\n  \"https://example.com\"");
    }
}
