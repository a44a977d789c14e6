// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP request types: the `fetch(input, init)` argument shapes

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use url::Url;

use crate::error::{Error, Result};

/// HTTP request representation
#[derive(Debug, Clone)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// Request URL
    pub url: Url,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Option<Body>,
    /// Request timeout
    pub timeout: Option<Duration>,
}

impl Request {
    /// Create a new GET request
    pub fn get(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    /// Create a new POST request
    pub fn post(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::POST, url)
    }

    /// Create a new request with arbitrary method
    pub fn new(method: Method, url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            method,
            url: Url::parse(url.as_ref())?,
            headers: HeaderMap::new(),
            body: None,
            timeout: Some(Duration::from_secs(30)),
        })
    }

    /// Set a header
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set the request body
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the URL as string
    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }
}

/// Request body as handed to `fetch` or `send`
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Plain text
    Text(String),
    /// Structured value, sent as JSON
    Json(serde_json::Value),
    /// Multi-field form
    FormData(FormData),
    /// URL-encoded parameters
    UrlSearchParams(Vec<(String, String)>),
    /// Raw bytes
    Binary(Bytes),
}

impl Body {
    /// Encode the body for the wire, with the content type it implies
    pub fn encode(&self) -> Result<(Bytes, Option<&'static str>)> {
        Ok(match self {
            Body::Text(text) => (Bytes::from(text.clone()), Some("text/plain;charset=UTF-8")),
            Body::Json(value) => (Bytes::from(serde_json::to_vec(value)?), Some("application/json")),
            Body::FormData(form) => (
                Bytes::from(form_urlencode(form.fields())),
                Some("application/x-www-form-urlencoded"),
            ),
            Body::UrlSearchParams(params) => (
                Bytes::from(form_urlencode(params)),
                Some("application/x-www-form-urlencoded;charset=UTF-8"),
            ),
            Body::Binary(bytes) => (bytes.clone(), None),
        })
    }

    /// Check if the body carries no data
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Text(text) => text.is_empty(),
            Body::Binary(bytes) => bytes.is_empty(),
            _ => false,
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Body::Json(value)
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Binary(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Binary(Bytes::from(bytes))
    }
}

impl From<FormData> for Body {
    fn from(form: FormData) -> Self {
        Body::FormData(form)
    }
}

/// Ordered multi-field form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    fields: Vec<(String, String)>,
}

impl FormData {
    /// Create an empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field
    pub fn append(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Get the fields in insertion order
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

/// Header collection in any of the shapes `fetch` accepts
#[derive(Debug, Clone)]
pub enum HeadersInit {
    /// Name to value map
    Map(HashMap<String, String>),
    /// Ordered name/value pairs
    Pairs(Vec<(String, String)>),
    /// Native header collection
    Native(HeaderMap),
}

impl HeadersInit {
    /// Convert to a native header map, skipping invalid names or values
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        let mut insert = |name: &str, value: &str| {
            if let (Ok(name), Ok(value)) =
                (HeaderName::try_from(name), HeaderValue::try_from(value))
            {
                map.insert(name, value);
            }
        };

        match self {
            HeadersInit::Map(headers) => headers
                .iter()
                .for_each(|(k, v)| insert(k.as_str(), v.as_str())),
            HeadersInit::Pairs(pairs) => pairs
                .iter()
                .for_each(|(k, v)| insert(k.as_str(), v.as_str())),
            HeadersInit::Native(native) => return native.clone(),
        }
        map
    }
}

impl From<HashMap<String, String>> for HeadersInit {
    fn from(headers: HashMap<String, String>) -> Self {
        HeadersInit::Map(headers)
    }
}

impl From<Vec<(String, String)>> for HeadersInit {
    fn from(pairs: Vec<(String, String)>) -> Self {
        HeadersInit::Pairs(pairs)
    }
}

impl From<Vec<(&str, &str)>> for HeadersInit {
    fn from(pairs: Vec<(&str, &str)>) -> Self {
        HeadersInit::Pairs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl From<HeaderMap> for HeadersInit {
    fn from(headers: HeaderMap) -> Self {
        HeadersInit::Native(headers)
    }
}

/// First argument of `fetch`: a URL or a prepared request
#[derive(Debug, Clone)]
pub enum FetchInput {
    Url(String),
    Request(Request),
}

impl FetchInput {
    /// URL as the caller supplied it
    pub fn url(&self) -> &str {
        match self {
            FetchInput::Url(url) => url,
            FetchInput::Request(request) => request.url_str(),
        }
    }

    /// Resolve the input and options into a single request
    pub fn into_request(self, init: Option<FetchOptions>) -> Result<Request> {
        let mut request = match self {
            FetchInput::Url(url) => Request::get(url)?,
            FetchInput::Request(request) => request,
        };

        let Some(init) = init else {
            return Ok(request);
        };

        if let Some(method) = init.method {
            request.method = Method::from_bytes(method.to_uppercase().as_bytes())
                .map_err(|_| Error::other(format!("Invalid HTTP method: {}", method)))?;
        }
        if let Some(headers) = init.headers {
            request.headers = headers.to_header_map();
        }
        if init.body.is_some() {
            request.body = init.body;
        }
        if let Some(timeout) = init.timeout {
            request.timeout = Some(timeout);
        }

        Ok(request)
    }
}

impl fmt::Display for FetchInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url())
    }
}

impl From<&str> for FetchInput {
    fn from(url: &str) -> Self {
        FetchInput::Url(url.to_string())
    }
}

impl From<String> for FetchInput {
    fn from(url: String) -> Self {
        FetchInput::Url(url)
    }
}

impl From<&String> for FetchInput {
    fn from(url: &String) -> Self {
        FetchInput::Url(url.clone())
    }
}

impl From<Url> for FetchInput {
    fn from(url: Url) -> Self {
        FetchInput::Url(url.into())
    }
}

impl From<Request> for FetchInput {
    fn from(request: Request) -> Self {
        FetchInput::Request(request)
    }
}

/// Second argument of `fetch`
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Method override (`GET` when absent)
    pub method: Option<String>,
    /// Request headers
    pub headers: Option<HeadersInit>,
    /// Request body
    pub body: Option<Body>,
    /// Request timeout
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the method
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the headers
    pub fn headers(mut self, headers: impl Into<HeadersInit>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    /// Set the body
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

fn form_urlencode(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_creation() {
        let req = Request::get("https://example.com/path").unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_request_headers() {
        let req = Request::get("https://example.com")
            .unwrap()
            .header("x-custom", "value");
        assert_eq!(
            req.headers.get("x-custom").map(|v| v.to_str().unwrap()),
            Some("value")
        );
    }

    #[test]
    fn test_fetch_options_override_request() {
        let request = Request::get("https://example.com/items")
            .unwrap()
            .header("x-old", "1");
        let init = FetchOptions::new()
            .method("post")
            .headers(vec![("x-new", "2")])
            .body("payload");

        let resolved = FetchInput::from(request).into_request(Some(init)).unwrap();

        assert_eq!(resolved.method, Method::POST);
        assert!(resolved.headers.get("x-old").is_none());
        assert_eq!(resolved.headers.get("x-new").unwrap(), "2");
        assert_eq!(resolved.body, Some(Body::Text("payload".to_string())));
    }

    #[test]
    fn test_invalid_method_rejected() {
        let init = FetchOptions::new().method("BAD METHOD");
        assert!(FetchInput::from("https://example.com")
            .into_request(Some(init))
            .is_err());
    }

    #[test]
    fn test_body_encoding() {
        let form = FormData::new().append("name", "a b").append("x", "1&2");
        let (bytes, content_type) = Body::from(form).encode().unwrap();

        assert_eq!(&bytes[..], b"name=a+b&x=1%262");
        assert_eq!(content_type, Some("application/x-www-form-urlencoded"));

        let (bytes, _) = Body::Json(serde_json::json!({"a": 1})).encode().unwrap();
        assert_eq!(&bytes[..], br#"{"a":1}"#);
    }
}
