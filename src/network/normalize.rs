// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Conversions from the platform's request/response shapes into record fields
//!
//! Every function here is total. Anything that cannot be captured is
//! rendered as a bracketed placeholder instead of an error, so logging can
//! never change how a call behaves.

use reqwest::header::HeaderMap;

use super::record::HeaderFields;
use super::xhr::{ResponseType, XhrPayload};
use crate::http::{Body, HeadersInit};

/// Convert any accepted header shape into a name to value mapping
pub fn normalize_headers(input: &HeadersInit) -> HeaderFields {
    let mut headers = HeaderFields::new();

    match input {
        HeadersInit::Map(map) => {
            headers.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        HeadersInit::Pairs(pairs) => {
            for (name, value) in pairs {
                headers.insert(name.clone(), value.clone());
            }
        }
        HeadersInit::Native(native) => headers = header_map_fields(native),
    }

    headers
}

/// Flatten a native header map, joining repeated values with `", "`
pub fn header_map_fields(native: &HeaderMap) -> HeaderFields {
    native
        .keys()
        .map(|name| {
            let value = native
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            (name.as_str().to_string(), value)
        })
        .collect()
}

/// Render a request body as a string or placeholder
pub fn normalize_body(body: &Body) -> String {
    match body {
        Body::Text(text) => text.clone(),
        Body::FormData(_) => "[FormData]".to_string(),
        Body::UrlSearchParams(_) => "[URLSearchParams]".to_string(),
        Body::Binary(_) => "[Binary Data]".to_string(),
        Body::Json(value) => serde_json::to_string(value)
            .unwrap_or_else(|_| "[Unable to stringify body]".to_string()),
    }
}

/// Render an optional body; absent and empty bodies are recorded as absent
pub fn normalize_optional_body(body: Option<&Body>) -> Option<String> {
    body.filter(|b| !b.is_empty()).map(normalize_body)
}

/// Parse a CRLF-delimited `Name: value` block, lower-casing names
pub fn parse_raw_header_block(text: &str) -> HeaderFields {
    text.lines()
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_lowercase(), value.trim().to_string()))
        })
        .collect()
}

/// Render the response of a request object according to its declared type
pub fn render_xhr_response(
    response_type: &ResponseType,
    response: &std::result::Result<XhrPayload, String>,
) -> String {
    let payload = match response {
        Ok(payload) => payload,
        Err(message) => return format!("[Error reading response: {}]", message),
    };

    match response_type {
        ResponseType::Text => render_text(payload),
        ResponseType::Json => render_json(payload),
        ResponseType::Blob => format!("[Blob Response - Size: {} bytes]", size_label(payload)),
        ResponseType::ArrayBuffer => {
            format!("[ArrayBuffer Response - Size: {} bytes]", size_label(payload))
        }
        ResponseType::Document => "[Document Response]".to_string(),
        ResponseType::Unknown(_) => "[Unknown Response Type]".to_string(),
    }
}

fn render_text(payload: &XhrPayload) -> String {
    match payload {
        XhrPayload::Empty => String::new(),
        XhrPayload::Text(text) | XhrPayload::Document(text) => text.clone(),
        XhrPayload::Json(value) => value.to_string(),
        XhrPayload::Binary(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn render_json(payload: &XhrPayload) -> String {
    let rendered = match payload {
        XhrPayload::Json(value) => serde_json::to_string(value),
        XhrPayload::Empty => Ok("null".to_string()),
        XhrPayload::Text(text) => serde_json::to_string(text),
        XhrPayload::Binary(_) | XhrPayload::Document(_) => {
            return "[JSON Response - Unable to stringify]".to_string()
        }
    };
    rendered.unwrap_or_else(|_| "[JSON Response - Unable to stringify]".to_string())
}

fn size_label(payload: &XhrPayload) -> String {
    payload
        .size()
        .map(|size| size.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Cut a captured body to `max` bytes on a char boundary
pub fn truncate_body(body: String, max: Option<usize>) -> String {
    let Some(max) = max else {
        return body;
    };
    if body.len() <= max {
        return body;
    }

    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use bytes::Bytes;
    use reqwest::header::HeaderValue;

    use crate::http::FormData;

    #[test]
    fn test_headers_from_map() {
        let mut map = HashMap::new();
        map.insert("Content-Type".to_string(), "application/json".to_string());

        let headers = normalize_headers(&HeadersInit::Map(map));
        assert_eq!(headers.get("Content-Type").map(String::as_str), Some("application/json"));
    }

    #[test]
    fn test_headers_from_pairs_overwrite() {
        let init = HeadersInit::from(vec![("X-A", "1"), ("X-B", "2"), ("X-A", "3")]);
        let headers = normalize_headers(&init);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers["X-A"], "3");
    }

    #[test]
    fn test_headers_from_native_joins_values() {
        let mut native = HeaderMap::new();
        native.append("accept", HeaderValue::from_static("text/html"));
        native.append("accept", HeaderValue::from_static("application/json"));

        let headers = normalize_headers(&HeadersInit::Native(native));
        assert_eq!(headers["accept"], "text/html, application/json");
    }

    #[test]
    fn test_empty_headers() {
        assert!(normalize_headers(&HeadersInit::Pairs(Vec::new())).is_empty());
    }

    #[test]
    fn test_body_placeholders() {
        assert_eq!(normalize_body(&Body::from("raw")), "raw");
        assert_eq!(normalize_body(&Body::from(FormData::new().append("a", "1"))), "[FormData]");
        assert_eq!(
            normalize_body(&Body::UrlSearchParams(vec![("q".into(), "x".into())])),
            "[URLSearchParams]"
        );
        assert_eq!(normalize_body(&Body::from(Bytes::from_static(b"\x00\x01"))), "[Binary Data]");
        assert_eq!(
            normalize_body(&Body::Json(serde_json::json!({"title": "foo", "userId": 1}))),
            r#"{"title":"foo","userId":1}"#
        );
    }

    #[test]
    fn test_optional_body() {
        assert_eq!(normalize_optional_body(None), None);
        assert_eq!(normalize_optional_body(Some(&Body::from(""))), None);
        assert_eq!(normalize_optional_body(Some(&Body::from("x"))), Some("x".to_string()));
    }

    #[test]
    fn test_parse_raw_header_block() {
        let block = "Content-Type: application/json\r\nX-Trace: a:b\r\nmalformed\r\n: empty\r\n";
        let headers = parse_raw_header_block(block);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["x-trace"], "a:b");
        assert!(parse_raw_header_block("").is_empty());
    }

    #[test]
    fn test_render_xhr_response() {
        let text = Ok(XhrPayload::Text("hello".into()));
        assert_eq!(render_xhr_response(&ResponseType::Text, &text), "hello");

        let json = Ok(XhrPayload::Json(serde_json::json!([1, 2])));
        assert_eq!(render_xhr_response(&ResponseType::Json, &json), "[1,2]");
        assert_eq!(render_xhr_response(&ResponseType::Json, &Ok(XhrPayload::Empty)), "null");

        let binary = Ok(XhrPayload::Binary(Bytes::from_static(b"1234")));
        assert_eq!(
            render_xhr_response(&ResponseType::Blob, &binary),
            "[Blob Response - Size: 4 bytes]"
        );
        assert_eq!(
            render_xhr_response(&ResponseType::ArrayBuffer, &Ok(XhrPayload::Empty)),
            "[ArrayBuffer Response - Size: unknown bytes]"
        );
        assert_eq!(
            render_xhr_response(&ResponseType::Json, &binary),
            "[JSON Response - Unable to stringify]"
        );
        assert_eq!(
            render_xhr_response(&ResponseType::Document, &Ok(XhrPayload::Document("<p/>".into()))),
            "[Document Response]"
        );
        assert_eq!(
            render_xhr_response(&ResponseType::Unknown("moz-chunked".into()), &text),
            "[Unknown Response Type]"
        );
        assert_eq!(
            render_xhr_response(&ResponseType::Text, &Err("detached".into())),
            "[Error reading response: detached]"
        );
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("abc".into(), None), "abc");
        assert_eq!(truncate_body("abc".into(), Some(3)), "abc");
        assert_eq!(truncate_body("héllo".into(), Some(2)), "h... [truncated]");
    }
}
