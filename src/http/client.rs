// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::Client;

use super::request::{FetchInput, FetchOptions, Request};
use super::response::Response;
use super::{headers, DEFAULT_USER_AGENT};
use crate::error::{Error, Result};
use crate::network::Fetch;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Default timeout
    pub timeout: Duration,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Default headers
    pub default_headers: HeaderMap,
    /// Proxy URL
    pub proxy: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("accept", HeaderValue::from_static("*/*"));

        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            default_headers,
            proxy: None,
        }
    }
}

/// The platform's real network primitive, backed by reqwest
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(Policy::limited(config.max_redirects))
            .default_headers(config.default_headers.clone());

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Execute a request
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let start = Instant::now();

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());

        // Encoded body first so explicit headers win over the implied content type
        if let Some(ref body) = request.body {
            let (bytes, content_type) = body.encode()?;
            if let Some(content_type) = content_type {
                if !request.headers.contains_key(headers::CONTENT_TYPE) {
                    builder = builder.header(headers::CONTENT_TYPE, content_type);
                }
            }
            builder = builder.body(bytes);
        }

        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let timeout = request.timeout.unwrap_or(self.config.timeout);
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::timeout_with_url(
                    format!("{} request", request.method),
                    timeout.as_millis() as u64,
                    request.url.as_str(),
                )
            } else {
                Error::Http(e)
            }
        })?;

        let redirected = response.url() != &request.url;
        let final_url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();

        let body = response.bytes().await?;
        let response_time_ms = start.elapsed().as_millis() as u64;

        tracing::trace!(
            method = %request.method,
            url = %request.url,
            status = status.as_u16(),
            time_ms = response_time_ms,
            "HTTP exchange finished"
        );

        let mut response = Response::new(status, headers, body, final_url);
        response.redirected = redirected;
        response.response_time_ms = response_time_ms;
        Ok(response)
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[async_trait]
impl Fetch for HttpClient {
    async fn fetch(&self, input: FetchInput, init: Option<FetchOptions>) -> Result<Response> {
        let request = input.into_request(init)?;
        self.execute(request).await
    }
}
