// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer backing the network primitives
//!
//! Provides the request/response types the primitives exchange and a
//! reqwest-based client implementing both of them.

mod client;
mod request;
mod response;
mod xhr;

pub use client::{HttpClient, HttpClientConfig};
pub use request::{Body, FetchInput, FetchOptions, FormData, HeadersInit, Request};
pub use response::Response;
pub use xhr::{HttpXhr, HttpXhrFactory};

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("netlogger/", env!("CARGO_PKG_VERSION"));

/// Common HTTP headers
pub mod headers {
    pub const CONTENT_TYPE: &str = "content-type";
}
