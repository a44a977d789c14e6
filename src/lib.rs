// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # netlogger - In-app HTTP Traffic Logger
//!
//! Wraps an application's networking entry points so every call is captured
//! into a bounded, observable log while the call itself behaves exactly as
//! before.
//!
//! ## Features
//!
//! - Transparent interception: fetch and request-object calls are delegated unchanged
//! - One record per settled call: method, URL, headers, body, response, timing
//! - Bounded log: newest first, oldest evicted (100 entries by default)
//! - Observable: subscribers receive an immutable snapshot after every change
//! - Body capture: JSON, text and binary placeholders, optional size limit
//! - Query helpers: search/API filters, status labels, curl export
//!
//! ## Example
//!
//! ```rust,no_run
//! use netlogger::{network_logger, HttpClient, NetworkHost};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let host = NetworkHost::from_client(HttpClient::new()?);
//!     network_logger().setup_interceptor(&host);
//!
//!     let subscription = network_logger().subscribe(|logs| {
//!         println!("{} calls logged", logs.len());
//!     });
//!
//!     host.fetch("https://jsonplaceholder.typicode.com/posts?_limit=5", None).await?;
//!
//!     for record in network_logger().logs().iter() {
//!         println!("{} {} -> {}", record.method(), record.url(), record.status_label());
//!     }
//!
//!     subscription.unsubscribe();
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;
pub mod network;

// Re-exports for convenience

// Errors
pub use error::{Error, Result};

// HTTP
pub use http::{
    Body, FetchInput, FetchOptions, FormData, HeadersInit, HttpClient, HttpClientConfig, HttpXhr,
    HttpXhrFactory, Request, Response,
};

// Network
pub use network::{network_logger, LoggerConfig, NetworkHost, NetworkLogger};
pub use network::{Fetch, XhrFactory, XhrRequest};
pub use network::{LogStore, Snapshot, Subscription};
pub use network::{Outcome, RecordBuilder, ResponseInfo, TrafficRecord};
pub use network::{ReadyState, ReadyStateEvent, ResponseType, XhrPayload};
pub use network::{LogFilter, StatusClass};

/// netlogger version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
