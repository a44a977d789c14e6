// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network interception and traffic logging
//!
//! Captures every fetch and request-object call made through a
//! [`NetworkHost`] into a bounded, observable [`LogStore`].

mod config;
mod host;
mod interceptor;
mod normalize;
mod query;
mod record;
mod store;
mod xhr;

pub use config::{LoggerConfig, DEFAULT_MAX_ENTRIES};
pub use host::{Fetch, NetworkHost};
pub use interceptor::{network_logger, LoggedXhr, LoggingFetch, LoggingXhrFactory, NetworkLogger};
pub use normalize::{
    header_map_fields, normalize_body, normalize_headers, normalize_optional_body,
    parse_raw_header_block, render_xhr_response, truncate_body,
};
pub use query::{format_body, format_headers, LogFilter, StatusClass};
pub use record::{header_value, HeaderFields, Outcome, RecordBuilder, ResponseInfo, TrafficRecord};
pub use store::{LogStore, Snapshot, SubscriberFn, Subscription};
pub use xhr::{
    ErrorHandler, ReadyState, ReadyStateEvent, ReadyStateHandler, ResponseType, XhrFactory,
    XhrPayload, XhrRequest,
};
pub(crate) use xhr::HandlerSlot;
