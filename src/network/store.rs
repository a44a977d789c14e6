// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Bounded, observable log of traffic records
//!
//! Records are kept newest first. Every mutation is followed by a fan-out to
//! the subscribers registered at that moment, in registration order, each
//! receiving the same immutable [`Snapshot`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex, RwLock};

use super::config::LoggerConfig;
use super::record::TrafficRecord;

/// Immutable copy of the store contents, newest first
pub type Snapshot = Arc<[TrafficRecord]>;

/// Subscriber callback
pub type SubscriberFn = Arc<dyn Fn(Snapshot) + Send + Sync>;

struct Subscriber {
    id: u64,
    callback: SubscriberFn,
}

struct Inner {
    records: RwLock<VecDeque<TrafficRecord>>,
    subscribers: Mutex<Vec<Subscriber>>,
    /// Serializes mutation + fan-out; re-entrant so subscribers may call back in
    dispatch: ReentrantMutex<()>,
    next_subscriber: AtomicU64,
    enabled: AtomicBool,
    capacity: usize,
}

/// Shared handle to the log store
#[derive(Clone)]
pub struct LogStore {
    inner: Arc<Inner>,
}

impl LogStore {
    /// Create a store from configuration
    pub fn new(config: &LoggerConfig) -> Self {
        let capacity = config.max_entries.max(1);
        Self {
            inner: Arc::new(Inner {
                records: RwLock::new(VecDeque::with_capacity(capacity)),
                subscribers: Mutex::new(Vec::new()),
                dispatch: ReentrantMutex::new(()),
                next_subscriber: AtomicU64::new(1),
                enabled: AtomicBool::new(config.enabled),
                capacity,
            }),
        }
    }

    /// Create a store holding at most `capacity` records
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(&LoggerConfig::default().max_entries(capacity))
    }

    /// Insert a record at the front, evicting the oldest beyond capacity
    pub fn record(&self, entry: TrafficRecord) {
        let _dispatch = self.inner.dispatch.lock();

        let snapshot = {
            let mut records = self.inner.records.write();
            records.push_front(entry);
            if records.len() > self.inner.capacity {
                let evicted = records.len() - self.inner.capacity;
                records.truncate(self.inner.capacity);
                tracing::trace!(evicted, "evicted oldest traffic records");
            }
            snapshot_of(&records)
        };

        self.notify(snapshot);
    }

    /// Remove every record
    pub fn clear(&self) {
        let _dispatch = self.inner.dispatch.lock();

        self.inner.records.write().clear();
        tracing::debug!("traffic log cleared");

        self.notify(Arc::from(Vec::new()));
    }

    /// Current records, newest first
    pub fn snapshot(&self) -> Snapshot {
        snapshot_of(&self.inner.records.read())
    }

    /// Register a callback for every future mutation
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Snapshot) + Send + Sync + 'static,
    {
        let id = self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.lock().push(Subscriber {
            id,
            callback: Arc::new(callback),
        });

        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
            active: AtomicBool::new(true),
        }
    }

    /// Allow the interceptor to install itself
    pub fn enable(&self) {
        self.inner.enabled.store(true, Ordering::Release);
    }

    /// Prevent future interceptor installs; existing hooks stay in place
    pub fn disable(&self) {
        self.inner.enabled.store(false, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Acquire)
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.inner.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records.read().is_empty()
    }

    /// Maximum number of records held
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    /// Export the current records in wire format
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&*self.snapshot())
    }

    fn notify(&self, snapshot: Snapshot) {
        // Stable copy: subscribers may (un)subscribe while being called
        let callbacks: Vec<SubscriberFn> = self
            .inner
            .subscribers
            .lock()
            .iter()
            .map(|s| s.callback.clone())
            .collect();

        for callback in callbacks {
            callback(snapshot.clone());
        }
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new(&LoggerConfig::default())
    }
}

impl std::fmt::Debug for LogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStore")
            .field("len", &self.len())
            .field("capacity", &self.inner.capacity)
            .field("subscribers", &self.subscriber_count())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

fn snapshot_of(records: &VecDeque<TrafficRecord>) -> Snapshot {
    records.iter().cloned().collect()
}

/// Handle removing one subscriber registration
#[must_use = "dropping the handle keeps the subscriber registered; call unsubscribe() to remove it"]
pub struct Subscription {
    id: u64,
    store: Weak<Inner>,
    active: AtomicBool,
}

impl Subscription {
    /// Remove this registration. Further calls do nothing.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(inner) = self.store.upgrade() {
            inner.subscribers.lock().retain(|s| s.id != self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
