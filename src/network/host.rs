// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Process networking entry points
//!
//! A [`NetworkHost`] owns the current implementation of the two primitives
//! application code calls: a future-based `fetch` and a factory of
//! event-based request objects. Interception swaps both for wrappers
//! exactly once; the host carries the install flag that enforces it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::xhr::{XhrFactory, XhrRequest};
use crate::error::Result;
use crate::http::{FetchInput, FetchOptions, HttpClient, HttpXhrFactory, Response};

/// Future-based fetch primitive
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, input: FetchInput, init: Option<FetchOptions>) -> Result<Response>;
}

/// Holder of the fetch and request-object entry points
pub struct NetworkHost {
    fetch: RwLock<Arc<dyn Fetch>>,
    xhr: RwLock<Arc<dyn XhrFactory>>,
    /// One-time install flag for interception
    intercepted: AtomicBool,
}

impl NetworkHost {
    /// Create a host from explicit primitives
    pub fn new(fetch: impl Fetch + 'static, xhr: impl XhrFactory + 'static) -> Self {
        Self {
            fetch: RwLock::new(Arc::new(fetch)),
            xhr: RwLock::new(Arc::new(xhr)),
            intercepted: AtomicBool::new(false),
        }
    }

    /// Create a host whose primitives both go through `client`
    pub fn from_client(client: HttpClient) -> Self {
        Self::new(client.clone(), HttpXhrFactory::new(client))
    }

    /// Issue a fetch through the current entry point
    pub async fn fetch(
        &self,
        input: impl Into<FetchInput>,
        init: Option<FetchOptions>,
    ) -> Result<Response> {
        let fetch = self.fetch.read().clone();
        fetch.fetch(input.into(), init).await
    }

    /// Construct a request object through the current entry point
    pub fn xml_http_request(&self) -> Box<dyn XhrRequest> {
        let factory = self.xhr.read().clone();
        factory.create()
    }

    /// Check if interception has been installed
    pub fn is_intercepted(&self) -> bool {
        self.intercepted.load(Ordering::Acquire)
    }

    /// Replace both entry points with wrappers around the current ones.
    ///
    /// Runs at most once per host; later calls return `false` and leave the
    /// entry points untouched.
    pub fn intercept<F, X>(&self, wrap_fetch: F, wrap_xhr: X) -> bool
    where
        F: FnOnce(Arc<dyn Fetch>) -> Arc<dyn Fetch>,
        X: FnOnce(Arc<dyn XhrFactory>) -> Arc<dyn XhrFactory>,
    {
        if self
            .intercepted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        {
            let mut fetch = self.fetch.write();
            *fetch = wrap_fetch(fetch.clone());
        }
        {
            let mut xhr = self.xhr.write();
            *xhr = wrap_xhr(xhr.clone());
        }

        true
    }
}

impl std::fmt::Debug for NetworkHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkHost")
            .field("intercepted", &self.is_intercepted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use tokio::sync::oneshot;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::network::{NetworkLogger, ReadyStateEvent, ResponseType};

    fn posts(count: usize) -> serde_json::Value {
        (1..=count)
            .map(|id| serde_json::json!({"id": id, "title": format!("post {}", id)}))
            .collect()
    }

    async fn logged_host() -> (NetworkLogger, NetworkHost, MockServer) {
        let server = MockServer::start().await;
        let host = NetworkHost::from_client(HttpClient::new().unwrap());
        let logger = NetworkLogger::default();
        assert!(logger.setup_interceptor(&host));
        (logger, host, server)
    }

    #[tokio::test]
    async fn test_fetch_posts_logged() {
        let (logger, host, server) = logged_host().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .and(query_param("_limit", "5"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(posts(5))
                    .set_delay(Duration::from_millis(5)),
            )
            .mount(&server)
            .await;

        let url = format!("{}/posts?_limit=5", server.uri());
        let response = host.fetch(&url, None).await.unwrap();
        let items: Vec<serde_json::Value> = response.json().unwrap();
        assert_eq!(items.len(), 5);

        let logs = logger.logs();
        assert_eq!(logs.len(), 1);
        let record = &logs[0];
        assert_eq!(record.method(), "GET");
        assert_eq!(record.url(), url);

        let logged = record.response().unwrap();
        assert_eq!(logged.status, 200);
        assert!(logged.duration > Duration::ZERO);
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&logged.body).unwrap();
        assert_eq!(parsed.len(), 5);
    }

    #[tokio::test]
    async fn test_fetch_not_found_logged_without_error() {
        let (logger, host, server) = logged_host().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let response = host
            .fetch(format!("{}/nonexistent", server.uri()), None)
            .await
            .unwrap();
        assert_eq!(response.status_code(), 404);

        let record = &logger.logs()[0];
        assert_eq!(record.response().map(|r| r.status), Some(404));
        assert!(record.error().is_none());
    }

    #[tokio::test]
    async fn test_fetch_post_json_logged() {
        let (logger, host, server) = logged_host().await;
        Mock::given(method("POST"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 101})))
            .mount(&server)
            .await;

        let init = FetchOptions::new()
            .method("POST")
            .headers(vec![("Content-Type", "application/json")])
            .body(serde_json::json!({"title": "foo", "userId": 1}));
        host.fetch(format!("{}/posts", server.uri()), Some(init))
            .await
            .unwrap();

        let record = &logger.logs()[0];
        assert_eq!(record.method(), "POST");
        assert_eq!(record.body(), Some(r#"{"title":"foo","userId":1}"#));
        assert_eq!(record.request_header("content-type"), Some("application/json"));
        assert_eq!(record.response().unwrap().status_text, "Created");
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_logged() {
        let host = NetworkHost::from_client(HttpClient::new().unwrap());
        let logger = NetworkLogger::default();
        logger.setup_interceptor(&host);

        let err = host.fetch("http://127.0.0.1:9/", None).await.unwrap_err();

        let record = &logger.logs()[0];
        assert_eq!(record.error(), Some(err.to_string().as_str()));
        assert!(record.response().is_none());
    }

    #[tokio::test]
    async fn test_xhr_round_trip_logged() {
        let (logger, host, server) = logged_host().await;
        Mock::given(method("GET"))
            .and(path("/users/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("X-Request-Id", "abc")
                    .set_body_json(serde_json::json!({"id": 1, "name": "Leanne"})),
            )
            .mount(&server)
            .await;

        let (tx, rx) = oneshot::channel();
        let mut tx = Some(tx);

        let mut xhr = host.xml_http_request();
        xhr.set_response_type(ResponseType::Json);
        xhr.set_on_ready_state_change(Some(Box::new(move |event: &ReadyStateEvent| {
            if event.is_done() {
                if let Some(tx) = tx.take() {
                    let _ = tx.send(event.status);
                }
            }
        })));
        xhr.open("GET", &format!("{}/users/1", server.uri())).unwrap();
        xhr.set_request_header("Accept", "application/json").unwrap();
        xhr.send(None).unwrap();

        assert_eq!(rx.await.unwrap(), 200);

        let logs = logger.logs();
        assert_eq!(logs.len(), 1);
        let record = &logs[0];
        assert_eq!(record.headers()["Accept"], "application/json");
        let response = record.response().unwrap();
        assert_eq!(response.headers["x-request-id"], "abc");
        assert_eq!(response.body, r#"{"id":1,"name":"Leanne"}"#);
    }

    #[tokio::test]
    async fn test_xhr_transport_failure_stays_pending() {
        let host = NetworkHost::from_client(HttpClient::new().unwrap());
        let logger = NetworkLogger::default();
        logger.setup_interceptor(&host);

        let (tx, rx) = oneshot::channel();
        let mut tx = Some(tx);

        let mut xhr = host.xml_http_request();
        xhr.set_on_error(Some(Box::new(move |error: &crate::error::Error| {
            if let Some(tx) = tx.take() {
                let _ = tx.send(error.to_string());
            }
        })));
        xhr.open("GET", "http://127.0.0.1:9/").unwrap();
        xhr.send(None).unwrap();

        assert!(!rx.await.unwrap().is_empty());
        assert!(logger.logs().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_xhr_handler_cleared_during_done_stays_cleared() {
        let (logger, host, server) = logged_host().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;
        let url = format!("{}/once", server.uri());

        let cell: Arc<parking_lot::Mutex<Option<Box<dyn XhrRequest>>>> =
            Arc::new(parking_lot::Mutex::new(None));
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = oneshot::channel();
        let mut tx = Some(tx);

        let mut xhr = host.xml_http_request();
        {
            let cell = cell.clone();
            let calls = calls.clone();
            xhr.set_on_ready_state_change(Some(Box::new(move |event: &ReadyStateEvent| {
                if !event.is_done() {
                    return;
                }
                calls.fetch_add(1, Ordering::SeqCst);
                if let Some(xhr) = cell.lock().as_mut() {
                    xhr.set_on_ready_state_change(None);
                }
                if let Some(tx) = tx.take() {
                    let _ = tx.send(());
                }
            })));
        }
        {
            let mut guard = cell.lock();
            let xhr = guard.insert(xhr);
            xhr.open("GET", &url).unwrap();
            xhr.send(None).unwrap();
        }
        tokio::time::timeout(Duration::from_secs(5), rx)
            .await
            .unwrap()
            .unwrap();

        {
            let mut guard = cell.lock();
            let xhr = guard.as_mut().unwrap();
            xhr.open("GET", &url).unwrap();
            xhr.send(None).unwrap();
        }
        tokio::time::timeout(Duration::from_secs(5), async {
            while logger.log_count() < 2 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_xhr_reopen_ignores_superseded_response() {
        let (logger, host, server) = logged_host().await;
        Mock::given(method("GET"))
            .and(path("/first"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("first")
                    .set_delay(Duration::from_millis(150)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/second"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("second")
                    .set_delay(Duration::from_millis(450)),
            )
            .mount(&server)
            .await;

        let mut xhr = host.xml_http_request();
        xhr.set_response_type(ResponseType::Text);
        xhr.open("GET", &format!("{}/first", server.uri())).unwrap();
        xhr.send(None).unwrap();
        xhr.open("GET", &format!("{}/second", server.uri())).unwrap();
        xhr.send(None).unwrap();

        tokio::time::sleep(Duration::from_millis(900)).await;

        let logs = logger.logs();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].url().ends_with("/second"));
        assert_eq!(logs[0].response().unwrap().body, "second");
    }

    #[tokio::test]
    async fn test_subscriber_sees_each_call() {
        let (logger, host, server) = logged_host().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let counts = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let subscription = {
            let counts = counts.clone();
            logger.subscribe(move |snapshot| counts.lock().push(snapshot.len()))
        };

        host.fetch(server.uri(), None).await.unwrap();
        logger.clear_logs();
        host.fetch(server.uri(), None).await.unwrap();
        subscription.unsubscribe();
        host.fetch(server.uri(), None).await.unwrap();

        assert_eq!(*counts.lock(), vec![1, 0, 1]);
        assert_eq!(logger.log_count(), 2);
    }

    #[test]
    fn test_intercept_once() {
        let client = HttpClient::new().unwrap();
        let host = NetworkHost::from_client(client);

        assert!(!host.is_intercepted());
        assert!(host.intercept(|f| f, |x| x));
        assert!(host.is_intercepted());
        assert!(!host.intercept(|f| f, |x| x));
    }

    #[test]
    fn test_fetch_blocking() {
        let host = NetworkHost::from_client(HttpClient::new().unwrap());
        let result = tokio_test::block_on(host.fetch("not a url", None));
        assert!(matches!(result, Err(crate::error::Error::Url(_))));
    }
}
