//! Test doubles for the API layer.

use platter_api::{ApiError, ApiRequest, BoxFuture, Navigator, Route, Transport};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub use platter_api::MemoryCredentialStore;

#[derive(Debug, Clone)]
struct Scripted {
    result: Result<Value, ApiError>,
    delay: Option<Duration>,
}

type ScriptKey = (String, String);

/// Transport answering from scripted responses keyed by method and path
///
/// Responses for one key are served in the order they were scripted; the
/// last one keeps being served once the queue is down to it. Unscripted calls
/// fail with a 404 server error. Every request is recorded.
///
/// # Example
///
/// ```
/// use platter_testing::MockTransport;
/// use serde_json::json;
///
/// let transport = MockTransport::new();
/// transport.ok("GET", "/cart", json!({"message": "ok", "payload": null}));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<HashMap<ScriptKey, VecDeque<Scripted>>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    /// Creates a transport with no scripted responses
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: &str, path: &str, scripted: Scripted) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((method.to_uppercase(), path.to_string()))
            .or_default()
            .push_back(scripted);
    }

    /// Script a response for `method path`
    pub fn respond(&self, method: &str, path: &str, result: Result<Value, ApiError>) {
        self.push(method, path, Scripted { result, delay: None });
    }

    /// Script a response that arrives after `delay`
    pub fn respond_after(
        &self,
        method: &str,
        path: &str,
        delay: Duration,
        result: Result<Value, ApiError>,
    ) {
        self.push(
            method,
            path,
            Scripted {
                result,
                delay: Some(delay),
            },
        );
    }

    /// Script a successful JSON body
    pub fn ok(&self, method: &str, path: &str, body: Value) {
        self.respond(method, path, Ok(body));
    }

    /// Script a `{message, payload}` envelope
    pub fn envelope(&self, method: &str, path: &str, message: &str, payload: Value) {
        self.ok(method, path, json!({ "message": message, "payload": payload }));
    }

    /// Script a server error with `body`
    pub fn fail(&self, method: &str, path: &str, status: u16, body: Value) {
        self.respond(method, path, Err(ApiError::Server { status, body }));
    }

    /// Every request received so far, in order
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received for `method path`
    #[must_use]
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method.as_str().eq_ignore_ascii_case(method) && r.path == path)
            .collect()
    }

    fn next_response(&self, request: &ApiRequest) -> Scripted {
        let key = (request.method.as_str().to_uppercase(), request.path.clone());
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        let next = script.get_mut(&key).and_then(|queue| {
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        });

        next.unwrap_or_else(|| Scripted {
            result: Err(ApiError::Server {
                status: 404,
                body: json!({
                    "message": format!("No scripted response for {} {}", key.0, key.1)
                }),
            }),
            delay: None,
        })
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: ApiRequest) -> BoxFuture<'_, Result<Value, ApiError>> {
        let scripted = self.next_response(&request);
        tracing::trace!(method = %request.method, path = %request.path, "Mock transport call");
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        Box::pin(async move {
            if let Some(delay) = scripted.delay {
                tokio::time::sleep(delay).await;
            }
            scripted.result
        })
    }
}

/// Navigator remembering every requested route
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    routes: Arc<Mutex<Vec<Route>>>,
}

impl RecordingNavigator {
    /// Creates an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes requested so far, in order
    #[must_use]
    pub fn routes(&self) -> Vec<Route> {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
    }
}
