//! Request lifecycle convention.
//!
//! Every async operation in every container moves through the same three
//! transitions:
//!
//! - **started**: `status = Loading`, previous error cleared
//! - **succeeded**: `status = Success`, operation-specific merge applied
//! - **failed**: `status = Error`, failure payload stored verbatim
//!
//! [`Lifecycle`] owns the bookkeeping fields, [`Failure`] is the normalized
//! error payload, and [`Fence`] hands out [`RequestId`]s so a container can
//! drop completions that were overtaken by a newer request of the same kind.

use crate::effect::Effect;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;

/// Lifecycle status of the most recent operation in a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No operation dispatched yet
    #[default]
    Idle,
    /// An operation is in flight
    Loading,
    /// The latest operation succeeded
    Success,
    /// The latest operation failed
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Normalized failure payload of an operation
///
/// When the server answered with a body, that body is kept verbatim so the UI
/// can render whatever the backend said. Transport problems and timeouts have
/// no body and carry a generic message instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Failure {
    /// Structured error body returned by the server
    Server(serde_json::Value),
    /// Generic message for failures without a server body
    Message(String),
}

impl Failure {
    /// Human-readable summary of the failure
    ///
    /// For server bodies this is the `message` field when present, otherwise
    /// the body rendered as JSON.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Server(serde_json::Value::String(text)) => text.clone(),
            Self::Server(body) => body
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map_or_else(|| body.to_string(), str::to_string),
            Self::Message(message) => message.clone(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

/// Lifecycle bookkeeping embedded in every container state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Lifecycle {
    status: Status,
    error: Option<Failure>,
    message: Option<String>,
}

impl Lifecycle {
    /// Current status
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Whether an operation is in flight (`status == Loading`)
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }

    /// Last failure payload, if the error has not been cleared since
    #[must_use]
    pub const fn error(&self) -> Option<&Failure> {
        self.error.as_ref()
    }

    /// Last human-readable message from the server
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Apply the **started** transition
    pub fn start(&mut self) {
        self.status = Status::Loading;
        self.error = None;
    }

    /// Apply the **succeeded** transition, leaving the message untouched
    pub fn succeed(&mut self) {
        self.status = Status::Success;
    }

    /// Apply the **succeeded** transition and replace the message
    pub fn succeed_with_message(&mut self, message: Option<String>) {
        self.status = Status::Success;
        self.message = message;
    }

    /// Apply the **failed** transition
    pub fn fail(&mut self, failure: Failure) {
        self.status = Status::Error;
        self.error = Some(failure);
    }

    /// Drop the stored error and message without touching the status
    pub fn clear_feedback(&mut self) {
        self.error = None;
        self.message = None;
    }
}

/// Monotonic identifier of one dispatched request within a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Creates a request id from its raw value
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw sequence value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of one operation, fed back into the reducer
#[derive(Debug, Clone, PartialEq)]
pub struct Completion<T> {
    /// The request this outcome belongs to
    pub request: RequestId,
    /// Success payload or normalized failure
    pub result: Result<T, Failure>,
}

impl<T> Completion<T> {
    /// Creates a completion for `request`
    #[must_use]
    pub const fn new(request: RequestId, result: Result<T, Failure>) -> Self {
        Self { request, result }
    }
}

/// Per-kind request fencing
///
/// Each dispatch of an operation kind takes a fresh [`RequestId`]; only the
/// completion carrying the latest id of its kind is admitted. Completions of
/// different kinds never fence each other.
#[derive(Debug, Clone)]
pub struct Fence<K> {
    next: u64,
    latest: HashMap<K, RequestId>,
}

impl<K> Default for Fence<K> {
    fn default() -> Self {
        Self {
            next: 0,
            latest: HashMap::new(),
        }
    }
}

impl<K> Fence<K>
where
    K: Eq + Hash + fmt::Debug,
{
    /// Issue a new request id for `kind`, superseding any earlier one
    pub fn issue(&mut self, kind: K) -> RequestId {
        self.next += 1;
        let id = RequestId(self.next);
        self.latest.insert(kind, id);
        id
    }

    /// Whether `request` is still the latest request of `kind`
    #[must_use]
    pub fn is_current(&self, kind: &K, request: RequestId) -> bool {
        self.latest.get(kind) == Some(&request)
    }

    /// Like [`Fence::is_current`], logging discarded completions
    #[must_use]
    pub fn admit(&self, kind: &K, request: RequestId) -> bool {
        let current = self.is_current(kind, request);
        if !current {
            tracing::warn!(
                kind = ?kind,
                request = %request,
                latest = ?self.latest.get(kind),
                "Discarding superseded completion"
            );
        }
        current
    }
}

/// Wrap one operation future into an effect yielding its completion action
///
/// `complete` is usually an action variant constructor such as
/// `CartAction::CartLoaded`.
pub fn perform<A, T, F>(
    request: RequestId,
    operation: F,
    complete: fn(Completion<T>) -> A,
) -> Effect<A>
where
    F: Future<Output = Result<T, Failure>> + Send + 'static,
    T: Send + 'static,
    A: Send + 'static,
{
    Effect::Future(Box::pin(async move {
        let result = operation.await;
        Some(complete(Completion::new(request, result)))
    }))
}
