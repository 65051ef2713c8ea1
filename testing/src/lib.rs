//! # Platter Testing
//!
//! Testing utilities for Platter containers.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then harness for pure reducer checks
//! - [`resolve_all`]: run returned effects and collect the actions they yield
//! - [`MockTransport`]: scripted HTTP responses keyed by method and path
//! - [`RecordingNavigator`]: captures navigation requests
//! - [`init_test_tracing`]: opt-in log output for tests
//!
//! ## Example
//!
//! ```ignore
//! use platter_testing::{MockTransport, resolve_all};
//!
//! #[tokio::test]
//! async fn cart_loads() {
//!     let transport = MockTransport::new();
//!     transport.envelope("GET", "/cart", "ok", json!({"items": []}));
//!     let env = CartEnvironment::new(FoodApi::new(Arc::new(transport)));
//!
//!     let mut state = CartState::default();
//!     let effects = CartReducer.reduce(&mut state, CartAction::FetchCart, &env);
//!     for action in resolve_all(effects).await {
//!         CartReducer.reduce(&mut state, action, &env);
//!     }
//! }
//! ```

pub mod mocks;

pub use mocks::{MemoryCredentialStore, MockTransport, RecordingNavigator};
pub use reducer_test::{assertions, resolve, resolve_all, ReducerTest};

/// Install a `tracing` subscriber for tests
///
/// Honors `RUST_LOG`, writes through the test harness capture, and is a no-op
/// when a subscriber is already installed.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
