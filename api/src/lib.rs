//! # Platter API
//!
//! Client for the food-ordering REST API.
//!
//! - [`ApiClient`]: the single HTTP client. Attaches the bearer token from a
//!   [`CredentialStore`] to every request and, on a 401, clears the token and
//!   navigates to the login route through a [`Navigator`].
//! - [`Transport`]: the seam between typed operations and the wire, so tests
//!   can script responses without a server.
//! - [`FoodApi`]: one typed method per endpoint, each issuing exactly one
//!   request and decoding the `{message, payload}` [`Envelope`].
//!
//! ## Example
//!
//! ```no_run
//! use platter_api::{
//!     ApiClient, ApiConfig, FoodApi, LoggingNavigator, MemoryCredentialStore,
//!     models::Credentials,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ApiConfig::from_env()?;
//! let client = ApiClient::new(
//!     &config,
//!     Arc::new(MemoryCredentialStore::new()),
//!     Arc::new(LoggingNavigator),
//! )?;
//! let api = FoodApi::new(Arc::new(client));
//!
//! let login = api
//!     .login(&Credentials::new("ada@example.com", "secret"))
//!     .await?;
//! println!("{:?}", login.message);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod navigator;
pub mod service;
pub mod transport;

// Re-export main types for convenience
pub use client::ApiClient;
pub use config::{ApiConfig, ConfigError};
pub use credentials::{
    CredentialError, CredentialStore, FileCredentialStore, MemoryCredentialStore, TOKEN_KEY,
};
pub use error::ApiError;
pub use models::{Envelope, Id, Money};
pub use navigator::{ChannelNavigator, LoggingNavigator, Navigator, Route};
pub use service::FoodApi;
pub use transport::{ApiRequest, BoxFuture, Transport};
