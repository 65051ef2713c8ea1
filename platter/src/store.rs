//! Application store: one runtime [`Store`] per container over a shared API client.

use crate::auth::{AuthAction, AuthEnvironment, AuthReducer, AuthState};
use crate::cart::{CartAction, CartEnvironment, CartReducer, CartState};
use crate::catalog::{CatalogAction, CatalogEnvironment, CatalogReducer, CatalogState};
use platter_api::{
    ApiClient, ApiConfig, ApiError, ChannelNavigator, ConfigError, CredentialError,
    CredentialStore, FileCredentialStore, FoodApi, MemoryCredentialStore, Route,
};
use platter_runtime::{Store, StoreError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Store of the auth container
pub type AuthStore = Store<AuthState, AuthAction, AuthEnvironment, AuthReducer>;
/// Store of the cart container
pub type CartStore = Store<CartState, CartAction, CartEnvironment, CartReducer>;
/// Store of the catalog container
pub type CatalogStore = Store<CatalogState, CatalogAction, CatalogEnvironment, CatalogReducer>;

/// Errors raised while assembling or stopping the application store
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The credential store could not be opened
    #[error("Credential store error: {0}")]
    Credentials(#[from] CredentialError),

    /// The HTTP client could not be built
    #[error("API client error: {0}")]
    Api(#[from] ApiError),

    /// A container store did not stop cleanly
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Serializable view of every container
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Auth container
    pub auth: AuthState,
    /// Cart container
    pub cart: CartState,
    /// Catalog container
    pub catalog: CatalogState,
}

/// The three containers wired to one API client
///
/// Navigation requests from the client are forwarded to the auth container
/// as [`AuthAction::SessionExpired`], so a 401 on any call signs the user out.
pub struct AppStore {
    auth: AuthStore,
    cart: CartStore,
    catalog: CatalogStore,
    credentials: Arc<dyn CredentialStore>,
    session_listener: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for AppStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStore")
            .field("listening", &self.session_listener.is_some())
            .finish_non_exhaustive()
    }
}

impl AppStore {
    /// Build the application store from configuration
    ///
    /// The token is kept in `config.token_file` when set, in memory otherwise.
    /// Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid, the token file cannot be read,
    /// or the HTTP client cannot be built.
    pub fn connect(config: &ApiConfig) -> Result<Self, AppError> {
        config.validate()?;
        let credentials: Arc<dyn CredentialStore> = match &config.token_file {
            Some(path) => Arc::new(FileCredentialStore::open(path)?),
            None => Arc::new(MemoryCredentialStore::new()),
        };
        Self::with_credentials(config, credentials)
    }

    /// Build the application store over a given credential store
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn with_credentials(
        config: &ApiConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, AppError> {
        let (navigator, routes) = ChannelNavigator::channel();
        let client = ApiClient::new(config, Arc::clone(&credentials), Arc::new(navigator))?;
        tracing::info!(base_url = client.base_url(), "API client ready");
        Ok(Self::assemble(
            FoodApi::new(Arc::new(client)),
            credentials,
            Some(routes),
        ))
    }

    /// Wire the containers over an existing API facade
    ///
    /// The auth container starts from the token already in `credentials`.
    /// When `routes` is given, a task forwards login navigations to the auth
    /// container; it then must be called inside a Tokio runtime.
    #[must_use]
    pub fn assemble(
        api: FoodApi,
        credentials: Arc<dyn CredentialStore>,
        routes: Option<UnboundedReceiver<Route>>,
    ) -> Self {
        let auth = Store::new(
            AuthState::with_token(credentials.get()),
            AuthReducer::new(),
            AuthEnvironment::new(api.clone(), Arc::clone(&credentials)),
        );
        let cart = Store::new(
            CartState::default(),
            CartReducer::new(),
            CartEnvironment::new(api.clone()),
        );
        let catalog = Store::new(
            CatalogState::default(),
            CatalogReducer::new(),
            CatalogEnvironment::new(api),
        );

        let session_listener = routes.map(|routes| spawn_session_listener(auth.clone(), routes));

        Self {
            auth,
            cart,
            catalog,
            credentials,
            session_listener,
        }
    }

    /// Auth container
    #[must_use]
    pub const fn auth(&self) -> &AuthStore {
        &self.auth
    }

    /// Cart container
    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Catalog container
    #[must_use]
    pub const fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// Credential store shared with the HTTP client
    #[must_use]
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Copy of every container's state
    pub async fn snapshot(&self) -> Snapshot {
        Snapshot {
            auth: self.auth.state(Clone::clone).await,
            cart: self.cart.state(Clone::clone).await,
            catalog: self.catalog.state(Clone::clone).await,
        }
    }

    /// Stop the session listener and wait for in-flight requests
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if a container still has running effects
    /// after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), AppError> {
        if let Some(listener) = &self.session_listener {
            listener.abort();
        }
        self.auth.shutdown(timeout).await?;
        self.cart.shutdown(timeout).await?;
        self.catalog.shutdown(timeout).await?;
        Ok(())
    }
}

impl Drop for AppStore {
    fn drop(&mut self) {
        if let Some(listener) = self.session_listener.take() {
            listener.abort();
        }
    }
}

fn spawn_session_listener(auth: AuthStore, mut routes: UnboundedReceiver<Route>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(route) = routes.recv().await {
            match route {
                Route::Login => {
                    tracing::info!(path = route.path(), "Session rejected, signing out");
                    if let Err(error) = auth.send(AuthAction::SessionExpired).await {
                        tracing::warn!(%error, "Session listener stopping");
                        break;
                    }
                },
            }
        }
    })
}
