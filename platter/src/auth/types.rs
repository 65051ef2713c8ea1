//! Auth container state and actions.

use platter_api::models::{Credentials, Envelope, Id, RegisterRequest, Restaurant, User};
use platter_core::lifecycle::{Completion, Fence, Lifecycle};
use serde::Serialize;

/// Operation kinds of the auth container, used for request fencing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthOp {
    /// `POST /user/register`
    Register,
    /// `POST /user/login`
    Login,
    /// `GET /user/profile`
    Profile,
    /// `PUT /restaurants/{id}/add-favorites`
    ToggleFavorite,
}

/// Signed-in session produced by login or registration
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Bearer token, persisted once the session is admitted
    pub token: String,
    /// User described by the auth payload
    pub user: User,
    /// Server message
    pub message: Option<String>,
}

/// State of the auth container
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthState {
    /// Lifecycle of the latest auth operation
    pub lifecycle: Lifecycle,
    /// Signed-in user, if known
    pub user: Option<User>,
    /// Bearer token; absence means unauthenticated
    #[serde(skip)]
    pub token: Option<String>,
    /// Favorite restaurants, unique by id
    pub favorites: Vec<Restaurant>,
    #[serde(skip)]
    pub(crate) fence: Fence<AuthOp>,
}

impl AuthState {
    /// Initial state seeded from a persisted token
    #[must_use]
    pub fn with_token(token: Option<String>) -> Self {
        Self {
            token,
            ..Self::default()
        }
    }

    /// Whether a token is held (advisory)
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Whether `restaurant` is among the favorites
    #[must_use]
    pub fn is_favorite(&self, restaurant: &Id) -> bool {
        self.favorites.iter().any(|r| &r.id == restaurant)
    }
}

/// Actions of the auth container
#[derive(Debug, Clone)]
pub enum AuthAction {
    // Commands
    /// Create an account and sign in
    Register(RegisterRequest),
    /// Sign in
    Login(Credentials),
    /// Load the signed-in user's profile and favorites
    FetchProfile,
    /// Add or remove a restaurant from the favorites
    ToggleFavorite {
        /// Restaurant to toggle
        restaurant: Id,
    },
    /// Forget the session locally and in the credential store
    Logout,
    /// The HTTP client rejected the session and cleared the stored token
    SessionExpired,

    // Outcomes
    /// Registration finished
    Registered(Completion<Session>),
    /// Login finished
    LoggedIn(Completion<Session>),
    /// Profile fetch finished
    ProfileLoaded(Completion<Envelope<User>>),
    /// Favorite toggle finished, carrying the toggled restaurant
    FavoriteToggled(Completion<Envelope<Restaurant>>),
}
