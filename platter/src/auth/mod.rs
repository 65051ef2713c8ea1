//! Auth container: the signed-in user, the bearer token and favorites.
//!
//! An admitted login or registration persists its token through the
//! [`CredentialStore`](platter_api::CredentialStore) in an effect of the
//! outcome; superseded responses are never written. Logout clears it; a 401 anywhere clears it in the HTTP client and
//! arrives here as [`AuthAction::SessionExpired`].

pub mod reducer;
pub mod types;

pub use reducer::{AuthEnvironment, AuthReducer};
pub use types::{AuthAction, AuthOp, AuthState, Session};
