//! Auth reducer: registration, login, profile, favorites and logout.

use super::types::{AuthAction, AuthOp, AuthState, Session};
use platter_api::models::{AuthPayload, Envelope, Restaurant};
use platter_api::{CredentialStore, FoodApi};
use platter_core::effect::Effect;
use platter_core::lifecycle::{perform, Completion, Failure};
use platter_core::reducer::Reducer;
use platter_core::{async_effect, smallvec, SmallVec};
use std::sync::Arc;

/// Dependencies of the auth container
#[derive(Clone)]
pub struct AuthEnvironment {
    /// Typed API facade
    pub api: FoodApi,
    /// Where the bearer token is persisted
    pub credentials: Arc<dyn CredentialStore>,
}

impl AuthEnvironment {
    /// Creates an auth environment
    #[must_use]
    pub fn new(api: FoodApi, credentials: Arc<dyn CredentialStore>) -> Self {
        Self { api, credentials }
    }
}

/// Reducer of the auth container
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthReducer;

impl AuthReducer {
    /// Creates an auth reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Flip membership of `restaurant` in `favorites`
    ///
    /// Applying the same toggle twice restores the original list.
    pub fn toggle_favorite(favorites: &mut Vec<Restaurant>, restaurant: Restaurant) {
        if favorites.iter().any(|r| r.id == restaurant.id) {
            favorites.retain(|r| r.id != restaurant.id);
        } else {
            favorites.push(restaurant);
        }
    }

    fn clear_session(state: &mut AuthState) {
        state.user = None;
        state.token = None;
        state.favorites.clear();
    }

    /// Merge an admitted session and persist its token
    ///
    /// Superseded sessions never reach the credential store.
    fn apply_session(
        state: &mut AuthState,
        op: AuthOp,
        completion: Completion<Session>,
        env: &AuthEnvironment,
    ) -> SmallVec<[Effect<AuthAction>; 4]> {
        if !state.fence.admit(&op, completion.request) {
            return smallvec![Effect::None];
        }
        match completion.result {
            Ok(session) => {
                tracing::debug!(?op, "Session established");
                state.user = Some(session.user);
                state.token = Some(session.token.clone());
                state.lifecycle.succeed_with_message(session.message);

                let credentials = Arc::clone(&env.credentials);
                let token = session.token;
                smallvec![async_effect! {
                    if let Err(error) = credentials.set(&token) {
                        tracing::warn!(%error, "Failed to persist token");
                    }
                    None
                }]
            },
            Err(failure) => {
                state.lifecycle.fail(failure);
                smallvec![Effect::None]
            },
        }
    }
}

fn into_session(envelope: Envelope<AuthPayload>) -> Session {
    let (token, user) = envelope.payload.into_session();
    Session {
        token,
        user,
        message: envelope.message,
    }
}

impl Reducer for AuthReducer {
    type State = AuthState;
    type Action = AuthAction;
    type Environment = AuthEnvironment;

    fn reduce(
        &self,
        state: &mut AuthState,
        action: AuthAction,
        env: &AuthEnvironment,
    ) -> SmallVec<[Effect<AuthAction>; 4]> {
        match action {
            AuthAction::Register(form) => {
                state.lifecycle.start();
                let request = state.fence.issue(AuthOp::Register);
                let api = env.api.clone();
                smallvec![perform(
                    request,
                    async move {
                        api.register(&form)
                            .await
                            .map(into_session)
                            .map_err(Failure::from)
                    },
                    AuthAction::Registered,
                )]
            },

            AuthAction::Login(credentials_form) => {
                state.lifecycle.start();
                let request = state.fence.issue(AuthOp::Login);
                let api = env.api.clone();
                smallvec![perform(
                    request,
                    async move {
                        api.login(&credentials_form)
                            .await
                            .map(into_session)
                            .map_err(Failure::from)
                    },
                    AuthAction::LoggedIn,
                )]
            },

            AuthAction::FetchProfile => {
                state.lifecycle.start();
                let request = state.fence.issue(AuthOp::Profile);
                let api = env.api.clone();
                smallvec![perform(
                    request,
                    async move { api.profile().await.map_err(Failure::from) },
                    AuthAction::ProfileLoaded,
                )]
            },

            AuthAction::ToggleFavorite { restaurant } => {
                state.lifecycle.start();
                let request = state.fence.issue(AuthOp::ToggleFavorite);
                let api = env.api.clone();
                smallvec![perform(
                    request,
                    async move { api.toggle_favorite(&restaurant).await.map_err(Failure::from) },
                    AuthAction::FavoriteToggled,
                )]
            },

            AuthAction::Logout => {
                tracing::debug!("Logging out");
                Self::clear_session(state);
                let credentials = Arc::clone(&env.credentials);
                smallvec![async_effect! {
                    if let Err(error) = credentials.clear() {
                        tracing::warn!(%error, "Failed to clear persisted token");
                    }
                    None
                }]
            },

            AuthAction::SessionExpired => {
                tracing::info!("Session expired, signing out");
                Self::clear_session(state);
                smallvec![Effect::None]
            },

            AuthAction::Registered(completion) => {
                Self::apply_session(state, AuthOp::Register, completion, env)
            },

            AuthAction::LoggedIn(completion) => {
                Self::apply_session(state, AuthOp::Login, completion, env)
            },

            AuthAction::ProfileLoaded(Completion { request, result }) => {
                if state.fence.admit(&AuthOp::Profile, request) {
                    match result {
                        Ok(envelope) => {
                            let user = envelope.payload;
                            state.favorites.clone_from(&user.favorites);
                            state.user = Some(user);
                            state.lifecycle.succeed();
                        },
                        Err(failure) => state.lifecycle.fail(failure),
                    }
                }
                smallvec![Effect::None]
            },

            AuthAction::FavoriteToggled(Completion { request, result }) => {
                if state.fence.admit(&AuthOp::ToggleFavorite, request) {
                    match result {
                        Ok(envelope) => {
                            Self::toggle_favorite(&mut state.favorites, envelope.payload);
                            state.lifecycle.succeed_with_message(envelope.message);
                        },
                        Err(failure) => state.lifecycle.fail(failure),
                    }
                }
                smallvec![Effect::None]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platter_api::models::{Credentials, Id, User};
    use platter_api::MemoryCredentialStore;
    use platter_core::lifecycle::{RequestId, Status};
    use platter_testing::{assertions, resolve_all, MockTransport, ReducerTest};
    use platter_runtime::Store;
    use proptest::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn env_with(transport: MockTransport, credentials: Arc<MemoryCredentialStore>) -> AuthEnvironment {
        AuthEnvironment::new(FoodApi::new(Arc::new(transport)), credentials)
    }

    fn env() -> AuthEnvironment {
        env_with(MockTransport::new(), Arc::new(MemoryCredentialStore::new()))
    }

    fn restaurant(id: i64) -> Restaurant {
        Restaurant::new(id, format!("R{id}"))
    }

    /// Reduce `action` and every action its effects feed back
    async fn drive(state: &mut AuthState, action: AuthAction, env: &AuthEnvironment) {
        let mut queue = vec![action];
        while let Some(action) = queue.pop() {
            let effects = AuthReducer.reduce(state, action, env);
            queue.extend(resolve_all(effects).await);
        }
    }

    #[test]
    fn login_starts_request() {
        ReducerTest::new(AuthReducer::new())
            .with_env(env())
            .given_state(AuthState::default())
            .when_action(AuthAction::Login(Credentials::new("a@b.c", "pw")))
            .then_state(|state| {
                assert!(state.lifecycle.is_loading());
                assert_eq!(state.lifecycle.error(), None);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[tokio::test]
    async fn login_persists_token_and_sets_user() {
        let transport = MockTransport::new();
        transport.envelope(
            "POST",
            "/user/login",
            "Welcome back",
            json!({"jwt": "jwt-1", "email": "a@b.c", "userName": "ada", "role": "USER"}),
        );
        let credentials = Arc::new(MemoryCredentialStore::new());
        let env = env_with(transport, Arc::clone(&credentials));

        let mut state = AuthState::default();
        drive(&mut state, AuthAction::Login(Credentials::new("a@b.c", "pw")), &env).await;

        assert_eq!(state.lifecycle.status(), Status::Success);
        assert_eq!(state.lifecycle.message(), Some("Welcome back"));
        assert_eq!(state.token.as_deref(), Some("jwt-1"));
        assert_eq!(
            state.user.as_ref().and_then(|u| u.user_name.as_deref()),
            Some("ada")
        );
        assert_eq!(credentials.get().as_deref(), Some("jwt-1"));
    }

    #[tokio::test]
    async fn failed_register_keeps_previous_state() {
        let transport = MockTransport::new();
        transport.fail("POST", "/user/register", 409, json!({"message": "Email taken"}));
        let env = env_with(transport, Arc::new(MemoryCredentialStore::new()));

        let mut state = AuthState::with_token(Some("old".to_string()));
        let form = platter_api::models::RegisterRequest {
            user_name: "ada".to_string(),
            email: "a@b.c".to_string(),
            password: "pw".to_string(),
            role: None,
        };
        let effects = AuthReducer.reduce(&mut state, AuthAction::Register(form), &env);
        for action in resolve_all(effects).await {
            AuthReducer.reduce(&mut state, action, &env);
        }

        assert_eq!(state.lifecycle.status(), Status::Error);
        assert_eq!(
            state.lifecycle.error(),
            Some(&Failure::Server(json!({"message": "Email taken"})))
        );
        assert_eq!(state.token.as_deref(), Some("old"));
        assert!(!state.lifecycle.is_loading());
    }

    #[tokio::test]
    async fn profile_replaces_user_and_favorites() {
        let transport = MockTransport::new();
        transport.envelope(
            "GET",
            "/user/profile",
            "ok",
            json!({"email": "a@b.c", "favorites": [{"id": 1, "name": "R1"}, {"id": 2}]}),
        );
        let env = env_with(transport, Arc::new(MemoryCredentialStore::new()));

        let mut state = AuthState::default();
        state.favorites.push(restaurant(9));
        let effects = AuthReducer.reduce(&mut state, AuthAction::FetchProfile, &env);
        for action in resolve_all(effects).await {
            AuthReducer.reduce(&mut state, action, &env);
        }

        let ids: Vec<Id> = state.favorites.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![Id::from(1), Id::from(2)]);
        assert_eq!(state.user.as_ref().map(|u| u.favorites.len()), Some(2));
        assert_eq!(state.lifecycle.status(), Status::Success);
    }

    #[test]
    fn logout_clears_session_and_schedules_credential_clear() {
        let mut state = AuthState::with_token(Some("jwt".to_string()));
        state.user = Some(User {
            email: Some("a@b.c".to_string()),
            user_name: None,
            role: None,
            favorites: Vec::new(),
            details: serde_json::Map::new(),
        });

        ReducerTest::new(AuthReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(AuthAction::Logout)
            .then_state(|state| {
                assert!(state.user.is_none());
                assert!(!state.is_authenticated());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[tokio::test]
    async fn logout_effect_clears_store() {
        let credentials = Arc::new(MemoryCredentialStore::with_token("jwt"));
        let env = env_with(MockTransport::new(), Arc::clone(&credentials));
        let mut state = AuthState::with_token(Some("jwt".to_string()));

        let effects = AuthReducer.reduce(&mut state, AuthAction::Logout, &env);
        assert!(resolve_all(effects).await.is_empty());
        assert_eq!(credentials.get(), None);
    }

    #[test]
    fn superseded_login_is_ignored() {
        let session = |token: &str| Session {
            token: token.to_string(),
            user: serde_json::from_value(json!({})).unwrap(),
            message: None,
        };

        let mut state = AuthState::default();
        let env = env();
        let _ = AuthReducer.reduce(&mut state, AuthAction::Login(Credentials::new("a", "1")), &env);
        let _ = AuthReducer.reduce(&mut state, AuthAction::Login(Credentials::new("b", "2")), &env);

        // Request ids are issued from 1 upwards.
        AuthReducer.reduce(
            &mut state,
            AuthAction::LoggedIn(Completion::new(RequestId::new(1), Ok(session("first")))),
            &env,
        );
        assert!(state.token.is_none());
        assert!(state.lifecycle.is_loading());

        AuthReducer.reduce(
            &mut state,
            AuthAction::LoggedIn(Completion::new(RequestId::new(2), Ok(session("second")))),
            &env,
        );
        assert_eq!(state.token.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn overlapping_logins_persist_only_the_admitted_token() {
        let transport = MockTransport::new();
        transport.respond_after(
            "POST",
            "/user/login",
            Duration::from_millis(150),
            Ok(json!({"message": "slow", "payload": {"jwt": "first"}})),
        );
        transport.respond(
            "POST",
            "/user/login",
            Ok(json!({"message": "fast", "payload": {"jwt": "second"}})),
        );
        let credentials = Arc::new(MemoryCredentialStore::new());
        let store = Store::new(
            AuthState::default(),
            AuthReducer::new(),
            env_with(transport, Arc::clone(&credentials)),
        );

        let mut first = store
            .send(AuthAction::Login(Credentials::new("a", "1")))
            .await
            .unwrap();
        // Let the first login claim the delayed response
        tokio::time::sleep(Duration::from_millis(30)).await;
        let mut second = store
            .send(AuthAction::Login(Credentials::new("b", "2")))
            .await
            .unwrap();
        second.wait_with_timeout(Duration::from_secs(5)).await.unwrap();
        first.wait_with_timeout(Duration::from_secs(5)).await.unwrap();

        let token = store.state(|s| s.token.clone()).await;
        assert_eq!(token.as_deref(), Some("second"));
        assert_eq!(credentials.get(), token);
    }

    #[tokio::test]
    async fn favorite_toggle_outcome_flips_membership() {
        let transport = MockTransport::new();
        transport.envelope(
            "PUT",
            "/restaurants/2/add-favorites",
            "Favorites updated",
            json!({"id": 2, "name": "R2"}),
        );
        let env = env_with(transport, Arc::new(MemoryCredentialStore::new()));

        let mut state = AuthState::default();
        state.favorites = vec![restaurant(1)];
        drive(&mut state, AuthAction::ToggleFavorite { restaurant: Id::from(2) }, &env).await;

        let ids: Vec<Id> = state.favorites.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![Id::from(1), Id::from(2)]);
        assert_eq!(state.lifecycle.message(), Some("Favorites updated"));
        assert_eq!(state.lifecycle.status(), Status::Success);

        drive(&mut state, AuthAction::ToggleFavorite { restaurant: Id::from(2) }, &env).await;
        assert_eq!(state.favorites, vec![restaurant(1)]);
    }

    proptest! {
        #[test]
        fn toggle_is_an_involution(
            initial in proptest::collection::btree_set(0i64..20, 0..10),
            target in 0i64..20,
        ) {
            let original: Vec<Restaurant> = initial.iter().copied().map(restaurant).collect();
            let mut favorites = original.clone();

            AuthReducer::toggle_favorite(&mut favorites, restaurant(target));
            prop_assert_eq!(
                favorites.iter().any(|r| r.id == Id::from(target)),
                !initial.contains(&target)
            );

            AuthReducer::toggle_favorite(&mut favorites, restaurant(target));
            let mut before: Vec<Id> = original.iter().map(|r| r.id.clone()).collect();
            let mut after: Vec<Id> = favorites.iter().map(|r| r.id.clone()).collect();
            before.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            after.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            prop_assert_eq!(before, after);
        }
    }
}
