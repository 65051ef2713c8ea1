//! # Platter Core
//!
//! Core traits and types for the Platter client state layer.
//!
//! Every container in the application (auth, cart, catalog) is built from the
//! same three pieces:
//!
//! - **State**: plain owned data for one container
//! - **Action**: every input the container understands, both commands
//!   (`Login { .. }`) and outcomes fed back by effects (`LoginCompleted(..)`)
//! - **Reducer**: pure function `(State, Action, Environment) → (State, Effects)`
//!
//! Effects describe the single HTTP call an operation performs; the runtime
//! crate executes them and feeds the resulting action back into the reducer.
//!
//! The [`lifecycle`] module holds the request-lifecycle convention shared by
//! all containers: the started / succeeded / failed transitions, the
//! normalized [`lifecycle::Failure`] payload, and request fencing.
//!
//! ## Example
//!
//! ```
//! use platter_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//! use platter_core::lifecycle::Lifecycle;
//!
//! #[derive(Default)]
//! struct PingState {
//!     lifecycle: Lifecycle,
//! }
//!
//! enum PingAction {
//!     Ping,
//! }
//!
//! struct PingReducer;
//!
//! impl Reducer for PingReducer {
//!     type State = PingState;
//!     type Action = PingAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut PingState,
//!         action: PingAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<PingAction>; 4]> {
//!         match action {
//!             PingAction::Ping => state.lifecycle.start(),
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = PingState::default();
//! let _ = PingReducer.reduce(&mut state, PingAction::Ping, &());
//! assert!(state.lifecycle.is_loading());
//! ```

pub use smallvec::{smallvec, SmallVec};

/// Declarative macros for building effects
pub mod effect_macros;

/// Request lifecycle convention shared by every container
pub mod lifecycle;

/// Reducer module - the core trait for container logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They never perform I/O themselves; the single network call of an operation
/// is returned as an [`Effect`](crate::effect::Effect) description.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for container logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The container state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for CartReducer {
    ///     type State = CartState;
    ///     type Action = CartAction;
    ///     type Environment = CartEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut CartState,
    ///         action: CartAction,
    ///         env: &CartEnvironment,
    ///     ) -> SmallVec<[Effect<CartAction>; 4]> {
    ///         match action {
    ///             CartAction::FetchCart => {
    ///                 state.lifecycle.start();
    ///                 // return the HTTP effect
    ///             }
    ///             // ...
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Updates `state` in place and returns effect descriptions for the
        /// runtime to execute. Must not block and must not panic.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side effect descriptions
///
/// Effects are values, not execution. A reducer returns them and the Store
/// runtime runs them, dispatching any action they produce back into the
/// same reducer.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// Run effects one after another, each finishing before the next starts
        Sequential(Vec<Effect<Action>>),

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Whether this effect does nothing when executed
        #[must_use]
        pub fn is_none(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Parallel(effects) | Effect::Sequential(effects) => {
                    effects.iter().all(Effect::is_none)
                },
                Effect::Future(_) => false,
            }
        }
    }
}
