//! # Tembea Core
//!
//! Core traits and types for the Tembea store architecture.
//!
//! The marketplace is built as a set of stores, each owning one slice of
//! application state. All business logic lives in pure reducers; all side
//! effects (gateway round-trips, durable-storage access, delays) are
//! described as [`effect::Effect`] values and executed by the runtime.
//!
//! ## Core Concepts
//!
//! - **State**: owned domain state for one store
//! - **Action**: all possible inputs to a reducer (commands and events)
//! - **Reducer**: pure function `(State, Action, Environment) → Effects`
//! - **Effect**: a side-effect description, not its execution
//! - **Environment**: injected dependencies behind traits
//!
//! ## Architecture Principles
//!
//! - Functional core, imperative shell
//! - Unidirectional data flow
//! - Explicit effects (no hidden I/O in reducers)
//! - Dependency injection via the Environment
//!
//! ## Example
//!
//! ```ignore
//! use tembea_core::{Effect, Reducer, SmallVec, smallvec};
//!
//! impl Reducer for SessionReducer {
//!     type State = SessionState;
//!     type Action = SessionAction;
//!     type Environment = SessionEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut SessionState,
//!         action: SessionAction,
//!         env: &SessionEnvironment,
//!     ) -> SmallVec<[Effect<SessionAction>; 4]> {
//!         // Business logic goes here
//!         smallvec![]
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

pub use effect::Effect;
pub use reducer::Reducer;

mod effect_macros;

/// Reducer module - the core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → Effects`.
/// They contain all business logic and are deterministic and testable:
/// the only non-determinism (time, ids fabricated by remote gateways,
/// storage contents) enters through the Environment or through actions
/// produced by effects.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// # Returns
        ///
        /// The effects to be executed by the runtime. Most actions produce
        /// zero or one effect, so the vector is inline-allocated.
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
/// Effects describe side effects to be performed by the runtime. They are
/// values (not execution) and compose via [`Effect::Parallel`] and
/// [`Effect::Sequential`]. An effect may produce an action, which the
/// runtime feeds back into the reducer.
pub mod effect {
    use super::storage::{SlotStore, StorageError};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::time::Duration;

    /// Callback invoked with the outcome of a storage operation.
    ///
    /// Returns the action to feed back into the reducer, or `None` when the
    /// outcome needs no further processing.
    pub type StorageCallback<T, Action> = Box<dyn FnOnce(T) -> Option<Action> + Send>;

    /// A durable-storage operation carried by [`Effect::Storage`].
    ///
    /// Reducers never touch storage directly; they return one of these and
    /// the runtime performs the I/O, translating the result through the
    /// success/error callbacks.
    pub enum StorageOperation<Action> {
        /// Read the raw bytes of a slot (`None` when the slot is absent)
        Read {
            /// Storage backend
            storage: Arc<dyn SlotStore>,
            /// Slot name
            slot: String,
            /// Called with the slot contents
            on_success: StorageCallback<Option<Vec<u8>>, Action>,
            /// Called when the read fails
            on_error: StorageCallback<StorageError, Action>,
        },

        /// Replace the contents of a slot
        Write {
            /// Storage backend
            storage: Arc<dyn SlotStore>,
            /// Slot name
            slot: String,
            /// Serialized payload to store
            payload: Vec<u8>,
            /// Called once the write landed
            on_success: StorageCallback<(), Action>,
            /// Called when the write fails
            on_error: StorageCallback<StorageError, Action>,
        },

        /// Remove a slot (absent slots are not an error)
        Remove {
            /// Storage backend
            storage: Arc<dyn SlotStore>,
            /// Slot name
            slot: String,
            /// Called once the slot is gone
            on_success: StorageCallback<(), Action>,
            /// Called when the removal fails
            on_error: StorageCallback<StorageError, Action>,
        },
    }

    impl<Action> StorageOperation<Action> {
        /// The slot this operation targets
        #[must_use]
        pub fn slot(&self) -> &str {
            match self {
                Self::Read { slot, .. } | Self::Write { slot, .. } | Self::Remove { slot, .. } => {
                    slot
                }
            }
        }
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what
    /// should happen, returned from reducers and executed by the Store
    /// runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (for timeouts, reminders)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after the delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if `Some`, the action is fed back
        /// into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

        /// Durable-storage operation (read/write/remove a slot)
        Storage(StorageOperation<Action>),
    }

    // Manual Debug implementation since Future and the storage callbacks
    // don't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                }
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                }
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Storage(op) => {
                    let kind = match op {
                        StorageOperation::Read { .. } => "read",
                        StorageOperation::Write { .. } => "write",
                        StorageOperation::Remove { .. } => "remove",
                    };
                    f.debug_struct("Effect::Storage")
                        .field("kind", &kind)
                        .field("slot", &op.slot())
                        .finish()
                }
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
    }
}

/// Storage module - the durable key-value boundary
///
/// The application persists small JSON documents into named slots (the
/// current session, the booking ledger). The backend is injected behind
/// [`storage::SlotStore`] so production can use files and tests can use
/// memory; reducers only ever see [`effect::Effect::Storage`] descriptions.
pub mod storage {
    use std::future::Future;
    use std::pin::Pin;
    use thiserror::Error;

    /// Boxed future returned by [`SlotStore`] operations.
    ///
    /// Boxed (rather than `async fn`) so the trait stays dyn-compatible and
    /// can be injected as `Arc<dyn SlotStore>`.
    pub type StorageFuture<'a, T> =
        Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

    /// Errors that can occur while accessing durable storage
    #[derive(Error, Debug, Clone)]
    pub enum StorageError {
        /// The underlying medium failed (filesystem, etc.)
        #[error("storage io failure: {0}")]
        Io(String),

        /// A payload could not be serialized for storage
        #[error("could not encode payload for slot '{slot}': {reason}")]
        Encode {
            /// Slot the payload was destined for
            slot: String,
            /// Serializer error message
            reason: String,
        },
    }

    /// Named-slot durable storage
    ///
    /// Two slots exist in the marketplace: the serialized current-session
    /// user and the serialized booking ledger. Reads happen once at
    /// startup per store; writes happen on every mutating operation.
    ///
    /// Implementations must tolerate concurrent calls; the single-writer,
    /// last-write-wins discipline is the caller's responsibility.
    pub trait SlotStore: Send + Sync {
        /// Read the raw contents of a slot
        ///
        /// Returns `Ok(None)` when the slot has never been written (or was
        /// removed). Malformed *content* is not this layer's concern - the
        /// caller decides how to decode.
        ///
        /// # Errors
        ///
        /// Returns [`StorageError::Io`] when the medium fails.
        fn read(&self, slot: &str) -> StorageFuture<'_, Option<Vec<u8>>>;

        /// Replace the contents of a slot
        ///
        /// # Errors
        ///
        /// Returns [`StorageError::Io`] when the medium fails.
        fn write(&self, slot: &str, payload: Vec<u8>) -> StorageFuture<'_, ()>;

        /// Remove a slot; removing an absent slot succeeds
        ///
        /// # Errors
        ///
        /// Returns [`StorageError::Io`] when the medium fails.
        fn remove(&self, slot: &str) -> StorageFuture<'_, ()>;
    }
}

/// Environment module - dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter. The clock lives here because every
/// aggregate needs it; domain-specific collaborators (gateways, storage
/// backends) are defined next to their domains.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use tembea_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let now = clock.now();
    /// assert!(now.timestamp() > 0);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
