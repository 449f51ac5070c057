//! Session aggregate for the Tembea marketplace.
//!
//! Manages the single current session: restore at startup, login, signup,
//! and logout. The session survives restarts through the `session` storage
//! slot; the auth gateway models the remote identity provider.

use crate::gateway::AuthGateway;
use crate::storage::{self, SESSION_SLOT};
use crate::types::{Role, SessionState, User};
use std::sync::Arc;
use tembea_core::storage::SlotStore;
use tembea_core::{
    Effect, Reducer, SmallVec, async_effect, clear_slot, read_slot, smallvec, write_slot,
};
use tembea_macros::Action;

// ============================================================================
// Actions (Commands + Events)
// ============================================================================

/// Actions for the Session aggregate
///
/// Commands express intent, events record what happened.
#[derive(Action, Clone, Debug)]
pub enum SessionAction {
    // Commands
    /// Read the persisted session at startup
    #[command]
    Initialize,

    /// Sign an existing user in
    #[command]
    LogIn {
        /// Email address
        email: String,
        /// Password; accepted but never verified in current scope
        password: String,
        /// Role to sign in as
        role: Role,
    },

    /// Register and sign in a new user
    #[command]
    SignUp {
        /// Email address
        email: String,
        /// Password; accepted but never verified in current scope
        password: String,
        /// Display name
        name: String,
        /// Role to register as
        role: Role,
        /// Optional phone number
        phone: Option<String>,
    },

    /// End the current session
    #[command]
    LogOut,

    // Events
    /// The persisted session was read
    #[event]
    SessionRestored {
        /// The restored user, absent when no session was stored
        user: Option<User>,
    },

    /// The gateway produced a session user
    #[event]
    SignedIn {
        /// The now-current user
        user: User,
    },

    /// The session was ended
    #[event]
    SignedOut,

    /// A session operation failed (gateway or storage)
    #[event]
    SessionFaulted {
        /// Failure description
        error: String,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the Session aggregate
///
/// Sessions carry no timestamps, so unlike the catalog this environment
/// needs no clock.
#[derive(Clone)]
pub struct SessionEnvironment {
    /// Identity provider boundary
    pub gateway: Arc<dyn AuthGateway>,
    /// Durable slot storage
    pub storage: Arc<dyn SlotStore>,
}

impl SessionEnvironment {
    /// Creates a new `SessionEnvironment`
    #[must_use]
    pub fn new(gateway: Arc<dyn AuthGateway>, storage: Arc<dyn SlotStore>) -> Self {
        Self { gateway, storage }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the Session aggregate
///
/// Demonstrates the restore-on-startup and gateway-roundtrip patterns; the
/// reducer itself never performs I/O.
#[derive(Clone, Debug, Default)]
pub struct SessionReducer;

impl SessionReducer {
    /// Creates a new `SessionReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies an event to state
    fn apply_event(state: &mut SessionState, action: &SessionAction) {
        match action {
            SessionAction::SessionRestored { user } => {
                state.user = user.clone();
                state.restoring = false;
                state.last_error = None;
            }

            SessionAction::SignedIn { user } => {
                state.user = Some(user.clone());
                state.restoring = false;
                state.last_error = None;
            }

            SessionAction::SignedOut => {
                state.user = None;
                state.restoring = false;
                state.last_error = None;
            }

            SessionAction::SessionFaulted { error } => {
                state.last_error = Some(error.clone());
            }

            // Commands don't modify state
            SessionAction::Initialize
            | SessionAction::LogIn { .. }
            | SessionAction::SignUp { .. }
            | SessionAction::LogOut => {}
        }
    }
}

impl Reducer for SessionReducer {
    type State = SessionState;
    type Action = SessionAction;
    type Environment = SessionEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            SessionAction::Initialize => {
                smallvec![read_slot! {
                    storage: env.storage,
                    slot: SESSION_SLOT,
                    on_success: |bytes| Some(SessionAction::SessionRestored {
                        user: storage::decode_or_absent(SESSION_SLOT, bytes),
                    }),
                    on_error: |error| {
                        // An unreadable slot restores to signed-out rather
                        // than wedging startup.
                        tracing::warn!(%error, "session restore failed");
                        Some(SessionAction::SessionRestored { user: None })
                    }
                }]
            }

            SessionAction::LogIn {
                email,
                password,
                role,
            } => {
                let gateway = Arc::clone(&env.gateway);
                smallvec![async_effect! {
                    match gateway.authenticate(email, password, role).await {
                        Ok(user) => Some(SessionAction::SignedIn { user }),
                        Err(error) => Some(SessionAction::SessionFaulted {
                            error: error.to_string(),
                        }),
                    }
                }]
            }

            SessionAction::SignUp {
                email,
                password,
                name,
                role,
                phone,
            } => {
                let gateway = Arc::clone(&env.gateway);
                smallvec![async_effect! {
                    match gateway.register(email, password, name, role, phone).await {
                        Ok(user) => Some(SessionAction::SignedIn { user }),
                        Err(error) => Some(SessionAction::SessionFaulted {
                            error: error.to_string(),
                        }),
                    }
                }]
            }

            SessionAction::LogOut => {
                Self::apply_event(state, &SessionAction::SignedOut);
                smallvec![
                    clear_slot! {
                        storage: env.storage,
                        slot: SESSION_SLOT,
                        on_success: || None,
                        on_error: |error| Some(SessionAction::SessionFaulted {
                            error: error.to_string(),
                        })
                    },
                    async_effect! {
                        Some(SessionAction::SignedOut)
                    }
                ]
            }

            // ========== Events ==========
            SessionAction::SignedIn { user } => {
                let event = SessionAction::SignedIn { user: user.clone() };
                Self::apply_event(state, &event);

                match storage::encode(SESSION_SLOT, &user) {
                    Ok(payload) => smallvec![write_slot! {
                        storage: env.storage,
                        slot: SESSION_SLOT,
                        payload: payload,
                        on_success: || None,
                        on_error: |error| Some(SessionAction::SessionFaulted {
                            error: error.to_string(),
                        })
                    }],
                    Err(error) => {
                        Self::apply_event(
                            state,
                            &SessionAction::SessionFaulted {
                                error: error.to_string(),
                            },
                        );
                        SmallVec::new()
                    }
                }
            }

            event => {
                Self::apply_event(state, &event);
                SmallVec::new()
            }
        }
    }
}
