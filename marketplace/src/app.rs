//! Application facade - wires the stores together.
//!
//! `MarketplaceApp` is the composition root: it builds the storage backend,
//! the mock gateways, and the two stores, and exposes the operations a
//! frontend needs. The stores are owned here and injected into nothing
//! global; embedders hold the app and pass it down.

use crate::aggregates::{
    CatalogAction, CatalogEnvironment, CatalogReducer, SessionAction, SessionEnvironment,
    SessionReducer,
};
use crate::analytics::{AttendeeSummary, EventFilter, OrganizerSummary};
use crate::config::Config;
use crate::gateway::{AuthGateway, MockAuthGateway, MockPaymentGateway, PaymentGateway};
use crate::storage::JsonFileStore;
use crate::types::{
    Booking, CatalogState, Event, EventDraft, EventId, PaymentMethod, RejectReason, Role,
    SessionState, User,
};
use std::sync::Arc;
use std::time::Duration;
use tembea_core::environment::{Clock, SystemClock};
use tembea_core::storage::SlotStore;
use tembea_runtime::{Store, StoreError};
use thiserror::Error;

/// How long startup waits for the persisted slots to be read
const START_TIMEOUT: Duration = Duration::from_secs(5);

/// The session store, fully typed
pub type SessionStore = Store<SessionState, SessionAction, SessionEnvironment, SessionReducer>;

/// The catalog store, fully typed
pub type CatalogStore = Store<CatalogState, CatalogAction, CatalogEnvironment, CatalogReducer>;

/// Errors surfaced by the application facade
#[derive(Error, Debug)]
pub enum AppError {
    /// The operation requires a signed-in user
    #[error("not signed in")]
    NotAuthenticated,

    /// The operation requires the organizer role
    #[error("only organizers can list events")]
    NotAnOrganizer,

    /// The booking was turned away
    #[error("booking rejected: {0}")]
    Booking(RejectReason),

    /// A session operation failed
    #[error("session failed: {0}")]
    Session(String),

    /// The store runtime failed (timeout, shutdown)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A store replied with an action the facade did not expect
    #[error("unexpected reply from store")]
    UnexpectedReply,
}

/// The marketplace application: two stores and their wiring
pub struct MarketplaceApp {
    /// Session store (auth)
    pub session: Arc<SessionStore>,
    /// Catalog store (events and bookings)
    pub catalog: Arc<CatalogStore>,
    booking_timeout: Duration,
}

impl MarketplaceApp {
    /// Build the production wiring from configuration
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let storage: Arc<dyn SlotStore> =
            Arc::new(JsonFileStore::new(config.storage.data_dir.clone()));

        Self::with_parts(
            storage,
            MockAuthGateway::shared(config.gateways.auth_latency()),
            MockPaymentGateway::shared(config.gateways.payment_latency()),
            Arc::new(SystemClock),
            config.booking_timeout(),
        )
    }

    /// Build the app from explicit collaborators
    ///
    /// This is the dependency-injection seam tests use to substitute an
    /// in-memory slot store and zero-latency gateways.
    #[must_use]
    pub fn with_parts(
        storage: Arc<dyn SlotStore>,
        auth: Arc<dyn AuthGateway>,
        payments: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
        booking_timeout: Duration,
    ) -> Self {
        let session = Arc::new(Store::new(
            SessionState::new(),
            SessionReducer::new(),
            SessionEnvironment::new(auth, Arc::clone(&storage)),
        ));

        let catalog = Arc::new(Store::new(
            CatalogState::new(),
            CatalogReducer::new(),
            CatalogEnvironment::new(clock, payments, storage),
        ));

        Self {
            session,
            catalog,
            booking_timeout,
        }
    }

    /// Restore both stores from durable storage
    ///
    /// Must complete before authenticated views render; afterwards
    /// [`MarketplaceApp::is_restoring`] is false.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] when a restore does not complete in
    /// time.
    pub async fn start(&self) -> Result<(), AppError> {
        self.session
            .send_and_wait_for(
                SessionAction::Initialize,
                |a| matches!(a, SessionAction::SessionRestored { .. }),
                START_TIMEOUT,
            )
            .await?;

        self.catalog
            .send_and_wait_for(
                CatalogAction::Initialize,
                |a| matches!(a, CatalogAction::LedgerRestored { .. }),
                START_TIMEOUT,
            )
            .await?;

        Ok(())
    }

    /// Whether the persisted session is still being read
    pub async fn is_restoring(&self) -> bool {
        self.session.state(|s| s.restoring).await
    }

    /// The current session user, if any
    pub async fn current_user(&self) -> Option<User> {
        self.session.state(|s| s.user.clone()).await
    }

    /// Sign an existing user in
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Session`] when the gateway or session storage
    /// fails, [`AppError::Store`] on timeout.
    pub async fn log_in(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Result<User, AppError> {
        let reply = self
            .session
            .send_and_wait_for(
                SessionAction::LogIn {
                    email: email.into(),
                    password: password.into(),
                    role,
                },
                |a| {
                    matches!(
                        a,
                        SessionAction::SignedIn { .. } | SessionAction::SessionFaulted { .. }
                    )
                },
                self.booking_timeout,
            )
            .await?;

        match reply {
            SessionAction::SignedIn { user } => Ok(user),
            SessionAction::SessionFaulted { error } => Err(AppError::Session(error)),
            _ => Err(AppError::UnexpectedReply),
        }
    }

    /// Register and sign in a new user
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Session`] when the gateway or session storage
    /// fails, [`AppError::Store`] on timeout.
    pub async fn sign_up(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
        role: Role,
        phone: Option<String>,
    ) -> Result<User, AppError> {
        let reply = self
            .session
            .send_and_wait_for(
                SessionAction::SignUp {
                    email: email.into(),
                    password: password.into(),
                    name: name.into(),
                    role,
                    phone,
                },
                |a| {
                    matches!(
                        a,
                        SessionAction::SignedIn { .. } | SessionAction::SessionFaulted { .. }
                    )
                },
                self.booking_timeout,
            )
            .await?;

        match reply {
            SessionAction::SignedIn { user } => Ok(user),
            SessionAction::SessionFaulted { error } => Err(AppError::Session(error)),
            _ => Err(AppError::UnexpectedReply),
        }
    }

    /// End the current session and clear the persisted slot
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] when the store is shutting down or the
    /// logout effects do not finish in time.
    pub async fn log_out(&self) -> Result<(), AppError> {
        let mut handle = self.session.send(SessionAction::LogOut).await?;
        handle.wait_with_timeout(self.booking_timeout).await?;
        Ok(())
    }

    /// The full catalog, in listing order
    pub async fn events(&self) -> Vec<Event> {
        self.catalog.state(|s| s.events.clone()).await
    }

    /// The catalog filtered for discovery
    pub async fn discover(&self, filter: &EventFilter) -> Vec<Event> {
        self.catalog
            .state(|s| filter.apply(&s.events).into_iter().cloned().collect())
            .await
    }

    /// List a new event as the signed-in organizer
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotAuthenticated`] without a session,
    /// [`AppError::NotAnOrganizer`] for attendees, and
    /// [`AppError::Store`] on timeout.
    pub async fn create_event(&self, draft: EventDraft) -> Result<Event, AppError> {
        let user = self
            .current_user()
            .await
            .ok_or(AppError::NotAuthenticated)?;
        if !user.role.is_organizer() {
            return Err(AppError::NotAnOrganizer);
        }

        let organizer_id = user.id;
        let reply = self
            .catalog
            .send_and_wait_for(
                CatalogAction::SubmitEvent {
                    draft,
                    organizer_id,
                    organizer_name: user.name,
                },
                move |a| {
                    matches!(
                        a,
                        CatalogAction::EventCreated { event } if event.organizer_id == organizer_id
                    )
                },
                self.booking_timeout,
            )
            .await?;

        match reply {
            CatalogAction::EventCreated { event } => Ok(event),
            _ => Err(AppError::UnexpectedReply),
        }
    }

    /// Book seats on an event as the signed-in user
    ///
    /// Waits for the booking to settle (the payment round-trip plus the
    /// capacity check) and returns the confirmed booking.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotAuthenticated`] without a session,
    /// [`AppError::Booking`] when the attempt is turned away, and
    /// [`AppError::Store`] on timeout.
    pub async fn book_event(
        &self,
        event_id: EventId,
        quantity: u32,
        payment_method: PaymentMethod,
    ) -> Result<Booking, AppError> {
        let user = self
            .current_user()
            .await
            .ok_or(AppError::NotAuthenticated)?;
        let user_id = user.id;

        let reply = self
            .catalog
            .send_and_wait_for(
                CatalogAction::SubmitBooking {
                    event_id,
                    user_id,
                    quantity,
                    payment_method,
                },
                move |a| match a {
                    CatalogAction::BookingConfirmed { booking } => {
                        booking.event_id == event_id && booking.user_id == user_id
                    }
                    CatalogAction::BookingRejected { event_id: e, .. } => *e == event_id,
                    _ => false,
                },
                self.booking_timeout,
            )
            .await?;

        match reply {
            CatalogAction::BookingConfirmed { booking } => Ok(booking),
            CatalogAction::BookingRejected { reason, .. } => Err(AppError::Booking(reason)),
            _ => Err(AppError::UnexpectedReply),
        }
    }

    /// The signed-in user's bookings, in ledger order
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotAuthenticated`] without a session.
    pub async fn my_bookings(&self) -> Result<Vec<Booking>, AppError> {
        let user = self
            .current_user()
            .await
            .ok_or(AppError::NotAuthenticated)?;
        Ok(self.catalog.state(move |s| s.user_bookings(&user.id)).await)
    }

    /// The signed-in organizer's listings, in catalog order
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotAuthenticated`] without a session.
    pub async fn my_events(&self) -> Result<Vec<Event>, AppError> {
        let user = self
            .current_user()
            .await
            .ok_or(AppError::NotAuthenticated)?;
        Ok(self
            .catalog
            .state(move |s| s.organizer_events(&user.id))
            .await)
    }

    /// Dashboard metrics for the signed-in organizer
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotAuthenticated`] without a session.
    pub async fn organizer_summary(&self) -> Result<OrganizerSummary, AppError> {
        let user = self
            .current_user()
            .await
            .ok_or(AppError::NotAuthenticated)?;
        Ok(self
            .catalog
            .state(move |s| OrganizerSummary::for_organizer(&s.events, &user.id))
            .await)
    }

    /// Dashboard metrics for the signed-in attendee
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotAuthenticated`] without a session.
    pub async fn attendee_summary(&self) -> Result<AttendeeSummary, AppError> {
        let user = self
            .current_user()
            .await
            .ok_or(AppError::NotAuthenticated)?;
        Ok(self
            .catalog
            .state(move |s| AttendeeSummary::for_attendee(&s.bookings, &user.id))
            .await)
    }

    /// Drain pending effects and stop accepting actions
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] when effects are still running after
    /// `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), AppError> {
        self.session.shutdown(timeout).await?;
        self.catalog.shutdown(timeout).await?;
        Ok(())
    }
}
