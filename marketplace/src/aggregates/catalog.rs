//! Catalog aggregate for the Tembea marketplace.
//!
//! Owns the event catalog and the booking ledger. Listing an event is
//! synchronous; booking one is the single transactional operation in the
//! system: charge through the payment gateway, then a check-and-increment
//! against capacity.
//!
//! **Concurrency strategy**: availability is re-checked in the same reducer
//! execution that appends the booking and bumps the counter. Reducer
//! executions are serialized by the store, so two bookings racing for the
//! last seats cannot both win, even though the payment round-trip suspends
//! in between.

use crate::gateway::PaymentGateway;
use crate::seed;
use crate::storage::{self, BOOKINGS_SLOT};
use crate::types::{
    Booking, BookingId, BookingStatus, CatalogState, Event, EventDraft, EventId, Money,
    PaymentMethod, RejectReason, UserId,
};
use rand::seq::SliceRandom;
use std::sync::Arc;
use tembea_core::environment::Clock;
use tembea_core::storage::SlotStore;
use tembea_core::{Effect, Reducer, SmallVec, async_effect, read_slot, smallvec, write_slot};
use tembea_macros::Action;

// ============================================================================
// Actions (Commands + Events)
// ============================================================================

/// Actions for the Catalog aggregate
#[derive(Action, Clone, Debug)]
pub enum CatalogAction {
    // Commands
    /// Seed the catalog and load the persisted ledger at startup
    #[command]
    Initialize,

    /// List a new event
    #[command]
    SubmitEvent {
        /// Organizer-supplied fields
        draft: EventDraft,
        /// Owning organizer
        organizer_id: UserId,
        /// Organizer display name, denormalized onto the listing
        organizer_name: String,
    },

    /// Book seats on an event
    #[command]
    SubmitBooking {
        /// Event to book
        event_id: EventId,
        /// Attendee booking the seats
        user_id: UserId,
        /// Number of seats
        quantity: u32,
        /// Payment method to charge
        payment_method: PaymentMethod,
    },

    // Events
    /// The persisted ledger was read
    #[event]
    LedgerRestored {
        /// Restored bookings (empty when the slot was absent or malformed)
        bookings: Vec<Booking>,
    },

    /// An event was added to the catalog
    #[event]
    EventCreated {
        /// The new listing, with id assigned and `booked` zeroed
        event: Event,
    },

    /// The gateway charged a booking payment
    #[event]
    PaymentSettled {
        /// Event being booked
        event_id: EventId,
        /// Attendee booking the seats
        user_id: UserId,
        /// Number of seats
        quantity: u32,
        /// Method that was charged
        payment_method: PaymentMethod,
        /// Amount charged (`price × quantity` at submission time)
        amount: Money,
        /// Gateway transaction id
        transaction_id: String,
    },

    /// The gateway declined a booking payment
    #[event]
    PaymentDeclined {
        /// Event that was being booked
        event_id: EventId,
        /// Attendee whose charge failed
        user_id: UserId,
        /// Gateway-reported reason
        reason: String,
    },

    /// A booking was admitted to the ledger
    #[event]
    BookingConfirmed {
        /// The confirmed booking
        booking: Booking,
    },

    /// A booking attempt was turned away
    #[event]
    BookingRejected {
        /// Event that was being booked
        event_id: EventId,
        /// Why the attempt was rejected
        reason: RejectReason,
    },

    /// A catalog-side operation failed (storage, serialization)
    #[event]
    CatalogFaulted {
        /// Failure description
        error: String,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the Catalog aggregate
#[derive(Clone)]
pub struct CatalogEnvironment {
    /// Clock for booking timestamps
    pub clock: Arc<dyn Clock>,
    /// Payment processor boundary
    pub gateway: Arc<dyn PaymentGateway>,
    /// Durable slot storage
    pub storage: Arc<dyn SlotStore>,
}

impl CatalogEnvironment {
    /// Creates a new `CatalogEnvironment`
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        gateway: Arc<dyn PaymentGateway>,
        storage: Arc<dyn SlotStore>,
    ) -> Self {
        Self {
            clock,
            gateway,
            storage,
        }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the Catalog aggregate
///
/// The availability check deliberately lives in the
/// [`CatalogAction::PaymentSettled`] handling, after the payment
/// round-trip, in the same execution that mutates the counters. Checking
/// only before the charge would leave a window in which concurrent
/// bookings oversell the event.
#[derive(Clone, Debug, Default)]
pub struct CatalogReducer;

impl CatalogReducer {
    /// Creates a new `CatalogReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the immediate-rejection effect for a failed booking attempt
    fn reject(event_id: EventId, reason: RejectReason) -> SmallVec<[Effect<CatalogAction>; 4]> {
        smallvec![async_effect! {
            Some(CatalogAction::BookingRejected { event_id, reason })
        }]
    }

    /// Validates a booking attempt against the current snapshot
    ///
    /// Returns the charge amount on success. The same check runs again
    /// after the payment settles; this pass exists to fail fast before
    /// money moves.
    fn validate_booking(
        state: &CatalogState,
        event_id: &EventId,
        quantity: u32,
    ) -> Result<Money, RejectReason> {
        let Some(event) = state.find_event(event_id) else {
            return Err(RejectReason::EventNotFound);
        };

        if quantity == 0 {
            return Err(RejectReason::InvalidQuantity {
                requested: quantity,
            });
        }

        if !event.has_availability(quantity) {
            return Err(RejectReason::SoldOut {
                requested: quantity,
                available: event.available(),
            });
        }

        event
            .price
            .checked_multiply(quantity)
            .ok_or(RejectReason::InvalidQuantity {
                requested: quantity,
            })
    }

    /// Replays restored bookings onto the seeded catalog
    ///
    /// The catalog itself is not persisted, so availability after a restart
    /// is seed baseline plus everything the ledger confirmed. Bookings for
    /// events no longer in the catalog (listings are in-memory only) stay
    /// in the ledger but adjust nothing.
    fn replay_ledger(state: &mut CatalogState) {
        let mut replayed: Vec<(EventId, u32)> = Vec::new();
        for booking in &state.bookings {
            if booking.status == BookingStatus::Confirmed {
                replayed.push((booking.event_id, booking.quantity));
            }
        }

        for (event_id, quantity) in replayed {
            if let Some(event) = state.find_event_mut(&event_id) {
                let capacity = event.capacity.value();
                let next = event.booked.saturating_add(quantity);
                if next > capacity {
                    tracing::warn!(
                        %event_id,
                        booked = next,
                        capacity,
                        "restored ledger exceeds capacity, clamping"
                    );
                }
                event.booked = next.min(capacity);
            }
        }
    }

    /// Applies an event to state
    ///
    /// Events may arrive twice: once applied inline and once fed back for
    /// observers. Application is idempotent by record id.
    fn apply_event(state: &mut CatalogState, action: &CatalogAction) {
        match action {
            CatalogAction::LedgerRestored { bookings } => {
                state.bookings = bookings.clone();
                Self::replay_ledger(state);
                state.last_error = None;
            }

            CatalogAction::EventCreated { event } => {
                if state.events.iter().all(|existing| existing.id != event.id) {
                    state.events.push(event.clone());
                }
                state.last_error = None;
            }

            CatalogAction::BookingConfirmed { booking } => {
                if state.bookings.iter().any(|b| b.id == booking.id) {
                    return;
                }
                state.bookings.push(booking.clone());
                if let Some(event) = state.find_event_mut(&booking.event_id) {
                    event.booked = event.booked.saturating_add(booking.quantity);
                }
                state.last_error = None;
            }

            CatalogAction::BookingRejected { event_id, reason } => {
                tracing::info!(%event_id, %reason, "booking rejected");
                state.last_error = Some(reason.to_string());
            }

            CatalogAction::PaymentDeclined { reason, .. } => {
                state.last_error = Some(reason.clone());
            }

            CatalogAction::CatalogFaulted { error } => {
                state.last_error = Some(error.clone());
            }

            // Commands and the settlement event are handled in reduce
            CatalogAction::Initialize
            | CatalogAction::SubmitEvent { .. }
            | CatalogAction::SubmitBooking { .. }
            | CatalogAction::PaymentSettled { .. } => {}
        }
    }

    /// Serializes the ledger and builds the persistence effect
    fn persist_ledger(
        state: &mut CatalogState,
        env: &CatalogEnvironment,
    ) -> Option<Effect<CatalogAction>> {
        match storage::encode(BOOKINGS_SLOT, &state.bookings) {
            Ok(payload) => Some(write_slot! {
                storage: env.storage,
                slot: BOOKINGS_SLOT,
                payload: payload,
                on_success: || None,
                on_error: |error| Some(CatalogAction::CatalogFaulted {
                    error: error.to_string(),
                })
            }),
            Err(error) => {
                Self::apply_event(
                    state,
                    &CatalogAction::CatalogFaulted {
                        error: error.to_string(),
                    },
                );
                None
            }
        }
    }
}

impl Reducer for CatalogReducer {
    type State = CatalogState;
    type Action = CatalogAction;
    type Environment = CatalogEnvironment;

    #[allow(clippy::too_many_lines)] // The booking workflow reads best in one place
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            CatalogAction::Initialize => {
                if state.events.is_empty() {
                    state.events = seed::sample_events();
                }

                smallvec![read_slot! {
                    storage: env.storage,
                    slot: BOOKINGS_SLOT,
                    on_success: |bytes| Some(CatalogAction::LedgerRestored {
                        bookings: storage::decode_or_absent(BOOKINGS_SLOT, bytes)
                            .unwrap_or_default(),
                    }),
                    on_error: |error| {
                        // An unreadable ledger restores empty rather than
                        // wedging startup.
                        tracing::warn!(%error, "ledger restore failed");
                        Some(CatalogAction::LedgerRestored { bookings: Vec::new() })
                    }
                }]
            }

            CatalogAction::SubmitEvent {
                draft,
                organizer_id,
                organizer_name,
            } => {
                let image = draft.image.clone().unwrap_or_else(|| {
                    // Listings without a cover get one of the samples,
                    // like the creation form offers
                    seed::SAMPLE_IMAGES
                        .choose(&mut rand::thread_rng())
                        .copied()
                        .unwrap_or(seed::SAMPLE_IMAGES[0])
                        .to_string()
                });

                let event = Event {
                    id: EventId::new(),
                    title: draft.title,
                    description: draft.description,
                    location: draft.location,
                    date: draft.date,
                    time: draft.time,
                    price: draft.price,
                    capacity: draft.capacity,
                    booked: 0,
                    organizer_id,
                    organizer_name,
                    image,
                    category: draft.category,
                    featured: draft.featured,
                };

                let created = CatalogAction::EventCreated {
                    event: event.clone(),
                };
                Self::apply_event(state, &created);

                smallvec![async_effect! {
                    Some(CatalogAction::EventCreated { event })
                }]
            }

            CatalogAction::SubmitBooking {
                event_id,
                user_id,
                quantity,
                payment_method,
            } => {
                // Fail fast on the current snapshot; money only moves when
                // the request has a chance of being admitted.
                let amount = match Self::validate_booking(state, &event_id, quantity) {
                    Ok(amount) => amount,
                    Err(reason) => return Self::reject(event_id, reason),
                };

                let gateway = Arc::clone(&env.gateway);
                smallvec![async_effect! {
                    match gateway.charge(amount, payment_method).await {
                        Ok(receipt) => Some(CatalogAction::PaymentSettled {
                            event_id,
                            user_id,
                            quantity,
                            payment_method,
                            amount: receipt.amount,
                            transaction_id: receipt.transaction_id,
                        }),
                        Err(error) => Some(CatalogAction::PaymentDeclined {
                            event_id,
                            user_id,
                            reason: error.to_string(),
                        }),
                    }
                }]
            }

            // ========== Events ==========
            CatalogAction::PaymentSettled {
                event_id,
                user_id,
                quantity,
                payment_method,
                amount,
                transaction_id,
            } => {
                tracing::debug!(%event_id, %transaction_id, quantity, "payment settled");

                // The authoritative check-and-increment. The snapshot the
                // charge was based on may be stale by now; this runs under
                // the store's write lock together with the mutation, so
                // capacity cannot be oversold.
                let Some(event) = state.find_event(&event_id) else {
                    return Self::reject(event_id, RejectReason::EventNotFound);
                };

                if !event.has_availability(quantity) {
                    return Self::reject(
                        event_id,
                        RejectReason::SoldOut {
                            requested: quantity,
                            available: event.available(),
                        },
                    );
                }

                let booking = Booking {
                    id: BookingId::new(),
                    event_id,
                    user_id,
                    quantity,
                    total_amount: amount,
                    status: BookingStatus::Confirmed,
                    booked_at: env.clock.now(),
                    payment_method,
                };

                let confirmed = CatalogAction::BookingConfirmed {
                    booking: booking.clone(),
                };
                Self::apply_event(state, &confirmed);

                let mut effects: SmallVec<[Effect<CatalogAction>; 4]> = SmallVec::new();
                if let Some(persist) = Self::persist_ledger(state, env) {
                    effects.push(persist);
                }
                effects.push(async_effect! {
                    Some(CatalogAction::BookingConfirmed { booking })
                });
                effects
            }

            CatalogAction::PaymentDeclined {
                event_id,
                user_id,
                reason,
            } => {
                tracing::warn!(%event_id, %user_id, %reason, "payment declined");
                Self::apply_event(
                    state,
                    &CatalogAction::PaymentDeclined {
                        event_id,
                        user_id,
                        reason: reason.clone(),
                    },
                );
                Self::reject(event_id, RejectReason::PaymentDeclined { reason })
            }

            event => {
                Self::apply_event(state, &event);
                SmallVec::new()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gateway::MockPaymentGateway;
    use proptest::prelude::*;
    use tembea_testing::{InMemorySlotStore, ReducerTest, assertions, test_clock};

    fn create_test_env() -> CatalogEnvironment {
        CatalogEnvironment::new(
            Arc::new(test_clock()),
            Arc::new(MockPaymentGateway::instant()),
            Arc::new(InMemorySlotStore::new()),
        )
    }

    /// Catalog with the sample events already seeded (ledger untouched)
    fn seeded_state() -> CatalogState {
        let mut state = CatalogState::new();
        state.events = seed::sample_events();
        state
    }

    /// The safari event: capacity 20, booked 8, price 12 500
    fn safari_id() -> EventId {
        seed::sample_events()[0].id
    }

    fn settled(event_id: EventId, user_id: UserId, quantity: u32, amount: Money) -> CatalogAction {
        CatalogAction::PaymentSettled {
            event_id,
            user_id,
            quantity,
            payment_method: PaymentMethod::Card,
            amount,
            transaction_id: "txn_test".to_string(),
        }
    }

    #[test]
    fn initialize_seeds_catalog_and_reads_ledger() {
        ReducerTest::new(CatalogReducer::new())
            .with_env(create_test_env())
            .given_state(CatalogState::new())
            .when_action(CatalogAction::Initialize)
            .then_state(|state| {
                assert_eq!(state.events.len(), 4);
                assert!(state.bookings.is_empty());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_reads_slot(effects, BOOKINGS_SLOT);
            })
            .run();
    }

    #[test]
    fn submit_event_assigns_fresh_id_and_zero_booked() {
        let organizer = UserId::new();

        ReducerTest::new(CatalogReducer::new())
            .with_env(create_test_env())
            .given_state(seeded_state())
            .when_action(CatalogAction::SubmitEvent {
                draft: EventDraft {
                    title: "Ssese Islands Retreat".to_string(),
                    description: "A weekend on the lake".to_string(),
                    location: "Ssese Islands".to_string(),
                    date: chrono::NaiveDate::from_ymd_opt(2026, 10, 3).unwrap(),
                    time: chrono::NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                    price: Money::from_shillings(50_000),
                    capacity: crate::types::Capacity::new(20),
                    category: crate::types::Category::Adventure,
                    image: None,
                    featured: false,
                },
                organizer_id: organizer,
                organizer_name: "Lake Tours".to_string(),
            })
            .then_state(move |state| {
                assert_eq!(state.events.len(), 5);
                let event = &state.events[4];
                assert_eq!(event.booked, 0);
                assert_eq!(event.available(), 20);
                assert_eq!(event.organizer_id, organizer);
                assert!(!event.image.is_empty());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn booking_over_availability_fails_fast_without_charging() {
        // capacity 20, booked 8 -> 12 available; 13 must be turned away
        ReducerTest::new(CatalogReducer::new())
            .with_env(create_test_env())
            .given_state(seeded_state())
            .when_action(CatalogAction::SubmitBooking {
                event_id: safari_id(),
                user_id: UserId::new(),
                quantity: 13,
                payment_method: PaymentMethod::Card,
            })
            .then_state(|state| {
                let event = state.find_event(&safari_id()).unwrap();
                assert_eq!(event.booked, 8);
                assert!(state.bookings.is_empty());
            })
            .then_effects(|effects| {
                // Only the rejection notification, no gateway charge
                assertions::assert_effects_count(effects, 1);
            })
            .run();
    }

    #[test]
    fn booking_for_unknown_event_is_rejected() {
        ReducerTest::new(CatalogReducer::new())
            .with_env(create_test_env())
            .given_state(seeded_state())
            .when_action(CatalogAction::SubmitBooking {
                event_id: EventId::new(),
                user_id: UserId::new(),
                quantity: 1,
                payment_method: PaymentMethod::Mpesa,
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
            })
            .run();
    }

    #[test]
    fn zero_quantity_is_rejected() {
        ReducerTest::new(CatalogReducer::new())
            .with_env(create_test_env())
            .given_state(seeded_state())
            .when_action(CatalogAction::SubmitBooking {
                event_id: safari_id(),
                user_id: UserId::new(),
                quantity: 0,
                payment_method: PaymentMethod::Card,
            })
            .then_state(|state| {
                assert!(state.bookings.is_empty());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
            })
            .run();
    }

    #[test]
    fn settled_payment_confirms_booking_and_fills_event() {
        // quantity 12 on 12 available books the event out exactly
        let user = UserId::new();
        let amount = Money::from_shillings(12_500).checked_multiply(12).unwrap();

        ReducerTest::new(CatalogReducer::new())
            .with_env(create_test_env())
            .given_state(seeded_state())
            .when_action(settled(safari_id(), user, 12, amount))
            .then_state(move |state| {
                let event = state.find_event(&safari_id()).unwrap();
                assert_eq!(event.booked, 20);
                assert!(event.is_sold_out());

                let bookings = state.user_bookings(&user);
                assert_eq!(bookings.len(), 1);
                assert_eq!(bookings[0].quantity, 12);
                assert_eq!(bookings[0].total_amount, amount);
                assert_eq!(bookings[0].status, BookingStatus::Confirmed);
            })
            .then_effects(|effects| {
                // Ledger write plus the confirmation notification
                assertions::assert_effects_count(effects, 2);
                assertions::assert_writes_slot(effects, BOOKINGS_SLOT);
            })
            .run();
    }

    #[test]
    fn settlement_recheck_blocks_overselling() {
        // Seats were consumed while this payment was in flight
        let mut state = seeded_state();
        if let Some(event) = state.find_event_mut(&safari_id()) {
            event.booked = 19; // one seat left
        }

        ReducerTest::new(CatalogReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(settled(
                safari_id(),
                UserId::new(),
                2,
                Money::from_shillings(25_000),
            ))
            .then_state(|state| {
                let event = state.find_event(&safari_id()).unwrap();
                assert_eq!(event.booked, 19);
                assert!(state.bookings.is_empty());
            })
            .then_effects(|effects| {
                // Only the rejection notification; nothing persisted
                assertions::assert_effects_count(effects, 1);
            })
            .run();
    }

    #[test]
    fn confirmed_feedback_is_idempotent() {
        let user = UserId::new();
        let env = create_test_env();
        let reducer = CatalogReducer::new();
        let mut state = seeded_state();

        reducer.reduce(
            &mut state,
            settled(safari_id(), user, 2, Money::from_shillings(25_000)),
            &env,
        );
        let booking = state.user_bookings(&user)[0].clone();
        assert_eq!(state.find_event(&safari_id()).unwrap().booked, 10);

        // The notification feeds the same event back; nothing changes
        reducer.reduce(
            &mut state,
            CatalogAction::BookingConfirmed { booking },
            &env,
        );
        assert_eq!(state.find_event(&safari_id()).unwrap().booked, 10);
        assert_eq!(state.user_bookings(&user).len(), 1);
    }

    #[test]
    fn declined_payment_surfaces_reason() {
        ReducerTest::new(CatalogReducer::new())
            .with_env(create_test_env())
            .given_state(seeded_state())
            .when_action(CatalogAction::PaymentDeclined {
                event_id: safari_id(),
                user_id: UserId::new(),
                reason: "card expired".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.last_error.as_deref(), Some("card expired"));
                assert!(state.bookings.is_empty());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
            })
            .run();
    }

    #[test]
    fn ledger_restore_replays_confirmed_quantities() {
        let user = UserId::new();
        let booking = Booking {
            id: BookingId::new(),
            event_id: safari_id(),
            user_id: user,
            quantity: 3,
            total_amount: Money::from_shillings(37_500),
            status: BookingStatus::Confirmed,
            booked_at: test_clock().now(),
            payment_method: PaymentMethod::Mpesa,
        };

        ReducerTest::new(CatalogReducer::new())
            .with_env(create_test_env())
            .given_state(seeded_state())
            .when_action(CatalogAction::LedgerRestored {
                bookings: vec![booking],
            })
            .then_state(move |state| {
                let event = state.find_event(&safari_id()).unwrap();
                assert_eq!(event.booked, 11); // 8 seeded + 3 restored
                assert_eq!(state.user_bookings(&user).len(), 1);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    proptest! {
        /// Whatever sequence of settlements arrives, `booked` never leaves
        /// `0..=capacity`, and every confirmed quantity is reflected in it.
        #[test]
        fn booked_never_exceeds_capacity(quantities in proptest::collection::vec(1u32..=25, 1..12)) {
            let env = create_test_env();
            let reducer = CatalogReducer::new();
            let mut state = seeded_state();
            let event_id = safari_id();
            let before = state.find_event(&event_id).unwrap().booked;

            for quantity in quantities {
                let amount = Money::from_shillings(12_500)
                    .checked_multiply(quantity)
                    .unwrap();
                reducer.reduce(
                    &mut state,
                    settled(event_id, UserId::new(), quantity, amount),
                    &env,
                );

                let event = state.find_event(&event_id).unwrap();
                prop_assert!(event.booked <= event.capacity.value());
            }

            let event = state.find_event(&event_id).unwrap();
            let confirmed: u32 = state
                .bookings
                .iter()
                .map(|booking| booking.quantity)
                .sum();
            prop_assert_eq!(event.booked, before + confirmed);
        }
    }
}
