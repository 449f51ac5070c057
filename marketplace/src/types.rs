//! Domain types for the Tembea marketplace.
//!
//! This module contains the value objects, entities, and store states for
//! the event discovery and booking core: users and their roles, the event
//! catalog, and the booking ledger.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a user (organizer or attendee)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random `UserId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `UserId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a listed event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random `EventId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `EventId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(Uuid);

impl BookingId {
    /// Creates a new random `BookingId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `BookingId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Money Value Object (whole shillings; UGX carries no subunit in practice)
// ============================================================================

/// Represents money as a whole number of Ugandan shillings
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Money value of zero
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from whole shillings
    #[must_use]
    pub const fn from_shillings(amount: u64) -> Self {
        Self(amount)
    }

    /// Returns the amount in whole shillings
    #[must_use]
    pub const fn shillings(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Adds two money amounts, clamping at the maximum representable value
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Multiplies money by a quantity with overflow checking
    #[must_use]
    pub const fn checked_multiply(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "USh {}", self.0)
    }
}

// ============================================================================
// Capacity
// ============================================================================

/// Represents the seat capacity of an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Capacity(pub u32);

impl Capacity {
    /// Creates a new `Capacity`
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the capacity value
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Closed enumerations
// ============================================================================

/// Marketplace role of a user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Lists events and views aggregate booking analytics for them
    Organizer,
    /// Discovers and books events
    Attendee,
}

impl Role {
    /// Whether this role may create events
    #[must_use]
    pub const fn is_organizer(self) -> bool {
        matches!(self, Self::Organizer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Organizer => write!(f, "organizer"),
            Self::Attendee => write!(f, "attendee"),
        }
    }
}

/// Event category used for discovery filtering
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// Wildlife safaris and game drives
    Safari,
    /// Hikes, climbs, and expeditions
    Adventure,
    /// Festivals, music, and heritage events
    Cultural,
    /// Market visits and tasting tours
    Food,
    /// Concerts and live performances
    Music,
    /// Sporting events
    Sports,
    /// Everything else
    Other,
}

impl Category {
    /// All categories, in the order discovery screens list them
    #[must_use]
    pub const fn all() -> [Self; 7] {
        [
            Self::Safari,
            Self::Adventure,
            Self::Cultural,
            Self::Food,
            Self::Music,
            Self::Sports,
            Self::Other,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Safari => "Safari",
            Self::Adventure => "Adventure",
            Self::Cultural => "Cultural",
            Self::Food => "Food",
            Self::Music => "Music",
            Self::Sports => "Sports",
            Self::Other => "Other",
        };
        write!(f, "{name}")
    }
}

/// Payment method accepted at booking time
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Mobile money
    Mpesa,
    /// Credit or debit card
    Card,
    /// `PayPal`
    Paypal,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mpesa => write!(f, "mpesa"),
            Self::Card => write!(f, "card"),
            Self::Paypal => write!(f, "paypal"),
        }
    }
}

/// Booking lifecycle status
///
/// Only `Confirmed` is produced today: bookings are confirmed atomically
/// with the capacity check. `Pending` and `Cancelled` are part of the
/// ledger format for flows that would introduce deferred settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Created but not yet settled
    Pending,
    /// Settled and counted against event capacity
    Confirmed,
    /// Cancelled after creation
    Cancelled,
}

/// Why a booking attempt was turned away
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The referenced event does not exist in the catalog
    EventNotFound,
    /// The requested quantity was zero or not representable
    InvalidQuantity {
        /// Quantity that was requested
        requested: u32,
    },
    /// Not enough seats remain
    SoldOut {
        /// Quantity that was requested
        requested: u32,
        /// Seats actually available at decision time
        available: u32,
    },
    /// The payment gateway declined the charge
    PaymentDeclined {
        /// Gateway-reported reason
        reason: String,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EventNotFound => write!(f, "event not found"),
            Self::InvalidQuantity { requested } => {
                write!(f, "invalid quantity: {requested}")
            }
            Self::SoldOut {
                requested,
                available,
            } => write!(
                f,
                "not enough seats: requested {requested}, available {available}"
            ),
            Self::PaymentDeclined { reason } => write!(f, "payment declined: {reason}"),
        }
    }
}

// ============================================================================
// Domain Entities
// ============================================================================

/// A marketplace user
///
/// Fabricated by the (mocked) auth gateway on login or signup and kept as
/// the single current-session record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: UserId,
    /// Email address used to sign in
    pub email: String,
    /// Display name
    pub name: String,
    /// Marketplace role
    pub role: Role,
    /// Optional phone number
    pub phone: Option<String>,
    /// Optional avatar URL
    pub avatar: Option<String>,
}

/// A listed event in the catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier
    pub id: EventId,
    /// Event title
    pub title: String,
    /// Longer description shown on the event card
    pub description: String,
    /// Venue or area
    pub location: String,
    /// Calendar date of the event
    pub date: NaiveDate,
    /// Local start time
    pub time: NaiveTime,
    /// Price per seat
    pub price: Money,
    /// Total seat capacity
    pub capacity: Capacity,
    /// Seats taken by confirmed bookings; never exceeds `capacity`
    pub booked: u32,
    /// Owning organizer
    pub organizer_id: UserId,
    /// Organizer display name, denormalized at listing time
    pub organizer_name: String,
    /// Cover image URL
    pub image: String,
    /// Discovery category
    pub category: Category,
    /// Whether the event is featured on the discovery screen
    pub featured: bool,
}

impl Event {
    /// Seats still available (`capacity - booked`)
    #[must_use]
    pub const fn available(&self) -> u32 {
        self.capacity.value().saturating_sub(self.booked)
    }

    /// Whether no seats remain
    #[must_use]
    pub const fn is_sold_out(&self) -> bool {
        self.available() == 0
    }

    /// Whether `quantity` seats can still be booked
    #[must_use]
    pub const fn has_availability(&self, quantity: u32) -> bool {
        self.available() >= quantity
    }
}

/// Organizer-supplied fields for a new event listing
///
/// The catalog assigns the id, zeroes the booked counter, and stamps the
/// organizer identity; everything else comes from the creation form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    /// Event title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Venue or area
    pub location: String,
    /// Calendar date
    pub date: NaiveDate,
    /// Local start time
    pub time: NaiveTime,
    /// Price per seat
    pub price: Money,
    /// Total seat capacity
    pub capacity: Capacity,
    /// Discovery category
    pub category: Category,
    /// Cover image URL; a sample image is picked when absent
    pub image: Option<String>,
    /// Whether to feature the event
    pub featured: bool,
}

/// One entry in the booking ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique booking identifier
    pub id: BookingId,
    /// Event that was booked
    pub event_id: EventId,
    /// Attendee who booked
    pub user_id: UserId,
    /// Number of seats
    pub quantity: u32,
    /// `price × quantity`, snapshotted when the booking was submitted
    pub total_amount: Money,
    /// Lifecycle status
    pub status: BookingStatus,
    /// When the booking was confirmed
    pub booked_at: DateTime<Utc>,
    /// How the booking was paid
    pub payment_method: PaymentMethod,
}

// ============================================================================
// Store States
// ============================================================================

/// State for the Session store
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionState {
    /// Current session user, if authenticated
    pub user: Option<User>,
    /// True until the persisted session has been read at startup;
    /// callers should not render authenticated views while this is set
    pub restoring: bool,
    /// Last session fault, for surfacing in UIs and tests
    pub last_error: Option<String>,
}

impl SessionState {
    /// Creates the pre-restore state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            user: None,
            restoring: true,
            last_error: None,
        }
    }

    /// Whether a user is signed in
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// State for the Catalog store: the event catalog and the booking ledger
///
/// Both collections preserve insertion order; queries return subsets in
/// that order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogState {
    /// All listed events, oldest first
    pub events: Vec<Event>,
    /// All bookings, oldest first (the ledger)
    pub bookings: Vec<Booking>,
    /// Last catalog fault, for surfacing in UIs and tests
    pub last_error: Option<String>,
}

impl CatalogState {
    /// Creates an empty catalog
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events: Vec::new(),
            bookings: Vec::new(),
            last_error: None,
        }
    }

    /// Looks up an event by id
    #[must_use]
    pub fn find_event(&self, id: &EventId) -> Option<&Event> {
        self.events.iter().find(|event| event.id == *id)
    }

    pub(crate) fn find_event_mut(&mut self, id: &EventId) -> Option<&mut Event> {
        self.events.iter_mut().find(|event| event.id == *id)
    }

    /// All bookings made by `user`, in insertion order
    #[must_use]
    pub fn user_bookings(&self, user: &UserId) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|booking| booking.user_id == *user)
            .cloned()
            .collect()
    }

    /// All events listed by `organizer`, in insertion order
    #[must_use]
    pub fn organizer_events(&self, organizer: &UserId) -> Vec<Event> {
        self.events
            .iter()
            .filter(|event| event.organizer_id == *organizer)
            .cloned()
            .collect()
    }
}

impl Default for CatalogState {
    fn default() -> Self {
        Self::new()
    }
}
