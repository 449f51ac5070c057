//! Dashboard read models.
//!
//! Pure functions over catalog snapshots. Nothing here owns state: the
//! dashboards recompute from whatever the catalog store currently holds,
//! the same way the discovery screen filters client-side.

use crate::types::{Booking, Category, Event, Money, UserId};

/// Aggregate metrics for one organizer's listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizerSummary {
    /// Number of events the organizer has listed
    pub total_events: usize,
    /// Seats booked across those events
    pub total_bookings: u32,
    /// Revenue across those events (`booked × price`, summed)
    pub total_revenue: Money,
    /// Mean seats booked per event (whole seats, rounded down)
    pub mean_bookings_per_event: u32,
}

impl OrganizerSummary {
    /// Computes the summary for `organizer` over a catalog snapshot
    #[must_use]
    pub fn for_organizer(events: &[Event], organizer: &UserId) -> Self {
        let mut total_events = 0usize;
        let mut total_bookings = 0u32;
        let mut total_revenue = Money::ZERO;

        for event in events.iter().filter(|e| e.organizer_id == *organizer) {
            total_events += 1;
            total_bookings = total_bookings.saturating_add(event.booked);
            let earned = event
                .price
                .checked_multiply(event.booked)
                .unwrap_or(Money::ZERO);
            total_revenue = total_revenue.saturating_add(earned);
        }

        let mean_bookings_per_event = if total_events == 0 {
            0
        } else {
            let events = u32::try_from(total_events).unwrap_or(u32::MAX);
            total_bookings / events
        };

        Self {
            total_events,
            total_bookings,
            total_revenue,
            mean_bookings_per_event,
        }
    }
}

/// Aggregate metrics for one attendee's booking history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendeeSummary {
    /// Number of bookings made
    pub bookings_count: usize,
    /// Seats booked across all bookings
    pub tickets: u32,
    /// Total amount spent
    pub total_spent: Money,
}

impl AttendeeSummary {
    /// Computes the summary for `attendee` over a ledger snapshot
    #[must_use]
    pub fn for_attendee(bookings: &[Booking], attendee: &UserId) -> Self {
        let mut bookings_count = 0usize;
        let mut tickets = 0u32;
        let mut total_spent = Money::ZERO;

        for booking in bookings.iter().filter(|b| b.user_id == *attendee) {
            bookings_count += 1;
            tickets = tickets.saturating_add(booking.quantity);
            total_spent = total_spent.saturating_add(booking.total_amount);
        }

        Self {
            bookings_count,
            tickets,
            total_spent,
        }
    }
}

/// Client-side discovery filter
///
/// The search term matches the title or the location, case-insensitively;
/// the category must match exactly when set. Both default to "everything".
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Free-text search over title and location
    pub search: Option<String>,
    /// Restrict to one category
    pub category: Option<Category>,
}

impl EventFilter {
    /// Filter matching every event
    #[must_use]
    pub const fn any() -> Self {
        Self {
            search: None,
            category: None,
        }
    }

    /// Restrict to events whose title or location contains `term`
    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Restrict to one category
    #[must_use]
    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Whether `event` passes this filter
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        let matches_search = self.search.as_ref().is_none_or(|term| {
            let term = term.to_lowercase();
            event.title.to_lowercase().contains(&term)
                || event.location.to_lowercase().contains(&term)
        });

        let matches_category = self
            .category
            .is_none_or(|category| event.category == category);

        matches_search && matches_category
    }

    /// Applies the filter to a snapshot, preserving order
    #[must_use]
    pub fn apply<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
        events.iter().filter(|event| self.matches(event)).collect()
    }
}

/// The featured subset of a catalog snapshot, in catalog order
#[must_use]
pub fn featured(events: &[Event]) -> Vec<&Event> {
    events.iter().filter(|event| event.featured).collect()
}
