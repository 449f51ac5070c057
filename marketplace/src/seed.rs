//! Built-in sample catalog.
//!
//! The catalog is seeded from this fixed list at startup. Ids are pinned so
//! that ledger entries persisted in a previous run still resolve to the
//! same events after a restart.

use crate::types::{Capacity, Category, Event, EventId, Money, UserId};
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

/// Organizer behind the safari and climbing listings
pub const SAFARI_ADVENTURES: UserId =
    UserId::from_uuid(Uuid::from_u128(0x5eed_0000_0000_0000_0000_0000_0000_0001));

/// Organizer behind the coastal festival listing
pub const COASTAL_EVENTS: UserId =
    UserId::from_uuid(Uuid::from_u128(0x5eed_0000_0000_0000_0000_0000_0000_0002));

/// Organizer behind the city food tour listing
pub const URBAN_EXPLORERS: UserId =
    UserId::from_uuid(Uuid::from_u128(0x5eed_0000_0000_0000_0000_0000_0000_0003));

const EVENT_IDS: [u128; 4] = [
    0x5eed_0000_0000_0000_0000_0000_0000_0101,
    0x5eed_0000_0000_0000_0000_0000_0000_0102,
    0x5eed_0000_0000_0000_0000_0000_0000_0103,
    0x5eed_0000_0000_0000_0000_0000_0000_0104,
];

#[allow(clippy::expect_used)] // the seeded calendar values are statically valid
fn on(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> (NaiveDate, NaiveTime) {
    (
        NaiveDate::from_ymd_opt(year, month, day).expect("valid seed date"),
        NaiveTime::from_hms_opt(hour, minute, 0).expect("valid seed time"),
    )
}

/// The four sample events every fresh catalog starts with
#[must_use]
pub fn sample_events() -> Vec<Event> {
    let (safari_date, safari_time) = on(2026, 9, 15, 6, 0);
    let (climb_date, climb_time) = on(2026, 9, 20, 5, 0);
    let (festival_date, festival_time) = on(2026, 9, 25, 18, 0);
    let (tour_date, tour_time) = on(2026, 9, 18, 10, 0);

    vec![
        Event {
            id: EventId::from_uuid(Uuid::from_u128(EVENT_IDS[0])),
            title: "Maasai Mara Safari Experience".to_string(),
            description: "Experience the incredible wildlife of Maasai Mara with \
                          professional guides and luxury accommodations."
                .to_string(),
            location: "Maasai Mara National Reserve".to_string(),
            date: safari_date,
            time: safari_time,
            price: Money::from_shillings(12_500),
            capacity: Capacity::new(20),
            booked: 8,
            organizer_id: SAFARI_ADVENTURES,
            organizer_name: "Safari Adventures Uganda".to_string(),
            image: "https://images.pexels.com/photos/631317/pexels-photo-631317.jpeg?w=500&h=300&fit=crop"
                .to_string(),
            category: Category::Safari,
            featured: true,
        },
        Event {
            id: EventId::from_uuid(Uuid::from_u128(EVENT_IDS[1])),
            title: "Mount Rwenzori Climbing Expedition".to_string(),
            description: "Challenge yourself with a guided climb up Mount Rwenzori, \
                          Africa's second-highest peak."
                .to_string(),
            location: "Mount Rwenzori National Park".to_string(),
            date: climb_date,
            time: climb_time,
            price: Money::from_shillings(15_000),
            capacity: Capacity::new(12),
            booked: 5,
            organizer_id: SAFARI_ADVENTURES,
            organizer_name: "Mountain Adventures".to_string(),
            image: "https://images.pexels.com/photos/618833/pexels-photo-618833.jpeg?w=500&h=300&fit=crop"
                .to_string(),
            category: Category::Adventure,
            featured: true,
        },
        Event {
            id: EventId::from_uuid(Uuid::from_u128(EVENT_IDS[2])),
            title: "Diani Beach Cultural Festival".to_string(),
            description: "Immerse yourself in coastal culture with traditional music, \
                          dance, and cuisine."
                .to_string(),
            location: "Lido Beach, Kitoro".to_string(),
            date: festival_date,
            time: festival_time,
            price: Money::from_shillings(2_500),
            capacity: Capacity::new(200),
            booked: 45,
            organizer_id: COASTAL_EVENTS,
            organizer_name: "Coastal Events Co.".to_string(),
            image: "https://images.pexels.com/photos/1586298/pexels-photo-1586298.jpeg?w=500&h=300&fit=crop"
                .to_string(),
            category: Category::Cultural,
            featured: false,
        },
        Event {
            id: EventId::from_uuid(Uuid::from_u128(EVENT_IDS[3])),
            title: "Kampala City Food Tour".to_string(),
            description: "Discover the flavors of Kampala with visits to local markets \
                          and authentic restaurants."
                .to_string(),
            location: "Kampala City Center".to_string(),
            date: tour_date,
            time: tour_time,
            price: Money::from_shillings(3_500),
            capacity: Capacity::new(15),
            booked: 12,
            organizer_id: URBAN_EXPLORERS,
            organizer_name: "Urban Explorers".to_string(),
            image: "https://images.pexels.com/photos/1640777/pexels-photo-1640777.jpeg?w=500&h=300&fit=crop"
                .to_string(),
            category: Category::Food,
            featured: false,
        },
    ]
}

/// Sample cover images used when an organizer lists an event without one
pub const SAMPLE_IMAGES: [&str; 4] = [
    "https://images.pexels.com/photos/631317/pexels-photo-631317.jpeg?w=500&h=300&fit=crop",
    "https://images.pexels.com/photos/618833/pexels-photo-618833.jpeg?w=500&h=300&fit=crop",
    "https://images.pexels.com/photos/1586298/pexels-photo-1586298.jpeg?w=500&h=300&fit=crop",
    "https://images.pexels.com/photos/1640777/pexels-photo-1640777.jpeg?w=500&h=300&fit=crop",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_ids_are_stable_across_calls() {
        let first = sample_events();
        let second = sample_events();
        assert_eq!(first.len(), 4);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.id, b.id);
        }
    }

    #[test]
    fn seeded_counts_respect_capacity() {
        for event in sample_events() {
            assert!(event.booked <= event.capacity.value());
            assert!(event.capacity.value() > 0);
        }
    }
}
