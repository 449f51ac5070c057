//! End-to-end booking flows through the stores.
//!
//! These tests drive `MarketplaceApp` the way a frontend would, with
//! zero-latency gateways and in-memory storage injected through the
//! dependency seam.
//!
//! Run with: `cargo test --test booking_flow_test`

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;
use tembea_core::environment::SystemClock;
use tembea_core::storage::SlotStore;
use tembea_marketplace::aggregates::CatalogAction;
use tembea_marketplace::gateway::{MockAuthGateway, MockPaymentGateway};
use tembea_marketplace::{
    AppError, Category, EventFilter, MarketplaceApp, Money, PaymentMethod, RejectReason, Role,
    UserId,
};
use tembea_testing::InMemorySlotStore;

fn test_app() -> MarketplaceApp {
    test_app_with_storage(Arc::new(InMemorySlotStore::new()))
}

fn test_app_with_storage(storage: Arc<dyn SlotStore>) -> MarketplaceApp {
    MarketplaceApp::with_parts(
        storage,
        Arc::new(MockAuthGateway::instant()),
        Arc::new(MockPaymentGateway::instant()),
        Arc::new(SystemClock),
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn startup_seeds_catalog_and_finishes_restoring() {
    let app = test_app();
    app.start().await.unwrap();

    assert!(!app.is_restoring().await);
    assert!(app.current_user().await.is_none());

    let events = app.events().await;
    assert_eq!(events.len(), 4);
    // capacity 20, booked 8 on the safari
    assert_eq!(events[0].available(), 12);
}

#[tokio::test]
async fn full_booking_flow_updates_ledger_and_availability() {
    let app = test_app();
    app.start().await.unwrap();

    let attendee = app
        .log_in("amina@example.com", "ignored", Role::Attendee)
        .await
        .unwrap();
    assert_eq!(attendee.name, "amina");

    // Book the safari out exactly: 12 remaining seats
    let safari = app.events().await[0].clone();
    let booking = app
        .book_event(safari.id, 12, PaymentMethod::Mpesa)
        .await
        .unwrap();

    assert_eq!(booking.quantity, 12);
    assert_eq!(
        booking.total_amount,
        Money::from_shillings(12_500).checked_multiply(12).unwrap()
    );

    let after = app.events().await[0].clone();
    assert_eq!(after.booked, 20);
    assert!(after.is_sold_out());

    let mine = app.my_bookings().await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, booking.id);

    let summary = app.attendee_summary().await.unwrap();
    assert_eq!(summary.tickets, 12);
    assert_eq!(summary.total_spent, booking.total_amount);
}

#[tokio::test]
async fn overbooking_is_rejected_without_mutation() {
    let app = test_app();
    app.start().await.unwrap();

    app.log_in("amina@example.com", "ignored", Role::Attendee)
        .await
        .unwrap();

    // 12 seats remain on the safari; 13 must be turned away
    let safari = app.events().await[0].clone();
    let result = app.book_event(safari.id, 13, PaymentMethod::Card).await;

    match result {
        Err(AppError::Booking(RejectReason::SoldOut {
            requested,
            available,
        })) => {
            assert_eq!(requested, 13);
            assert_eq!(available, 12);
        }
        other => panic!("expected SoldOut rejection, got {other:?}"),
    }

    assert_eq!(app.events().await[0].booked, 8);
    assert!(app.my_bookings().await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_bookings_never_oversell_the_last_seats() {
    let app = test_app();
    app.start().await.unwrap();

    // The food tour: capacity 15, booked 12 -> 3 seats left
    let tour = app.events().await[3].clone();
    assert_eq!(tour.available(), 3);

    // Five attendees race for them
    let mut handles = Vec::new();
    for _ in 0..5 {
        let handle = app
            .catalog
            .send(CatalogAction::SubmitBooking {
                event_id: tour.id,
                user_id: UserId::new(),
                quantity: 1,
                payment_method: PaymentMethod::Card,
            })
            .await
            .unwrap();
        handles.push(handle);
    }
    for mut handle in handles {
        handle.wait().await;
    }

    let after = app
        .catalog
        .state(|s| (s.find_event(&tour.id).cloned(), s.bookings.clone()))
        .await;
    let (event, ledger) = after;
    let event = event.unwrap();

    // Exactly the three free seats were sold, not one more
    assert_eq!(event.booked, 15);
    assert!(event.is_sold_out());
    assert_eq!(ledger.len(), 3);
    assert!(ledger.iter().all(|b| b.quantity == 1));
}

#[tokio::test]
async fn organizer_lists_event_and_sees_dashboard() {
    let app = test_app();
    app.start().await.unwrap();

    let organizer = app
        .sign_up(
            "nakato@lakeviewtours.ug",
            "ignored",
            "Lakeview Tours",
            Role::Organizer,
            None,
        )
        .await
        .unwrap();

    let listed = app
        .create_event(tembea_marketplace::EventDraft {
            title: "Lake Bunyonyi Canoe Sunrise".to_string(),
            description: "Paddle out at dawn".to_string(),
            location: "Lake Bunyonyi".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2026, 10, 10).unwrap(),
            time: chrono::NaiveTime::from_hms_opt(5, 30, 0).unwrap(),
            price: Money::from_shillings(45_000),
            capacity: tembea_marketplace::Capacity::new(8),
            category: Category::Adventure,
            image: None,
            featured: true,
        })
        .await
        .unwrap();

    assert_eq!(listed.booked, 0);
    assert_eq!(listed.available(), 8);
    assert_eq!(listed.organizer_id, organizer.id);
    assert_eq!(listed.organizer_name, "Lakeview Tours");

    let mine = app.my_events().await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, listed.id);

    // No bookings yet, so no revenue
    let summary = app.organizer_summary().await.unwrap();
    assert_eq!(summary.total_events, 1);
    assert_eq!(summary.total_bookings, 0);
    assert_eq!(summary.total_revenue, Money::ZERO);
}

#[tokio::test]
async fn discovery_filters_compose() {
    let app = test_app();
    app.start().await.unwrap();

    let safaris = app
        .discover(&EventFilter::any().with_search("safari"))
        .await;
    assert_eq!(safaris.len(), 1);

    let cultural = app
        .discover(&EventFilter::any().with_category(Category::Cultural))
        .await;
    assert_eq!(cultural.len(), 1);
    assert_eq!(cultural[0].title, "Diani Beach Cultural Festival");

    let none = app
        .discover(
            &EventFilter::any()
                .with_search("safari")
                .with_category(Category::Food),
        )
        .await;
    assert!(none.is_empty());
}

#[tokio::test]
async fn operations_requiring_a_session_fail_without_one() {
    let app = test_app();
    app.start().await.unwrap();

    let safari = app.events().await[0].clone();
    let booking = app.book_event(safari.id, 1, PaymentMethod::Card).await;
    assert!(matches!(booking, Err(AppError::NotAuthenticated)));

    assert!(matches!(
        app.my_bookings().await,
        Err(AppError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn attendees_cannot_list_events() {
    let app = test_app();
    app.start().await.unwrap();

    app.log_in("amina@example.com", "ignored", Role::Attendee)
        .await
        .unwrap();

    let result = app
        .create_event(tembea_marketplace::EventDraft {
            title: "Unauthorized".to_string(),
            description: String::new(),
            location: String::new(),
            date: chrono::NaiveDate::from_ymd_opt(2026, 10, 10).unwrap(),
            time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            price: Money::from_shillings(1_000),
            capacity: tembea_marketplace::Capacity::new(5),
            category: Category::Other,
            image: None,
            featured: false,
        })
        .await;

    assert!(matches!(result, Err(AppError::NotAnOrganizer)));
    assert_eq!(app.events().await.len(), 4);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = test_app();
    app.start().await.unwrap();

    app.log_in("amina@example.com", "ignored", Role::Attendee)
        .await
        .unwrap();
    assert!(app.current_user().await.is_some());

    app.log_out().await.unwrap();
    assert!(app.current_user().await.is_none());
}
