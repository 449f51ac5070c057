//! Tembea Marketplace Demo
//!
//! Scripted walkthrough of the marketplace core:
//! - Session restore from durable storage
//! - Organizer signup and event creation
//! - Attendee discovery with search and category filters
//! - Booking with the simulated payment round-trip
//! - Organizer and attendee dashboards
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin demo
//! ```
//!
//! State persists under `TEMBEA_DATA_DIR` (default `./data`); run the demo
//! twice to watch the ledger and session survive a restart.

use tembea_marketplace::{
    Capacity, Category, Config, EventDraft, EventFilter, MarketplaceApp, Money, PaymentMethod,
    Role,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tembea_marketplace=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("\n============================================");
    println!("   Tembea Marketplace - Live Demo");
    println!("============================================\n");

    let config = Config::from_env();
    let app = MarketplaceApp::new(&config);

    println!("Restoring session and ledger from {}...", config.storage.data_dir);
    app.start().await?;

    if let Some(user) = app.current_user().await {
        println!("Restored session for {} ({})\n", user.name, user.role);
        app.log_out().await?;
        println!("Signed out to run the walkthrough fresh.\n");
    } else {
        println!("No stored session.\n");
    }

    // ========== Organizer flow ==========

    println!("1. Signing up an organizer...");
    let organizer = app
        .sign_up(
            "nakato@lakeviewtours.ug",
            "not-checked",
            "Lakeview Tours",
            Role::Organizer,
            Some("+256700123456".to_string()),
        )
        .await?;
    println!("   Signed in as {} ({})\n", organizer.name, organizer.role);

    println!("2. Listing a new event...");
    let listing = app
        .create_event(EventDraft {
            title: "Lake Bunyonyi Canoe Sunrise".to_string(),
            description: "Paddle out at dawn with a local guide and breakfast on the water."
                .to_string(),
            location: "Lake Bunyonyi".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2026, 10, 10).ok_or("invalid demo date")?,
            time: chrono::NaiveTime::from_hms_opt(5, 30, 0).ok_or("invalid demo time")?,
            price: Money::from_shillings(45_000),
            capacity: Capacity::new(8),
            category: Category::Adventure,
            image: None,
            featured: true,
        })
        .await?;
    println!(
        "   Listed \"{}\" - {} seats at {}\n",
        listing.title,
        listing.capacity,
        listing.price
    );

    let summary = app.organizer_summary().await?;
    println!(
        "   Organizer dashboard: {} events, {} bookings, revenue {}\n",
        summary.total_events, summary.total_bookings, summary.total_revenue
    );

    app.log_out().await?;

    // ========== Attendee flow ==========

    println!("3. Signing in an attendee...");
    let attendee = app
        .log_in("amina@example.com", "not-checked", Role::Attendee)
        .await?;
    println!("   Signed in as {} ({})\n", attendee.name, attendee.role);

    println!("4. Discovering events...");
    let all = app.events().await;
    println!("   Catalog has {} events:", all.len());
    for event in &all {
        println!(
            "   - {} @ {} ({} of {} seats free, {})",
            event.title,
            event.location,
            event.available(),
            event.capacity,
            event.price
        );
    }

    let filter = EventFilter::any().with_search("safari");
    let safaris = app.discover(&filter).await;
    println!("\n   Search \"safari\" matches {} event(s).", safaris.len());

    let canoes = app
        .discover(&EventFilter::any().with_category(Category::Adventure))
        .await;
    println!("   Category Adventure matches {} event(s).\n", canoes.len());

    println!("5. Booking 2 seats on \"{}\"...", listing.title);
    println!("   (the payment gateway round-trip takes a moment)");
    let booking = app
        .book_event(listing.id, 2, PaymentMethod::Mpesa)
        .await?;
    println!(
        "   Confirmed booking {} - {} seats, total {}\n",
        booking.id, booking.quantity, booking.total_amount
    );

    let mine = app.my_bookings().await?;
    let spent = app.attendee_summary().await?;
    println!(
        "   Attendee dashboard: {} booking(s), {} tickets, spent {}\n",
        mine.len(),
        spent.tickets,
        spent.total_spent
    );

    println!("6. Trying to overbook (7 seats, {} free)...", 8 - 2);
    match app.book_event(listing.id, 7, PaymentMethod::Card).await {
        Ok(_) => println!("   Unexpectedly confirmed!"),
        Err(error) => println!("   Turned away as expected: {error}\n"),
    }

    app.shutdown(std::time::Duration::from_secs(5)).await?;
    println!("Done. Run the demo again to see the ledger restored.");

    Ok(())
}
