//! Tests for #[derive(Action)] macro

use tembea_macros::Action;

#[derive(Action, Clone, Debug, PartialEq)]
enum BookingAction {
    #[command]
    SubmitBooking { event: String, quantity: u32 },

    #[command]
    CancelBooking,

    #[event]
    BookingConfirmed { event: String },

    #[event]
    BookingRejected(String),
}

#[test]
fn commands_are_classified() {
    let action = BookingAction::SubmitBooking {
        event: "safari".to_string(),
        quantity: 2,
    };
    assert!(action.is_command());
    assert!(!action.is_event());

    assert!(BookingAction::CancelBooking.is_command());
}

#[test]
fn events_are_classified() {
    let action = BookingAction::BookingConfirmed {
        event: "safari".to_string(),
    };
    assert!(action.is_event());
    assert!(!action.is_command());

    let rejected = BookingAction::BookingRejected("sold out".to_string());
    assert!(rejected.is_event());
    assert!(!rejected.is_command());
}

#[test]
fn action_names_match_variants() {
    assert_eq!(BookingAction::CancelBooking.action_name(), "CancelBooking");
    assert_eq!(
        BookingAction::BookingRejected("sold out".to_string()).action_name(),
        "BookingRejected"
    );
}
