//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when creating `Effect` variants,
//! particularly for the durable-storage operations every aggregate uses.

/// Create an `Effect::Storage` read operation
///
/// # Example
///
/// ```rust,ignore
/// use tembea_core::read_slot;
///
/// read_slot! {
///     storage: env.storage,
///     slot: SESSION_SLOT,
///     on_success: |bytes| Some(SessionAction::SessionRestored {
///         user: decode_or_absent(SESSION_SLOT, bytes),
///     }),
///     on_error: |error| Some(SessionAction::SessionFaulted {
///         error: error.to_string(),
///     })
/// }
/// ```
#[macro_export]
macro_rules! read_slot {
    (
        storage: $storage:expr,
        slot: $slot:expr,
        on_success: |$success_param:ident| $success_body:expr,
        on_error: |$error_param:ident| $error_body:expr
    ) => {
        $crate::effect::Effect::Storage($crate::effect::StorageOperation::Read {
            storage: ::std::sync::Arc::clone(&$storage),
            slot: $slot.to_string(),
            on_success: ::std::boxed::Box::new(move |$success_param| $success_body),
            on_error: ::std::boxed::Box::new(move |$error_param| $error_body),
        })
    };
}

/// Create an `Effect::Storage` write operation
///
/// # Example
///
/// ```rust,ignore
/// use tembea_core::write_slot;
///
/// write_slot! {
///     storage: env.storage,
///     slot: BOOKINGS_SLOT,
///     payload: serialized_ledger,
///     on_success: || None,
///     on_error: |error| Some(CatalogAction::CatalogFaulted {
///         error: error.to_string(),
///     })
/// }
/// ```
#[macro_export]
macro_rules! write_slot {
    (
        storage: $storage:expr,
        slot: $slot:expr,
        payload: $payload:expr,
        on_success: || $success_body:expr,
        on_error: |$error_param:ident| $error_body:expr
    ) => {
        $crate::effect::Effect::Storage($crate::effect::StorageOperation::Write {
            storage: ::std::sync::Arc::clone(&$storage),
            slot: $slot.to_string(),
            payload: $payload,
            on_success: ::std::boxed::Box::new(move |()| $success_body),
            on_error: ::std::boxed::Box::new(move |$error_param| $error_body),
        })
    };
}

/// Create an `Effect::Storage` remove operation
///
/// # Example
///
/// ```rust,ignore
/// use tembea_core::clear_slot;
///
/// clear_slot! {
///     storage: env.storage,
///     slot: SESSION_SLOT,
///     on_success: || None,
///     on_error: |error| Some(SessionAction::SessionFaulted {
///         error: error.to_string(),
///     })
/// }
/// ```
#[macro_export]
macro_rules! clear_slot {
    (
        storage: $storage:expr,
        slot: $slot:expr,
        on_success: || $success_body:expr,
        on_error: |$error_param:ident| $error_body:expr
    ) => {
        $crate::effect::Effect::Storage($crate::effect::StorageOperation::Remove {
            storage: ::std::sync::Arc::clone(&$storage),
            slot: $slot.to_string(),
            on_success: ::std::boxed::Box::new(move |()| $success_body),
            on_error: ::std::boxed::Box::new(move |$error_param| $error_body),
        })
    };
}

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use tembea_core::async_effect;
///
/// async_effect! {
///     let receipt = gateway.charge(amount, method).await?;
///     Some(CatalogAction::PaymentSettled { receipt })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move { $($body)* }))
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use tembea_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(30),
///     action: SessionAction::Initialize
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}
