//! # Tembea Testing
//!
//! Testing utilities and helpers for the Tembea store architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits (clock, slot storage)
//! - A fluent Given/When/Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use tembea_testing::{ReducerTest, mocks::test_clock};
//!
//! ReducerTest::new(CatalogReducer::new())
//!     .with_env(test_environment())
//!     .given_state(CatalogState::new())
//!     .when_action(CatalogAction::Initialize)
//!     .then_state(|state| assert_eq!(state.events.len(), 4))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use tembea_core::environment::Clock;

mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tembea_core::storage::{SlotStore, StorageError, StorageFuture};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use tembea_testing::mocks::FixedClock;
    /// use tembea_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2026-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// In-memory slot storage for tests
    ///
    /// Shares its contents across clones, so a test can hand the same
    /// store to an aggregate and inspect (or corrupt) slots directly.
    #[derive(Default)]
    pub struct InMemorySlotStore {
        slots: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl InMemorySlotStore {
        /// Create an empty in-memory store
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Synchronously read a slot, for assertions
        #[must_use]
        pub fn peek(&self, slot: &str) -> Option<Vec<u8>> {
            self.lock().get(slot).cloned()
        }

        /// Synchronously replace a slot, for seeding fixtures
        pub fn seed(&self, slot: &str, payload: Vec<u8>) {
            self.lock().insert(slot.to_string(), payload);
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
            // A poisoned mutex only means another test thread panicked;
            // the map itself is still usable.
            match self.slots.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            }
        }
    }

    impl SlotStore for InMemorySlotStore {
        fn read(&self, slot: &str) -> StorageFuture<'_, Option<Vec<u8>>> {
            let value = self.lock().get(slot).cloned();
            Box::pin(async move { Ok(value) })
        }

        fn write(&self, slot: &str, payload: Vec<u8>) -> StorageFuture<'_, ()> {
            self.lock().insert(slot.to_string(), payload);
            Box::pin(async move { Ok(()) })
        }

        fn remove(&self, slot: &str) -> StorageFuture<'_, ()> {
            self.lock().remove(slot);
            Box::pin(async move { Ok(()) })
        }
    }

    /// Slot storage that fails every operation, for error-path tests
    #[derive(Debug, Clone, Copy, Default)]
    pub struct FailingSlotStore;

    impl FailingSlotStore {
        /// Create a store whose operations always fail
        #[must_use]
        pub const fn new() -> Self {
            Self
        }
    }

    impl SlotStore for FailingSlotStore {
        fn read(&self, _slot: &str) -> StorageFuture<'_, Option<Vec<u8>>> {
            Box::pin(async { Err(StorageError::Io("mock storage failure".to_string())) })
        }

        fn write(&self, _slot: &str, _payload: Vec<u8>) -> StorageFuture<'_, ()> {
            Box::pin(async { Err(StorageError::Io("mock storage failure".to_string())) })
        }

        fn remove(&self, _slot: &str) -> StorageFuture<'_, ()> {
            Box::pin(async { Err(StorageError::Io("mock storage failure".to_string())) })
        }
    }
}

// Re-export commonly used items
pub use mocks::{FailingSlotStore, FixedClock, InMemorySlotStore, test_clock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_is_deterministic() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn in_memory_store_seeds_and_peeks() {
        let store = InMemorySlotStore::new();
        assert!(store.peek("session").is_none());

        store.seed("session", b"{}".to_vec());
        assert_eq!(store.peek("session"), Some(b"{}".to_vec()));
    }
}
