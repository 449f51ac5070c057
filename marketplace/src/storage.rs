//! File-backed durable storage.
//!
//! Each slot lives in its own `<slot>.json` file under a data directory.
//! Writes go through a temp file and a rename so a crash mid-write leaves
//! the previous contents intact rather than a torn file.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tembea_core::storage::{SlotStore, StorageError, StorageFuture};
use tokio::fs;

/// Slot holding the serialized current-session [`crate::types::User`]
pub const SESSION_SLOT: &str = "session";

/// Slot holding the serialized booking ledger (`Vec<Booking>`)
pub const BOOKINGS_SLOT: &str = "bookings";

/// Decode a slot payload, treating malformed content as absent
///
/// A corrupted slot must not take the application down; it restores as if
/// it had never been written, and the damage is logged.
#[must_use]
pub fn decode_or_absent<T: DeserializeOwned>(slot: &str, bytes: Option<Vec<u8>>) -> Option<T> {
    let bytes = bytes?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(%slot, %error, "malformed slot payload, treating as absent");
            None
        }
    }
}

/// Encode a value for storage in `slot`
///
/// # Errors
///
/// Returns [`StorageError::Encode`] when serialization fails.
pub fn encode<T: Serialize>(slot: &str, value: &T) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec_pretty(value).map_err(|error| StorageError::Encode {
        slot: slot.to_string(),
        reason: error.to_string(),
    })
}

/// Durable slot storage backed by JSON files
///
/// Single-writer, last-write-wins: two processes pointed at the same data
/// directory will clobber each other. Fine for the single-user demo scope.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `root`; the directory is created lazily on
    /// first write
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory slots are stored under
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.root.join(format!("{slot}.json"))
    }

    fn io_error(error: &std::io::Error) -> StorageError {
        StorageError::Io(error.to_string())
    }
}

impl SlotStore for JsonFileStore {
    fn read(&self, slot: &str) -> StorageFuture<'_, Option<Vec<u8>>> {
        let path = self.slot_path(slot);
        Box::pin(async move {
            match fs::read(&path).await {
                Ok(bytes) => Ok(Some(bytes)),
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(error) => Err(Self::io_error(&error)),
            }
        })
    }

    fn write(&self, slot: &str, payload: Vec<u8>) -> StorageFuture<'_, ()> {
        let path = self.slot_path(slot);
        let tmp = self.root.join(format!("{slot}.json.tmp"));
        let root = self.root.clone();
        Box::pin(async move {
            fs::create_dir_all(&root)
                .await
                .map_err(|e| Self::io_error(&e))?;
            fs::write(&tmp, &payload)
                .await
                .map_err(|e| Self::io_error(&e))?;
            fs::rename(&tmp, &path)
                .await
                .map_err(|e| Self::io_error(&e))?;
            Ok(())
        })
    }

    fn remove(&self, slot: &str) -> StorageFuture<'_, ()> {
        let path = self.slot_path(slot);
        Box::pin(async move {
            match fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(error) => Err(Self::io_error(&error)),
            }
        })
    }
}
