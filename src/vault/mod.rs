//! Vault module: credential records and their persistence.
//!
//! This module provides:
//! - `VaultRecord`, `NewRecord`, `RecordUpdate` and `RecordView` (`record`)
//! - pre-persist sealing and post-read reveal hooks (`hooks`)
//! - the SQLite-backed `RecordStore` (`store`)

pub mod hooks;
pub mod record;
pub mod store;

// Re-export the most commonly used items.
pub use record::{
    NewRecord, RecordUpdate, RecordView, SecretField, VaultRecord, DEFAULT_CATEGORY,
};
pub use store::RecordStore;
