//! At-rest encryption for stored passwords.
//!
//! This module provides:
//! - scrypt key derivation into an injected `KeyMaterial` (`kdf`)
//! - the `iv:ciphertext` hex envelope and its detection predicate (`envelope`)
//! - AES-256-CBC encryption and fail-soft decryption (`codec`)

pub mod codec;
pub mod envelope;
pub mod kdf;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{SecretCodec, KeyMaterial, RevealedSecret, ...};
pub use codec::{RevealedSecret, SecretCodec, FAILURE_PLACEHOLDER};
pub use envelope::{looks_like_envelope, DecryptFailure, Envelope};
pub use kdf::{KeyMaterial, KeySource, ScryptCost};
