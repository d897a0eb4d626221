//! Persistence hooks around the password column.
//!
//! `seal_for_write` runs right before a row is written; `reveal` is the
//! on-demand accessor used after a row is read.  Write-time failures are
//! fatal to the write, read-time failures are soft.

use crate::crypto::{Envelope, RevealedSecret, SecretCodec};
use crate::errors::Result;

use super::record::{SecretField, VaultRecord};

/// Produce the value to persist for a password column.
///
/// - `Stored` values are returned untouched, so re-saving a record never
///   re-encrypts it.
/// - `Pending` values are encrypted, unless they already parse as a
///   well-formed envelope, in which case they are stored as-is and a
///   warning is logged.  Anything short of that (`cafe:latte`) is
///   ordinary plaintext and gets encrypted.
///
/// An encryption error is returned to the caller; plaintext is never
/// written in its place.
pub fn seal_for_write(codec: &SecretCodec, field: &SecretField) -> Result<String> {
    match field {
        SecretField::Stored(stored) => Ok(stored.clone()),
        SecretField::Pending(plaintext) if Envelope::parse(plaintext).is_ok() => {
            tracing::warn!(
                "new password already has the envelope shape; storing it without re-encrypting"
            );
            Ok(plaintext.as_str().to_owned())
        }
        SecretField::Pending(plaintext) => codec.encrypt(plaintext),
    }
}

/// Reveal a record's password.
///
/// A password that has not been saved yet is returned as-is.
pub fn reveal(codec: &SecretCodec, record: &VaultRecord) -> RevealedSecret {
    match &record.secret {
        SecretField::Pending(plaintext) => RevealedSecret::Decrypted(plaintext.clone()),
        SecretField::Stored(stored) => {
            let revealed = codec.decrypt(stored);
            if let RevealedSecret::Failed(reason) = &revealed {
                tracing::warn!(
                    record_id = ?record.id,
                    owner = %record.owner,
                    %reason,
                    "returning placeholder for undecryptable password"
                );
            }
            revealed
        }
    }
}
