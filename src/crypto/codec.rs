//! AES-256-CBC secret codec.
//!
//! `encrypt` turns a plaintext password into an envelope string with a
//! fresh random IV.  `decrypt` goes the other way and never fails hard:
//! legacy plaintext is passed through and damaged envelopes come back as
//! [`RevealedSecret::Failed`] so one corrupt row cannot break a listing.

use std::sync::Arc;

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::TryRngCore;
use zeroize::Zeroizing;

use super::envelope::{looks_like_envelope, DecryptFailure, Envelope, IV_LEN};
use super::kdf::KeyMaterial;
use crate::errors::{Result, VaultError};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Shown in place of a password whose envelope could not be opened.
pub const FAILURE_PLACEHOLDER: &str = "[Password decryption failed]";

/// Outcome of reading a stored secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealedSecret {
    /// The envelope opened cleanly.
    Decrypted(Zeroizing<String>),
    /// The value predates encryption and was returned unchanged.
    Legacy(String),
    /// The value looked like an envelope but could not be opened.
    Failed(DecryptFailure),
}

impl RevealedSecret {
    /// The plaintext, if there is one.
    pub fn as_plaintext(&self) -> Option<&str> {
        match self {
            Self::Decrypted(p) => Some(p.as_str()),
            Self::Legacy(p) => Some(p.as_str()),
            Self::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    /// Collapse into the string shown to users, substituting
    /// [`FAILURE_PLACEHOLDER`] for failures.
    pub fn into_display_value(self) -> String {
        match self {
            Self::Decrypted(p) => p.as_str().to_owned(),
            Self::Legacy(p) => p,
            Self::Failed(_) => FAILURE_PLACEHOLDER.to_owned(),
        }
    }
}

/// Encrypts and decrypts stored secrets with an injected key.
///
/// Cloning is cheap; clones share the same key.
#[derive(Debug, Clone)]
pub struct SecretCodec {
    key: Arc<KeyMaterial>,
}

impl SecretCodec {
    pub fn new(key: KeyMaterial) -> Self {
        Self { key: Arc::new(key) }
    }

    /// The key this codec was built with.
    pub fn key(&self) -> &KeyMaterial {
        &self.key
    }

    /// Encrypt `plaintext` into a `hex(iv):hex(ciphertext)` envelope.
    ///
    /// Fails on empty input or if the OS random source is unavailable.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        if plaintext.is_empty() {
            return Err(VaultError::EncryptionFailed(
                "refusing to encrypt an empty secret".into(),
            ));
        }

        let mut iv = [0u8; IV_LEN];
        OsRng
            .try_fill_bytes(&mut iv)
            .map_err(|e| VaultError::EncryptionFailed(format!("random source: {e}")))?;

        Ok(self.seal_with_iv(iv, plaintext.as_bytes())?.encode())
    }

    /// Open a stored value.
    ///
    /// Values that do not look like an envelope are returned as
    /// [`RevealedSecret::Legacy`].  Never panics and never returns an error.
    pub fn decrypt(&self, stored: &str) -> RevealedSecret {
        if !looks_like_envelope(stored) {
            return RevealedSecret::Legacy(stored.to_owned());
        }

        match self.open(stored) {
            Ok(plaintext) => RevealedSecret::Decrypted(plaintext),
            Err(reason) => {
                tracing::warn!(%reason, "stored secret could not be decrypted");
                RevealedSecret::Failed(reason)
            }
        }
    }

    /// [`decrypt`](Self::decrypt) collapsed to a display string.
    pub fn decrypt_or_placeholder(&self, stored: &str) -> String {
        self.decrypt(stored).into_display_value()
    }

    pub(crate) fn seal_with_iv(&self, iv: [u8; IV_LEN], plaintext: &[u8]) -> Result<Envelope> {
        let cipher = Aes256CbcEnc::new_from_slices(self.key.as_bytes(), &iv)
            .map_err(|e| VaultError::EncryptionFailed(format!("invalid key or IV length: {e}")))?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);
        Ok(Envelope::new(iv, ciphertext))
    }

    fn open(&self, stored: &str) -> std::result::Result<Zeroizing<String>, DecryptFailure> {
        let envelope = Envelope::parse(stored)?;

        let cipher = Aes256CbcDec::new_from_slices(self.key.as_bytes(), envelope.iv())
            .map_err(|_| DecryptFailure::CipherRejected)?;
        let plaintext = cipher
            .decrypt_padded_vec_mut::<Pkcs7>(envelope.ciphertext())
            .map_err(|_| DecryptFailure::CipherRejected)?;

        String::from_utf8(plaintext).map(Zeroizing::new).map_err(|e| {
            drop(Zeroizing::new(e.into_bytes()));
            DecryptFailure::InvalidUtf8
        })
    }
}
