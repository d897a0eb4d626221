//! The stored envelope format: `hex(iv) + ":" + hex(ciphertext)`.
//!
//! Rows written before encryption was introduced hold raw plaintext in
//! the same column, and nothing marks which is which.  Every decision
//! about "is this an envelope?" goes through [`looks_like_envelope`].

use thiserror::Error;

/// AES block size, which is also the IV length.
pub const IV_LEN: usize = 16;

/// Separator between the IV and the ciphertext.
pub const SEPARATOR: char = ':';

/// Why a value that looked like an envelope could not be opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecryptFailure {
    #[error("envelope segment is not valid hex: {0}")]
    InvalidHex(String),

    #[error("IV must be 16 bytes (got {0})")]
    InvalidIvLength(usize),

    #[error("ciphertext is empty")]
    EmptyCiphertext,

    #[error("ciphertext length {0} is not a multiple of the block size")]
    UnalignedCiphertext(usize),

    #[error("cipher rejected the ciphertext (bad padding or wrong key)")]
    CipherRejected,

    #[error("decrypted bytes are not valid UTF-8")]
    InvalidUtf8,
}

/// A parsed envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    iv: [u8; IV_LEN],
    ciphertext: Vec<u8>,
}

impl Envelope {
    pub fn new(iv: [u8; IV_LEN], ciphertext: Vec<u8>) -> Self {
        Self { iv, ciphertext }
    }

    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Serialize as lowercase `iv:ciphertext` hex.
    pub fn encode(&self) -> String {
        format!(
            "{}{SEPARATOR}{}",
            hex::encode(self.iv),
            hex::encode(&self.ciphertext)
        )
    }

    /// Strictly decode a stored value.
    ///
    /// Accepts upper- and lowercase hex.  Callers should check
    /// [`looks_like_envelope`] first; this function does not distinguish
    /// legacy plaintext from a damaged envelope.
    pub fn parse(stored: &str) -> Result<Self, DecryptFailure> {
        let (iv_hex, ct_hex) = split(stored).ok_or_else(|| {
            DecryptFailure::InvalidHex("expected exactly one ':' separator".into())
        })?;

        let iv_bytes =
            hex::decode(iv_hex).map_err(|e| DecryptFailure::InvalidHex(format!("iv: {e}")))?;
        let iv: [u8; IV_LEN] = iv_bytes
            .as_slice()
            .try_into()
            .map_err(|_| DecryptFailure::InvalidIvLength(iv_bytes.len()))?;

        let ciphertext = hex::decode(ct_hex)
            .map_err(|e| DecryptFailure::InvalidHex(format!("ciphertext: {e}")))?;
        if ciphertext.is_empty() {
            return Err(DecryptFailure::EmptyCiphertext);
        }
        if ciphertext.len() % IV_LEN != 0 {
            return Err(DecryptFailure::UnalignedCiphertext(ciphertext.len()));
        }

        Ok(Self { iv, ciphertext })
    }
}

impl std::fmt::Display for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Decide whether a stored value is an envelope or legacy plaintext.
///
/// A value counts as an envelope when it has exactly one `:`, both sides
/// are non-empty, and the left side is made only of hex digits.
///
/// This is a heuristic.  A legacy password such as `cafe:latte` is
/// indistinguishable from a damaged envelope and will be reported as a
/// decryption failure rather than returned as-is.
pub fn looks_like_envelope(stored: &str) -> bool {
    match split(stored) {
        Some((iv_hex, ct_hex)) => {
            !iv_hex.is_empty()
                && !ct_hex.is_empty()
                && iv_hex.bytes().all(|b| b.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// Split on the separator, requiring exactly one occurrence.
fn split(stored: &str) -> Option<(&str, &str)> {
    let (left, right) = stored.split_once(SEPARATOR)?;
    if right.contains(SEPARATOR) {
        return None;
    }
    Some((left, right))
}

#[cfg(test)]
mod tests {
    use super::*;

    const IV_HEX: &str = "000102030405060708090a0b0c0d0e0f";

    #[test]
    fn encode_is_lowercase_hex_pair() {
        let env = Envelope::new([0xAB; IV_LEN], vec![0xCD; 32]);
        let encoded = env.encode();
        assert_eq!(encoded, format!("{}:{}", "ab".repeat(16), "cd".repeat(32)));
        assert_eq!(encoded, env.to_string());
    }

    #[test]
    fn parse_accepts_uppercase() {
        let stored = format!("{}:{}", IV_HEX.to_uppercase(), "FF".repeat(16));
        let env = Envelope::parse(&stored).unwrap();
        assert_eq!(env.iv()[15], 0x0f);
        assert_eq!(env.ciphertext(), &[0xFF; 16]);
    }

    #[test]
    fn parse_rejects_short_iv() {
        let err = Envelope::parse(&format!("deadbeef:{}", "00".repeat(16))).unwrap_err();
        assert_eq!(err, DecryptFailure::InvalidIvLength(4));
    }

    #[test]
    fn parse_rejects_bad_hex() {
        let err = Envelope::parse(&format!("{IV_HEX}:zz")).unwrap_err();
        assert!(matches!(err, DecryptFailure::InvalidHex(_)));
    }

    #[test]
    fn parse_rejects_unaligned_ciphertext() {
        let err = Envelope::parse(&format!("{IV_HEX}:0011")).unwrap_err();
        assert_eq!(err, DecryptFailure::UnalignedCiphertext(2));
    }

    #[test]
    fn plain_values_are_not_envelopes() {
        assert!(!looks_like_envelope("OldPass1"));
        assert!(!looks_like_envelope(""));
        assert!(!looks_like_envelope("a:b:c"));
        assert!(!looks_like_envelope(":abcd"));
        assert!(!looks_like_envelope("abcd:"));
        assert!(!looks_like_envelope("user:pass"));
    }

    #[test]
    fn hex_prefixed_values_are_envelopes() {
        assert!(looks_like_envelope(&format!("{IV_HEX}:00ff")));
        assert!(looks_like_envelope("deadbeef:zz"));
        assert!(looks_like_envelope("DEADBEEF:00"));
    }
}
