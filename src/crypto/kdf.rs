//! Process-wide key derivation using scrypt.
//!
//! The vault key is derived once at startup from a configured secret and
//! the fixed salt `"salt"`, then injected into the codec.  The default
//! cost (N = 2^14, r = 8, p = 1) matches the deployment whose rows this
//! crate must keep reading.

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::config::Settings;
use crate::errors::{Result, VaultError};

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Salt shared by every derivation.
///
/// A single static salt is weak, but changing it would orphan every
/// envelope already written.
pub const STATIC_SALT: &[u8] = b"salt";

/// Secret used when no secret is configured.
pub const FALLBACK_SECRET: &str = "fallback-key";

/// Environment variable the original deployment read its secret from.
pub const LEGACY_SECRET_ENV: &str = "JWT_SECRET";

/// Minimum accepted cost exponent (N = 1024).
const MIN_LOG_N: u8 = 10;

/// scrypt cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptCost {
    /// Cost exponent: N = 2^log_n.
    pub log_n: u8,
    /// Block size.
    pub r: u32,
    /// Parallelism.
    pub p: u32,
}

impl Default for ScryptCost {
    fn default() -> Self {
        Self {
            log_n: 14,
            r: 8,
            p: 1,
        }
    }
}

/// Where the key material's secret came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// A secret was found in the configured environment variable.
    Configured,
    /// Nothing was configured and [`FALLBACK_SECRET`] was used.
    Fallback,
}

/// The 32-byte vault key, zeroed when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    bytes: [u8; KEY_LEN],
    #[zeroize(skip)]
    source: KeySource,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("bytes", &"[REDACTED]")
            .field("source", &self.source)
            .finish()
    }
}

impl KeyMaterial {
    /// Wrap raw key bytes, e.g. a fixed key in tests.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self {
            bytes,
            source: KeySource::Configured,
        }
    }

    /// Derive the key from `secret` and [`STATIC_SALT`].
    pub fn derive(secret: &[u8], cost: &ScryptCost) -> Result<Self> {
        let bytes = derive_key(secret, STATIC_SALT, cost)?;
        Ok(Self {
            bytes: *bytes,
            source: KeySource::Configured,
        })
    }

    /// Derive the key from an optional secret, falling back to
    /// [`FALLBACK_SECRET`] when it is missing or empty.
    pub fn from_secret(secret: Option<&str>, cost: &ScryptCost) -> Result<Self> {
        match secret.filter(|s| !s.is_empty()) {
            Some(s) => Self::derive(s.as_bytes(), cost),
            None => {
                tracing::warn!(
                    "no vault secret configured; deriving the key from the built-in fallback secret. \
                     Anyone with this binary can decrypt the stored passwords"
                );
                let mut key = Self::derive(FALLBACK_SECRET.as_bytes(), cost)?;
                key.source = KeySource::Fallback;
                Ok(key)
            }
        }
    }

    /// Derive the key using the secret named by `settings.secret_env`,
    /// then [`LEGACY_SECRET_ENV`], then the fallback.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let secret = [settings.secret_env.as_str(), LEGACY_SECRET_ENV]
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
            .map(Zeroizing::new);

        Self::from_secret(secret.as_deref().map(String::as_str), &settings.scrypt_cost())
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    pub fn source(&self) -> KeySource {
        self.source
    }

    /// `true` when the key came from the hardcoded fallback secret.
    pub fn is_fallback(&self) -> bool {
        self.source == KeySource::Fallback
    }
}

/// Run scrypt with explicit cost parameters.
///
/// Enforces a minimum cost to prevent dangerously weak settings.
pub fn derive_key(
    secret: &[u8],
    salt: &[u8],
    cost: &ScryptCost,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    if cost.log_n < MIN_LOG_N {
        return Err(VaultError::KeyDerivationFailed(format!(
            "scrypt log_n must be at least {MIN_LOG_N} (got {})",
            cost.log_n
        )));
    }

    let params = scrypt::Params::new(cost.log_n, cost.r, cost.p, KEY_LEN)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("invalid scrypt params: {e}")))?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    scrypt::scrypt(secret, salt, &params, key.as_mut())
        .map_err(|e| VaultError::KeyDerivationFailed(format!("scrypt failed: {e}")))?;

    Ok(key)
}
