use thiserror::Error;

/// All errors that can occur in credvault.
///
/// Read-time decryption problems are deliberately absent: they are
/// reported as [`crate::crypto::DecryptFailure`] values inside a
/// [`crate::crypto::RevealedSecret`] so one bad row never aborts a listing.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Record errors ---
    #[error("Invalid record: {0}")]
    Validation(String),

    #[error("Credential {0} not found")]
    RecordNotFound(i64),

    // --- Storage errors ---
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Audit error: {0}")]
    AuditError(String),
}

/// Convenience type alias for credvault results.
pub type Result<T> = std::result::Result<T, VaultError>;
