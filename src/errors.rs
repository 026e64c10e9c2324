use thiserror::Error;

/// All errors that can occur in CloudVault.
#[derive(Debug, Error)]
pub enum CloudVaultError {
    // --- Backend errors ---
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Secret resource '{0}' not found")]
    ResourceNotFound(String),

    #[error("Secret resource '{0}' already exists")]
    ResourceAlreadyExists(String),

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong passphrase or corrupted data")]
    AuthenticationFailure,

    // --- Envelope errors ---
    #[error("Malformed envelope: {0}")]
    EnvelopeMalformed(String),

    // --- Config errors ---
    #[error("Config error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Convenience type alias for CloudVault results.
pub type Result<T> = std::result::Result<T, CloudVaultError>;
