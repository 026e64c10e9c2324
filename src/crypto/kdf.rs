//! Passphrase-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! Every encryption generates a fresh random salt; every decryption
//! re-derives the key from the salt embedded in the envelope.  The key
//! is never cached across operations.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::encryption::NONCE_LEN;

/// Length of the salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// PBKDF2 iteration count.
///
/// This value is part of the wire compatibility contract: envelopes
/// written by earlier deployments were derived with exactly 1000
/// iterations, so changing it makes all historical data undecryptable.
pub const PBKDF2_ITERATIONS: u32 = 1000;

/// Derive a 32-byte encryption key from a passphrase and salt.
///
/// Deterministic: the same passphrase + salt always produces the same
/// key.  An empty passphrase is accepted; rejecting weak passphrases is
/// a caller concern.  The returned key is zeroized on drop.
pub fn derive_key(passphrase: &str, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, PBKDF2_ITERATIONS, &mut *key);
    key
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Generate a cryptographically random 16-byte nonce.
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    nonce
}
