//! AES-256-GCM authenticated encryption with a 16-byte nonce.
//!
//! Unlike the usual 12-byte GCM nonce, CloudVault envelopes carry a
//! 16-byte nonce.  That size is part of the wire format — envelopes
//! written by earlier deployments embed 16 nonce bytes — so the cipher
//! is instantiated with a 16-byte nonce size instead of the default.
//!
//! The nonce is passed in explicitly rather than generated here: the
//! envelope layer owns salt/nonce generation so the encrypt-side and
//! decrypt-side key paths stay separate.

use aes_gcm::aead::generic_array::typenum::U16;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Nonce};

use crate::errors::{CloudVaultError, Result};

/// Size of the AES-GCM nonce in bytes.
pub const NONCE_LEN: usize = 16;

/// AES-256-GCM parameterized with a 16-byte nonce.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Encrypt `plaintext` with a 32-byte `key` and 16-byte `nonce`.
///
/// Returns the ciphertext with the 16-byte authentication tag appended.
pub fn encrypt(key: &[u8], nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm16::new_from_slice(key)
        .map_err(|e| CloudVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    cipher
        .encrypt(Nonce::<U16>::from_slice(nonce), plaintext)
        .map_err(|e| CloudVaultError::EncryptionFailed(format!("encryption error: {e}")))
}

/// Decrypt and verify data that was produced by `encrypt`.
///
/// Fails with `AuthenticationFailure` when the authentication tag does
/// not verify — wrong passphrase, corrupted ciphertext, or a mismatched
/// nonce/key pairing all land here.
pub fn decrypt(key: &[u8], nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher =
        Aes256Gcm16::new_from_slice(key).map_err(|_| CloudVaultError::AuthenticationFailure)?;

    cipher
        .decrypt(Nonce::<U16>::from_slice(nonce), ciphertext)
        .map_err(|_| CloudVaultError::AuthenticationFailure)
}
