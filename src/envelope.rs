//! Envelope wire format: `hex(salt) + "-" + hex(nonce) + "-" + hex(ciphertext)`.
//!
//! An envelope is the serialized (salt, nonce, ciphertext) triple stored
//! as a secret version's payload.  Embedding the salt and nonce makes
//! decryption self-contained: nothing but the passphrase is needed to
//! read an envelope back.
//!
//! The format is strict — exactly two ASCII hyphens, every segment valid
//! hexadecimal, salt and nonce segments exactly 16 bytes each.  Anything
//! else fails with `EnvelopeMalformed` rather than silently truncating.

use crate::crypto::{NONCE_LEN, SALT_LEN};
use crate::errors::{CloudVaultError, Result};

/// A decoded (salt, nonce, ciphertext) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// The salt the encryption key was derived from.
    pub salt: [u8; SALT_LEN],

    /// The AES-GCM nonce used for this envelope.
    pub nonce: [u8; NONCE_LEN],

    /// The ciphertext, authentication tag included.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Serialize into the hyphen-separated hex transport string.
    pub fn encode(&self) -> String {
        format!(
            "{}-{}-{}",
            hex::encode(self.salt),
            hex::encode(self.nonce),
            hex::encode(&self.ciphertext)
        )
    }

    /// Parse a transport string back into its three parts.
    pub fn decode(encoded: &str) -> Result<Self> {
        let segments: Vec<&str> = encoded.split('-').collect();
        if segments.len() != 3 {
            return Err(CloudVaultError::EnvelopeMalformed(format!(
                "expected 3 hyphen-separated segments, got {}",
                segments.len()
            )));
        }

        let salt_bytes = decode_segment(segments[0], "salt")?;
        let nonce_bytes = decode_segment(segments[1], "nonce")?;
        let ciphertext = decode_segment(segments[2], "ciphertext")?;

        let salt: [u8; SALT_LEN] = salt_bytes.as_slice().try_into().map_err(|_| {
            CloudVaultError::EnvelopeMalformed(format!(
                "salt must be {SALT_LEN} bytes, got {}",
                salt_bytes.len()
            ))
        })?;

        let nonce: [u8; NONCE_LEN] = nonce_bytes.as_slice().try_into().map_err(|_| {
            CloudVaultError::EnvelopeMalformed(format!(
                "nonce must be {NONCE_LEN} bytes, got {}",
                nonce_bytes.len()
            ))
        })?;

        Ok(Self {
            salt,
            nonce,
            ciphertext,
        })
    }
}

/// Hex-decode one segment, naming it in the error on failure.
fn decode_segment(segment: &str, field: &str) -> Result<Vec<u8>> {
    hex::decode(segment)
        .map_err(|e| CloudVaultError::EnvelopeMalformed(format!("{field} is not valid hex: {e}")))
}
