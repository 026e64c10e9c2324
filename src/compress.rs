//! Dual-stage zlib compression.
//!
//! Two independent stages, deliberately kept as separate function pairs
//! so either can change format without touching the other:
//!
//! - **Snapshot stage** — applied to the JSON plaintext *before*
//!   encryption, while the bytes are still compressible.  Ciphertext is
//!   indistinguishable from random and would not shrink.
//! - **Transport stage** — applied to the hex-encoded envelope string
//!   before it is handed to the backend as a version payload, clawing
//!   back the 2x blow-up from hex encoding.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::errors::{CloudVaultError, Result};

/// Compress a plaintext snapshot before encryption.
pub fn compress_snapshot(plaintext: &[u8]) -> Result<Vec<u8>> {
    deflate(plaintext)
}

/// Decompress a plaintext snapshot after decryption.
///
/// The input was authenticated by AES-GCM before it reaches this stage,
/// so a failure here means the writer produced a bad snapshot.
pub fn decompress_snapshot(compressed: &[u8]) -> Result<Vec<u8>> {
    inflate(compressed)
        .map_err(|e| CloudVaultError::SerializationError(format!("snapshot decompression: {e}")))
}

/// Compress an encoded envelope string into the backend payload.
pub fn compress_transport(envelope: &str) -> Result<Vec<u8>> {
    deflate(envelope.as_bytes())
}

/// Decompress a backend payload back into the encoded envelope string.
///
/// Payload bytes come straight from the backend, so corruption here is a
/// wire-format problem and surfaces as `EnvelopeMalformed`.
pub fn decompress_transport(payload: &[u8]) -> Result<String> {
    let bytes = inflate(payload)
        .map_err(|e| CloudVaultError::EnvelopeMalformed(format!("transport decompression: {e}")))?;

    String::from_utf8(bytes).map_err(|_| {
        CloudVaultError::EnvelopeMalformed("transport payload is not valid UTF-8".into())
    })
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn inflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_roundtrip() {
        let data = br#"{"admin_password":"s3cret","ldap_bind_dn":"cn=directory"}"#;
        let compressed = compress_snapshot(data).unwrap();
        assert_eq!(decompress_snapshot(&compressed).unwrap(), data);
    }

    #[test]
    fn transport_roundtrip() {
        let envelope = "aabb-ccdd-eeff";
        let payload = compress_transport(envelope).unwrap();
        assert_eq!(decompress_transport(&payload).unwrap(), envelope);
    }

    #[test]
    fn repetitive_snapshot_shrinks() {
        let data = vec![b'a'; 4096];
        let compressed = compress_snapshot(&data).unwrap();
        assert!(compressed.len() < data.len());
    }

    #[test]
    fn corrupt_transport_payload_is_malformed() {
        let err = decompress_transport(b"not zlib data").unwrap_err();
        assert!(matches!(err, CloudVaultError::EnvelopeMalformed(_)));
    }
}
