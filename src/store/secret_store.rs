//! The encrypted, versioned secret store orchestrator.
//!
//! `SecretStore` ties the crypto pipeline and the versioned backend
//! together.  A write serializes the *entire* key/value snapshot,
//! compresses it, encrypts it under a freshly derived key, and appends
//! the result as one new immutable version.  A read fetches a version,
//! re-derives the key from the salt embedded in the envelope, and
//! reverses the pipeline.
//!
//! Updates are read-modify-write with no optimistic locking: concurrent
//! writers race and the last appended version wins, silently discarding
//! the other writer's change.  Callers that need stronger guarantees
//! must coordinate externally.

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::backend::VersionedSecretBackend;
use crate::compress::{
    compress_snapshot, compress_transport, decompress_snapshot, decompress_transport,
};
use crate::config::{SecretRole, Settings};
use crate::crypto::{decrypt, derive_key, encrypt, generate_nonce, generate_salt};
use crate::envelope::Envelope;
use crate::errors::{CloudVaultError, Result};

use super::KeyValueStore;

/// Encrypted key/value store backed by a versioned secret resource.
pub struct SecretStore<B: VersionedSecretBackend> {
    backend: B,
    resource_name: String,
    version: String,
    passphrase: String,
}

impl<B: VersionedSecretBackend> SecretStore<B> {
    /// Create a store for the resource `settings` + `role` select.
    pub fn new(backend: B, settings: &Settings, role: SecretRole) -> Self {
        Self {
            backend,
            resource_name: settings.resource_name(role),
            version: settings.version.clone(),
            passphrase: settings.passphrase.clone(),
        }
    }

    /// Name of the backing secret resource.
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    // ------------------------------------------------------------------
    // Read path
    // ------------------------------------------------------------------

    /// Fetch and decrypt the full key/value mapping.
    ///
    /// Self-healing bootstrap: when the resource (or its first version)
    /// does not exist yet, an encrypted empty mapping is written and the
    /// fetch is retried exactly once.  A second `ResourceNotFound` after
    /// that indicates a backend inconsistency and propagates — the heal
    /// loop never runs unbounded.  An empty mapping is only ever
    /// returned through this path, never as a mask for a later failure.
    pub fn all(&self) -> Result<Map<String, Value>> {
        match self.fetch_snapshot() {
            Ok(snapshot) => Ok(snapshot),
            Err(CloudVaultError::ResourceNotFound(_)) => {
                warn!(
                    secret = %self.resource_name,
                    "secret resource or version missing, bootstrapping an empty mapping"
                );
                self.backend.create_if_absent(&self.resource_name)?;
                let payload = self.seal(&Map::new())?;
                self.backend.add_version(&self.resource_name, &payload)?;
                self.fetch_snapshot()
            }
            Err(e) => Err(e),
        }
    }

    /// Value for `key`, or `default` when absent.
    ///
    /// A stored falsy value (null, false, 0, empty string/array/object)
    /// also falls through to `default` — it is indistinguishable from an
    /// absent key.  This is a deliberate, compatibility-preserving leak
    /// in the abstraction; callers storing legitimate zero/empty values
    /// must use `all()` instead.
    pub fn get(&self, key: &str, default: Value) -> Result<Value> {
        let snapshot = self.all()?;
        Ok(match snapshot.get(key) {
            Some(value) if !is_falsy(value) => value.clone(),
            _ => default,
        })
    }

    // ------------------------------------------------------------------
    // Write path
    // ------------------------------------------------------------------

    /// Set a single key, re-writing the full mapping as one new version.
    ///
    /// Read-modify-write: fetches the current mapping (healing if
    /// needed), overwrites `key`, and appends the whole mapping.
    pub fn set(&self, key: &str, value: Value) -> Result<bool> {
        let mut snapshot = self.all()?;
        snapshot.insert(key.to_string(), value);
        self.write_snapshot(&snapshot)
    }

    /// Replace the entire mapping outright.
    ///
    /// A full overwrite, not a merge: keys previously stored but absent
    /// from `snapshot` are gone after this call.
    pub fn set_all(&self, snapshot: Map<String, Value>) -> Result<bool> {
        self.write_snapshot(&snapshot)
    }

    /// Delete the backing resource and all its versions.
    ///
    /// A missing resource is logged and ignored.  The next `all()` call
    /// re-triggers the bootstrap path.
    pub fn delete(&self) -> Result<()> {
        match self.backend.delete(&self.resource_name) {
            Err(CloudVaultError::ResourceNotFound(_)) => {
                warn!(
                    secret = %self.resource_name,
                    "secret resource does not exist, nothing to delete"
                );
                Ok(())
            }
            other => other,
        }
    }

    // ------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------

    fn fetch_snapshot(&self) -> Result<Map<String, Value>> {
        let payload = self
            .backend
            .access_version(&self.resource_name, &self.version)?;
        info!(
            secret = %self.resource_name,
            version = %self.version,
            "secret found, accessing version ({} bytes)",
            payload.len()
        );
        self.unseal(&payload)
    }

    /// Ensure the resource exists, then append the snapshot as one
    /// new encrypted version.  Creation races (`AlreadyExists`) are
    /// absorbed inside `create_if_absent`; concurrent `add_version`
    /// calls resolve last-write-wins.
    fn write_snapshot(&self, snapshot: &Map<String, Value>) -> Result<bool> {
        self.backend.create_if_absent(&self.resource_name)?;
        let payload = self.seal(snapshot)?;
        self.backend.add_version(&self.resource_name, &payload)?;
        Ok(true)
    }

    /// Write side of the pipeline: JSON → snapshot compress → encrypt
    /// under a fresh salt + nonce → envelope encode → transport compress.
    ///
    /// Key derivation here always starts from a freshly generated salt;
    /// the decrypt side re-derives from the embedded salt.  The two
    /// paths are intentionally separate — no key is cached between them.
    fn seal(&self, snapshot: &Map<String, Value>) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(snapshot)
            .map_err(|e| CloudVaultError::SerializationError(format!("snapshot: {e}")))?;
        let compressed = compress_snapshot(&json)?;

        let salt = generate_salt();
        let nonce = generate_nonce();
        let key = derive_key(&self.passphrase, &salt);
        let ciphertext = encrypt(&*key, &nonce, &compressed)?;

        let envelope = Envelope {
            salt,
            nonce,
            ciphertext,
        };
        let payload = compress_transport(&envelope.encode())?;
        debug!(
            secret = %self.resource_name,
            "sealed snapshot payload ({} bytes)",
            payload.len()
        );
        Ok(payload)
    }

    /// Read side: transport decompress → envelope decode → re-derive key
    /// from the embedded salt → decrypt → snapshot decompress → JSON.
    fn unseal(&self, payload: &[u8]) -> Result<Map<String, Value>> {
        let encoded = decompress_transport(payload)?;
        let envelope = Envelope::decode(&encoded)?;

        let key = derive_key(&self.passphrase, &envelope.salt);
        let compressed = decrypt(&*key, &envelope.nonce, &envelope.ciphertext)?;

        let json = decompress_snapshot(&compressed)?;
        serde_json::from_slice(&json)
            .map_err(|e| CloudVaultError::SerializationError(format!("snapshot: {e}")))
    }
}

impl<B: VersionedSecretBackend> KeyValueStore for SecretStore<B> {
    fn get(&self, key: &str, default: Value) -> Result<Value> {
        SecretStore::get(self, key, default)
    }

    fn set(&self, key: &str, value: Value) -> Result<bool> {
        SecretStore::set(self, key, value)
    }

    fn all(&self) -> Result<Map<String, Value>> {
        SecretStore::all(self)
    }
}

/// Python-style truthiness over JSON values.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falsy_values() {
        assert!(is_falsy(&Value::Null));
        assert!(is_falsy(&serde_json::json!(false)));
        assert!(is_falsy(&serde_json::json!(0)));
        assert!(is_falsy(&serde_json::json!("")));
        assert!(is_falsy(&serde_json::json!([])));
        assert!(is_falsy(&serde_json::json!({})));
    }

    #[test]
    fn truthy_values() {
        assert!(!is_falsy(&serde_json::json!(true)));
        assert!(!is_falsy(&serde_json::json!(1)));
        assert!(!is_falsy(&serde_json::json!("x")));
        assert!(!is_falsy(&serde_json::json!([0])));
    }
}
