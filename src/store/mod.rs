//! High-level store operations built on a versioned backend.

pub mod secret_store;

pub use secret_store::SecretStore;

use serde_json::{Map, Value};

use crate::errors::Result;

/// Common capability contract every configuration/secret store satisfies.
///
/// The encrypted `SecretStore` implements it here; the unencrypted
/// Consul-backed adapter implements the same three operations on its
/// side of the fence.
pub trait KeyValueStore {
    /// Value for `key`, or `default` when absent (or stored falsy).
    fn get(&self, key: &str, default: Value) -> Result<Value>;

    /// Set a single key, keeping every other stored key.
    fn set(&self, key: &str, value: Value) -> Result<bool>;

    /// The full key/value mapping.
    fn all(&self) -> Result<Map<String, Value>>;
}
