//! Versioned secret resource backends.
//!
//! A backend stores named resources whose payloads are immutable,
//! append-only versions.  There is no in-place mutation: every write
//! creates a new version, and `"latest"` is an alias the backend itself
//! resolves.

pub mod google;
pub mod memory;

pub use google::GoogleSecretManager;
pub use memory::InMemoryBackend;

use crate::errors::Result;

/// Remote resource abstraction the `SecretStore` is built on.
pub trait VersionedSecretBackend {
    /// Create the named resource if it does not exist yet.
    ///
    /// Returns `true` when creation occurred.  A pre-existing resource
    /// is not an error — it is logged and reported as `Ok(false)`, which
    /// keeps concurrent bootstrap idempotent.
    fn create_if_absent(&self, name: &str) -> Result<bool>;

    /// Append a new immutable version holding `payload`.
    ///
    /// Returns the backend-assigned version id.
    fn add_version(&self, name: &str, payload: &[u8]) -> Result<String>;

    /// Fetch the payload of a version.
    ///
    /// `version` is either a version id or the `"latest"` alias.  A
    /// missing resource or version fails with `ResourceNotFound`.
    fn access_version(&self, name: &str, version: &str) -> Result<Vec<u8>>;

    /// Delete the resource and every version it holds.
    fn delete(&self, name: &str) -> Result<()>;
}

// A shared backend reference is itself a backend, so one backend can
// serve several stores (or a store plus test assertions).
impl<B: VersionedSecretBackend + ?Sized> VersionedSecretBackend for &B {
    fn create_if_absent(&self, name: &str) -> Result<bool> {
        (**self).create_if_absent(name)
    }

    fn add_version(&self, name: &str, payload: &[u8]) -> Result<String> {
        (**self).add_version(name, payload)
    }

    fn access_version(&self, name: &str, version: &str) -> Result<Vec<u8>> {
        (**self).access_version(name, version)
    }

    fn delete(&self, name: &str) -> Result<()> {
        (**self).delete(name)
    }
}
