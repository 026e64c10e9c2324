//! In-process versioned backend with the same semantics as the remote
//! service: append-only version lists per resource, 1-based version ids,
//! and a backend-resolved `"latest"` alias.
//!
//! Used by the test suite and for local development without cloud
//! credentials.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::info;

use super::VersionedSecretBackend;
use crate::errors::{CloudVaultError, Result};

/// Alias resolved to the newest version.
const LATEST: &str = "latest";

#[derive(Default)]
pub struct InMemoryBackend {
    resources: Mutex<HashMap<String, Vec<Vec<u8>>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the named resource exists (created, possibly zero versions).
    pub fn resource_exists(&self, name: &str) -> bool {
        self.resources.lock().expect("lock poisoned").contains_key(name)
    }

    /// Number of versions the named resource holds.
    pub fn version_count(&self, name: &str) -> usize {
        self.resources
            .lock()
            .expect("lock poisoned")
            .get(name)
            .map_or(0, Vec::len)
    }
}

impl VersionedSecretBackend for InMemoryBackend {
    fn create_if_absent(&self, name: &str) -> Result<bool> {
        let mut resources = self.resources.lock().expect("lock poisoned");
        if resources.contains_key(name) {
            info!(secret = name, "secret resource already exists");
            return Ok(false);
        }
        resources.insert(name.to_string(), Vec::new());
        info!(secret = name, "created secret resource");
        Ok(true)
    }

    fn add_version(&self, name: &str, payload: &[u8]) -> Result<String> {
        let mut resources = self.resources.lock().expect("lock poisoned");
        let versions = resources
            .get_mut(name)
            .ok_or_else(|| CloudVaultError::ResourceNotFound(name.to_string()))?;
        versions.push(payload.to_vec());
        Ok(versions.len().to_string())
    }

    fn access_version(&self, name: &str, version: &str) -> Result<Vec<u8>> {
        let resources = self.resources.lock().expect("lock poisoned");
        let versions = resources
            .get(name)
            .ok_or_else(|| CloudVaultError::ResourceNotFound(name.to_string()))?;

        let payload = if version == LATEST {
            versions.last()
        } else {
            version
                .parse::<usize>()
                .ok()
                .filter(|&id| id >= 1)
                .and_then(|id| versions.get(id - 1))
        };

        payload
            .cloned()
            .ok_or_else(|| CloudVaultError::ResourceNotFound(name.to_string()))
    }

    fn delete(&self, name: &str) -> Result<()> {
        let mut resources = self.resources.lock().expect("lock poisoned");
        resources
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| CloudVaultError::ResourceNotFound(name.to_string()))
    }
}
