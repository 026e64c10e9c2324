//! Process-level configuration, read from environment variables.
//!
//! Every field has a sensible default so CloudVault works out-of-the-box
//! against a local backend; only the project id (and an auth token for
//! the Google backend) must be supplied in a real deployment.

use std::env;

use crate::errors::{CloudVaultError, Result};

/// Which of the two sibling resources a store operates on.
///
/// A deployment keeps secret material and plain configuration in two
/// separately named resources derived from the same base name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretRole {
    /// Secret material — resource name `<base>-secret`.
    Secrets,
    /// Configuration values — resource name `<base>-configuration`.
    Configuration,
}

impl SecretRole {
    /// Suffix appended to the configured base name.
    fn suffix(self) -> &'static str {
        match self {
            SecretRole::Secrets => "secret",
            SecretRole::Configuration => "configuration",
        }
    }
}

/// Settings for one `SecretStore` instance.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Project/account identifier in the remote backend.
    pub project_id: String,

    /// Base name the secret resource name is derived from.
    pub secret_base_name: String,

    /// Which version to read (a version id, or the `"latest"` alias).
    pub version: String,

    /// Passphrase the encryption key is derived from.  Read once at
    /// startup; never persisted.
    pub passphrase: String,
}

// ── Environment variable names ───────────────────────────────────────

const ENV_PROJECT_ID: &str = "CLOUDVAULT_PROJECT_ID";
const ENV_SECRET_NAME: &str = "CLOUDVAULT_SECRET_NAME";
const ENV_SECRET_VERSION: &str = "CLOUDVAULT_SECRET_VERSION";
const ENV_PASSPHRASE: &str = "CLOUDVAULT_PASSPHRASE";

// ── Defaults ─────────────────────────────────────────────────────────

fn default_secret_base_name() -> String {
    "identity".to_string()
}

fn default_version() -> String {
    "latest".to_string()
}

fn default_passphrase() -> String {
    "secret".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Settings {
    /// Load settings from the environment.
    ///
    /// `CLOUDVAULT_PROJECT_ID` is required; everything else falls back
    /// to a documented default.
    pub fn from_env() -> Result<Self> {
        let project_id = env::var(ENV_PROJECT_ID).map_err(|_| {
            CloudVaultError::ConfigError(format!("{ENV_PROJECT_ID} environment variable not set"))
        })?;

        Ok(Self {
            project_id,
            secret_base_name: env::var(ENV_SECRET_NAME)
                .unwrap_or_else(|_| default_secret_base_name()),
            version: env::var(ENV_SECRET_VERSION).unwrap_or_else(|_| default_version()),
            passphrase: env::var(ENV_PASSPHRASE).unwrap_or_else(|_| default_passphrase()),
        })
    }

    /// Full resource name for the given role, e.g. `identity-secret`.
    pub fn resource_name(&self, role: SecretRole) -> String {
        format!("{}-{}", self.secret_base_name, role.suffix())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
