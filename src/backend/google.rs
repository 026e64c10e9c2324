//! Google Secret Manager backend over its REST surface.
//!
//! Speaks the `v1` HTTP API directly with a blocking client and a
//! bearer token.  Retry/backoff is left to the caller; this layer only
//! maps HTTP outcomes onto the backend error taxonomy:
//!
//! - 404 → `ResourceNotFound`
//! - 409 → `ResourceAlreadyExists` (absorbed by `create_if_absent`)
//! - anything else non-2xx, or a transport failure → `BackendUnavailable`

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use super::VersionedSecretBackend;
use crate::errors::{CloudVaultError, Result};

/// Default API endpoint.
const DEFAULT_BASE_URL: &str = "https://secretmanager.googleapis.com/v1";

/// Environment variable holding the OAuth2 bearer token.
const ENV_AUTH_TOKEN: &str = "CLOUDVAULT_AUTH_TOKEN";

/// Blocking Secret Manager client scoped to one project.
pub struct GoogleSecretManager {
    http: Client,
    base_url: String,
    project_id: String,
    token: String,
}

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct VersionResource {
    /// Full resource name, e.g. `projects/p/secrets/s/versions/3`.
    name: String,
}

#[derive(Deserialize)]
struct AccessResponse {
    payload: VersionPayload,
}

#[derive(Deserialize)]
struct VersionPayload {
    /// Base64-encoded payload bytes.
    data: String,
}

// ── Implementation ───────────────────────────────────────────────────

impl GoogleSecretManager {
    /// Create a client for `project_id` authenticating with `token`.
    pub fn new(project_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: project_id.into(),
            token: token.into(),
        }
    }

    /// Create a client reading the bearer token from `CLOUDVAULT_AUTH_TOKEN`.
    pub fn from_env(project_id: impl Into<String>) -> Result<Self> {
        let token = std::env::var(ENV_AUTH_TOKEN).map_err(|_| {
            CloudVaultError::ConfigError(format!("{ENV_AUTH_TOKEN} environment variable not set"))
        })?;
        Ok(Self::new(project_id, token))
    }

    /// Override the API endpoint (emulators, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn secret_url(&self, name: &str) -> String {
        format!(
            "{}/projects/{}/secrets/{name}",
            self.base_url, self.project_id
        )
    }

    /// Send a request, mapping transport failures to `BackendUnavailable`.
    fn send(&self, request: reqwest::blocking::RequestBuilder) -> Result<Response> {
        request
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| CloudVaultError::BackendUnavailable(e.to_string()))
    }

    /// Map a non-2xx response onto the error taxonomy.
    fn status_error(name: &str, response: Response) -> CloudVaultError {
        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => CloudVaultError::ResourceNotFound(name.to_string()),
            StatusCode::CONFLICT => CloudVaultError::ResourceAlreadyExists(name.to_string()),
            _ => {
                let body = response.text().unwrap_or_default();
                CloudVaultError::BackendUnavailable(format!("HTTP {status}: {body}"))
            }
        }
    }
}

impl VersionedSecretBackend for GoogleSecretManager {
    fn create_if_absent(&self, name: &str) -> Result<bool> {
        let url = format!(
            "{}/projects/{}/secrets?secretId={name}",
            self.base_url, self.project_id
        );
        let body = serde_json::json!({ "replication": { "automatic": {} } });

        let response = self.send(self.http.post(url).json(&body))?;
        if response.status().is_success() {
            info!(secret = name, "created secret resource");
            return Ok(true);
        }

        match Self::status_error(name, response) {
            CloudVaultError::ResourceAlreadyExists(_) => {
                info!(
                    secret = name,
                    "secret resource already exists, a new version will be appended"
                );
                Ok(false)
            }
            other => Err(other),
        }
    }

    fn add_version(&self, name: &str, payload: &[u8]) -> Result<String> {
        let url = format!("{}:addVersion", self.secret_url(name));
        let body = serde_json::json!({ "payload": { "data": BASE64.encode(payload) } });

        let response = self.send(self.http.post(url).json(&body))?;
        if !response.status().is_success() {
            return Err(Self::status_error(name, response));
        }

        let version: VersionResource = response
            .json()
            .map_err(|e| CloudVaultError::BackendUnavailable(format!("bad response body: {e}")))?;

        // The API returns the full resource name; keep just the version id.
        let version_id = version
            .name
            .rsplit('/')
            .next()
            .unwrap_or(&version.name)
            .to_string();
        info!(secret = name, version = %version_id, "added secret version");
        Ok(version_id)
    }

    fn access_version(&self, name: &str, version: &str) -> Result<Vec<u8>> {
        let url = format!("{}/versions/{version}:access", self.secret_url(name));

        let response = self.send(self.http.get(url))?;
        if !response.status().is_success() {
            return Err(Self::status_error(name, response));
        }

        let access: AccessResponse = response
            .json()
            .map_err(|e| CloudVaultError::BackendUnavailable(format!("bad response body: {e}")))?;

        let payload = BASE64.decode(access.payload.data).map_err(|e| {
            CloudVaultError::BackendUnavailable(format!("payload is not valid base64: {e}"))
        })?;
        debug!(
            secret = name,
            version, "accessed secret version ({} bytes)",
            payload.len()
        );
        Ok(payload)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let response = self.send(self.http.delete(self.secret_url(name)))?;
        if !response.status().is_success() {
            return Err(Self::status_error(name, response));
        }
        info!(secret = name, "deleted secret resource");
        Ok(())
    }
}
