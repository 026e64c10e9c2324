//! Integration tests for the CloudVault store module, exercised against
//! the in-memory versioned backend.

use cloudvault::backend::{InMemoryBackend, VersionedSecretBackend};
use cloudvault::compress::{compress_transport, decompress_transport};
use cloudvault::config::{SecretRole, Settings};
use cloudvault::envelope::Envelope;
use cloudvault::errors::CloudVaultError;
use cloudvault::store::SecretStore;
use serde_json::{json, Map, Value};

/// Helper: settings pointing at the `app-secret` resource.
fn settings(passphrase: &str) -> Settings {
    Settings {
        project_id: "test-project".to_string(),
        secret_base_name: "app".to_string(),
        version: "latest".to_string(),
        passphrase: passphrase.to_string(),
    }
}

/// Helper: a store borrowing `backend` so tests can inspect it.
fn store<'a>(backend: &'a InMemoryBackend, passphrase: &str) -> SecretStore<&'a InMemoryBackend> {
    SecretStore::new(backend, &settings(passphrase), SecretRole::Secrets)
}

fn mapping(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Self-healing bootstrap
// ---------------------------------------------------------------------------

#[test]
fn first_read_bootstraps_an_empty_mapping() {
    let backend = InMemoryBackend::new();
    let store = store(&backend, "pw");

    let snapshot = store.all().expect("bootstrap read");
    assert!(snapshot.is_empty());

    // The heal path created the resource and wrote one encrypted version.
    assert!(backend.resource_exists("app-secret"));
    assert_eq!(backend.version_count("app-secret"), 1);
}

#[test]
fn second_read_does_not_rebootstrap() {
    let backend = InMemoryBackend::new();
    let store = store(&backend, "pw");

    assert!(store.all().unwrap().is_empty());
    assert!(store.all().unwrap().is_empty());

    // Still exactly the one bootstrap version — no second heal.
    assert_eq!(backend.version_count("app-secret"), 1);
}

#[test]
fn pinned_missing_version_fails_after_single_heal() {
    let backend = InMemoryBackend::new();
    let pinned = Settings {
        version: "5".to_string(),
        ..settings("pw")
    };
    let store = SecretStore::new(&backend, &pinned, SecretRole::Secrets);

    // The pinned version still does not exist after heal, so the second
    // fetch propagates instead of looping.
    let err = store.all().unwrap_err();
    assert!(matches!(err, CloudVaultError::ResourceNotFound(_)));

    // Exactly one heal attempt happened: resource created, one
    // bootstrap version written, no further retries.
    assert!(backend.resource_exists("app-secret"));
    assert_eq!(backend.version_count("app-secret"), 1);
}

#[test]
fn delete_then_read_reheals() {
    let backend = InMemoryBackend::new();
    let store = store(&backend, "pw");

    store.set_all(mapping(&[("a", json!(1))])).unwrap();
    store.delete().unwrap();
    assert!(!backend.resource_exists("app-secret"));

    // The next read bootstraps from scratch: empty again.
    assert!(store.all().unwrap().is_empty());
    assert!(backend.resource_exists("app-secret"));
}

#[test]
fn delete_of_missing_resource_is_ignored() {
    let backend = InMemoryBackend::new();
    let store = store(&backend, "pw");
    store.delete().expect("missing resource is not an error");
}

// ---------------------------------------------------------------------------
// Write semantics
// ---------------------------------------------------------------------------

#[test]
fn set_then_all_roundtrip() {
    let backend = InMemoryBackend::new();
    let store = store(&backend, "pw");

    assert!(store.set("db_password", json!("hunter2")).unwrap());

    let snapshot = store.all().unwrap();
    assert_eq!(snapshot.get("db_password"), Some(&json!("hunter2")));
}

#[test]
fn set_merges_into_existing_mapping() {
    let backend = InMemoryBackend::new();
    let store = store(&backend, "pw");

    store.set_all(mapping(&[("a", json!(1))])).unwrap();
    store.set("b", json!(2)).unwrap();

    let snapshot = store.all().unwrap();
    assert_eq!(snapshot.get("a"), Some(&json!(1)));
    assert_eq!(snapshot.get("b"), Some(&json!(2)));
    assert_eq!(snapshot.len(), 2);
}

#[test]
fn set_all_is_a_full_overwrite() {
    let backend = InMemoryBackend::new();
    let store = store(&backend, "pw");

    store.set_all(mapping(&[("a", json!(1))])).unwrap();
    store.set_all(mapping(&[("b", json!(2))])).unwrap();

    let snapshot = store.all().unwrap();
    assert_eq!(snapshot.get("b"), Some(&json!(2)));
    assert!(!snapshot.contains_key("a"), "full overwrite drops old keys");
}

#[test]
fn every_write_appends_a_new_version() {
    let backend = InMemoryBackend::new();
    let store = store(&backend, "pw");

    // set() heals first (version 1), then writes (version 2).
    store.set("a", json!(1)).unwrap();
    store.set("b", json!(2)).unwrap();

    assert_eq!(backend.version_count("app-secret"), 3);
}

#[test]
fn prior_versions_remain_retrievable_by_id() {
    let backend = InMemoryBackend::new();
    let writer = store(&backend, "pw");

    writer.set_all(mapping(&[("a", json!(1))])).unwrap();
    writer.set_all(mapping(&[("b", json!(2))])).unwrap();

    // A reader pinned to version 1 sees the historical snapshot.
    let pinned = Settings {
        version: "1".to_string(),
        ..settings("pw")
    };
    let reader = SecretStore::new(&backend, &pinned, SecretRole::Secrets);
    let snapshot = reader.all().unwrap();
    assert_eq!(snapshot.get("a"), Some(&json!(1)));
    assert!(!snapshot.contains_key("b"));
}

#[test]
fn structured_values_roundtrip() {
    let backend = InMemoryBackend::new();
    let store = store(&backend, "pw");

    let value = json!({ "hosts": ["ldap1", "ldap2"], "port": 1636 });
    store.set("ldap", value.clone()).unwrap();
    assert_eq!(store.all().unwrap().get("ldap"), Some(&value));
}

// ---------------------------------------------------------------------------
// get() and falsy fallback
// ---------------------------------------------------------------------------

#[test]
fn get_returns_stored_value_or_default() {
    let backend = InMemoryBackend::new();
    let store = store(&backend, "pw");

    store.set("host", json!("ldap.internal")).unwrap();
    assert_eq!(
        store.get("host", json!("fallback")).unwrap(),
        json!("ldap.internal")
    );
    assert_eq!(
        store.get("missing", json!("fallback")).unwrap(),
        json!("fallback")
    );
}

#[test]
fn get_treats_falsy_values_as_absent() {
    // Documented leak: a stored empty string or zero is
    // indistinguishable from a missing key.
    let backend = InMemoryBackend::new();
    let store = store(&backend, "pw");

    store.set("empty", json!("")).unwrap();
    store.set("zero", json!(0)).unwrap();

    assert_eq!(store.get("empty", json!("d")).unwrap(), json!("d"));
    assert_eq!(store.get("zero", json!(42)).unwrap(), json!(42));
}

// ---------------------------------------------------------------------------
// Failure surfaces
// ---------------------------------------------------------------------------

#[test]
fn wrong_passphrase_is_authentication_failure() {
    let backend = InMemoryBackend::new();
    let writer = store(&backend, "alpha");
    writer.set_all(mapping(&[("a", json!(1))])).unwrap();

    let reader = store(&backend, "beta");
    let err = reader.all().unwrap_err();
    assert!(matches!(err, CloudVaultError::AuthenticationFailure));
}

#[test]
fn tampered_ciphertext_is_authentication_failure() {
    let backend = InMemoryBackend::new();
    let store = store(&backend, "pw");
    store.set_all(mapping(&[("a", json!(1))])).unwrap();

    // Pull the stored payload apart, flip one ciphertext byte, and put
    // it back as a newer version.
    let payload = backend.access_version("app-secret", "latest").unwrap();
    let encoded = decompress_transport(&payload).unwrap();
    let mut envelope = Envelope::decode(&encoded).unwrap();
    envelope.ciphertext[0] ^= 0x01;
    let tampered = compress_transport(&envelope.encode()).unwrap();
    backend.add_version("app-secret", &tampered).unwrap();

    let err = store.all().unwrap_err();
    assert!(matches!(err, CloudVaultError::AuthenticationFailure));
}

#[test]
fn payload_without_separators_is_malformed() {
    let backend = InMemoryBackend::new();
    let store = store(&backend, "pw");

    backend.create_if_absent("app-secret").unwrap();
    let payload = compress_transport("deadbeef").unwrap();
    backend.add_version("app-secret", &payload).unwrap();

    let err = store.all().unwrap_err();
    assert!(matches!(err, CloudVaultError::EnvelopeMalformed(_)));
}

#[test]
fn garbage_payload_is_malformed_not_a_panic() {
    let backend = InMemoryBackend::new();
    let store = store(&backend, "pw");

    backend.create_if_absent("app-secret").unwrap();
    backend.add_version("app-secret", b"not even zlib").unwrap();

    let err = store.all().unwrap_err();
    assert!(matches!(err, CloudVaultError::EnvelopeMalformed(_)));
}

// ---------------------------------------------------------------------------
// Resource naming
// ---------------------------------------------------------------------------

#[test]
fn role_selects_the_resource_suffix() {
    let backend = InMemoryBackend::new();
    let secrets = SecretStore::new(&backend, &settings("pw"), SecretRole::Secrets);
    let config = SecretStore::new(&backend, &settings("pw"), SecretRole::Configuration);

    secrets.set("a", json!(1)).unwrap();
    config.set("b", json!(2)).unwrap();

    assert!(backend.resource_exists("app-secret"));
    assert!(backend.resource_exists("app-configuration"));
    assert_eq!(secrets.resource_name(), "app-secret");
    assert_eq!(config.resource_name(), "app-configuration");
}
