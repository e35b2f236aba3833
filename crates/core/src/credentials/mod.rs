//! Provider credentials.
//!
//! Credentials are loaded once when a [`KeyRing`] is opened, held in memory,
//! and written back to their [`CredentialStore`] on every change. The
//! pipeline core only reads them, as an input to model invocation.

pub mod error;
pub mod store;

pub use error::{CredentialError, CredentialResult};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};

use ar_protocol::Provider;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Provider to secret map.
///
/// Empty secrets are treated as absent. `Debug` lists providers only.
/// Serialized as an object keyed by credential key (`"openai"`, ...);
/// entries whose key names no credentialed provider are dropped with a
/// warning when read.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials(BTreeMap<Provider, String>);

impl Credentials {
    /// The secret for `provider`, if one is set and non-empty.
    pub fn get(&self, provider: Provider) -> Option<&str> {
        self.0
            .get(&provider)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn has(&self, provider: Provider) -> bool {
        self.get(provider).is_some()
    }

    /// Set the secret for `provider`. `Unknown` has no slot and is ignored.
    pub fn set(&mut self, provider: Provider, secret: impl Into<String>) {
        if provider.credential_key().is_some() {
            self.0.insert(provider, secret.into());
        }
    }

    pub fn remove(&mut self, provider: Provider) -> Option<String> {
        self.0.remove(&provider)
    }

    pub fn is_empty(&self) -> bool {
        !self.0.values().any(|s| !s.is_empty())
    }

    /// Providers with a non-empty secret.
    pub fn providers(&self) -> impl Iterator<Item = Provider> + '_ {
        self.0
            .iter()
            .filter(|(_, secret)| !secret.is_empty())
            .map(|(provider, _)| *provider)
    }
}

impl Serialize for Credentials {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().filter_map(|(provider, secret)| {
            provider.credential_key().map(|key| (key, secret))
        }))
    }
}

impl<'de> Deserialize<'de> for Credentials {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;

        let mut credentials = Self::default();
        for (key, secret) in raw {
            match key.parse::<Provider>() {
                Ok(provider) => credentials.set(provider, secret),
                Err(e) => tracing::warn!("ignoring stored credential: {}", e),
            }
        }
        Ok(credentials)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.providers()).finish()
    }
}

/// In-memory credentials backed by a store, written through on change.
pub struct KeyRing {
    credentials: Credentials,
    store: Box<dyn CredentialStore>,
}

impl KeyRing {
    /// Load credentials from `store`.
    ///
    /// A store whose content cannot be parsed is treated as empty, so the
    /// next change rewrites it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read.
    pub fn open(store: Box<dyn CredentialStore>) -> CredentialResult<Self> {
        let credentials = match store.load() {
            Ok(credentials) => credentials,
            Err(CredentialError::Parse { path, source }) => {
                tracing::warn!(
                    "ignoring unreadable credentials at {}: {}",
                    path.display(),
                    source
                );
                Credentials::default()
            }
            Err(e) => return Err(e),
        };
        Ok(Self { credentials, store })
    }

    /// A key ring with no persisted state.
    pub fn in_memory() -> Self {
        Self {
            credentials: Credentials::default(),
            store: Box::new(MemoryCredentialStore::default()),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Set the secret for `provider` and persist. An empty secret clears it.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails; the in-memory value is updated
    /// regardless.
    pub fn set(&mut self, provider: Provider, secret: impl Into<String>) -> CredentialResult<()> {
        let secret = secret.into();
        if secret.is_empty() {
            self.credentials.remove(provider);
        } else {
            self.credentials.set(provider, secret);
        }
        self.store.save(&self.credentials)
    }

    /// Clear the secret for `provider` and persist.
    pub fn unset(&mut self, provider: Provider) -> CredentialResult<()> {
        self.credentials.remove(provider);
        self.store.save(&self.credentials)
    }
}

impl std::fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRing")
            .field("credentials", &self.credentials)
            .finish()
    }
}
