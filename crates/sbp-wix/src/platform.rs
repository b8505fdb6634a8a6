//! Ports to the Wix side of the adapter.
//!
//! - [`SecretStore`]: the site's secret vault (privileged)
//! - [`SiteUrls`]: published site URL resolution
//! - [`EventSink`]: payment-provider transaction event submission
//!
//! The service binds these to the Wix REST API; the in-memory implementations
//! here back local runs and tests.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::SbpError;
use crate::payment::SubmitEventRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretInfo {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSecret {
    pub name: String,
    pub description: String,
    pub value: String,
}

impl fmt::Debug for NewSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewSecret")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretValue {
    pub value: String,
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue([REDACTED])")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteUrl {
    pub url: String,
    #[serde(default)]
    pub primary: bool,
}

/// Secret vault. Implementations must be thread-safe (`Send + Sync`).
pub trait SecretStore: Send + Sync {
    fn list_secret_info(&self) -> BoxFuture<'_, Result<Vec<SecretInfo>, SbpError>>;

    /// Create a secret, returning its id.
    fn create_secret<'a>(&'a self, secret: &'a NewSecret)
        -> BoxFuture<'a, Result<String, SbpError>>;

    fn update_secret<'a>(
        &'a self,
        id: &'a str,
        secret: &'a NewSecret,
    ) -> BoxFuture<'a, Result<(), SbpError>>;

    fn get_secret_value<'a>(&'a self, name: &'a str)
        -> BoxFuture<'a, Result<SecretValue, SbpError>>;
}

pub trait SiteUrls: Send + Sync {
    fn list_published_site_urls(&self) -> BoxFuture<'_, Result<Vec<SiteUrl>, SbpError>>;
}

pub trait EventSink: Send + Sync {
    fn submit_event<'a>(&'a self, event: &'a SubmitEventRequest)
        -> BoxFuture<'a, Result<(), SbpError>>;
}

/// Update the secret with the same name if one exists, otherwise create it.
///
/// Not atomic: two concurrent upserts of a missing secret can both create.
pub async fn upsert_secret(store: &dyn SecretStore, secret: &NewSecret) -> Result<(), SbpError> {
    let existing = store
        .list_secret_info()
        .await?
        .into_iter()
        .find(|info| info.name == secret.name);

    match existing {
        Some(info) => {
            tracing::debug!(secret = %secret.name, id = %info.id, "updating existing secret");
            store.update_secret(&info.id, secret).await
        }
        None => {
            let id = store.create_secret(secret).await?;
            tracing::debug!(secret = %secret.name, id = %id, "created secret");
            Ok(())
        }
    }
}

/// URL of the primary published site, if any.
pub fn primary_site_url(urls: &[SiteUrl]) -> Option<&str> {
    urls.iter().find(|u| u.primary).map(|u| u.url.as_str())
}

struct StoredSecret {
    name: String,
    value: String,
}

/// In-memory secret vault backed by DashMap. Lost on restart.
pub struct InMemorySecretStore {
    secrets: DashMap<String, StoredSecret>,
    next_id: AtomicU64,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self {
            secrets: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Seed a secret (e.g. the HMAC secret from the environment).
    pub fn with_secret(self, name: &str, value: &str) -> Self {
        self.insert(NewSecret {
            name: name.to_string(),
            description: String::new(),
            value: value.to_string(),
        });
        self
    }

    /// Number of stored secrets.
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    fn insert(&self, secret: NewSecret) -> String {
        let id = format!("secret-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        self.secrets.insert(
            id.clone(),
            StoredSecret {
                name: secret.name,
                value: secret.value,
            },
        );
        id
    }
}

impl Default for InMemorySecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for InMemorySecretStore {
    fn list_secret_info(&self) -> BoxFuture<'_, Result<Vec<SecretInfo>, SbpError>> {
        Box::pin(async move {
            let mut infos: Vec<SecretInfo> = self
                .secrets
                .iter()
                .map(|entry| SecretInfo {
                    id: entry.key().clone(),
                    name: entry.value().name.clone(),
                })
                .collect();
            infos.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(infos)
        })
    }

    fn create_secret<'a>(
        &'a self,
        secret: &'a NewSecret,
    ) -> BoxFuture<'a, Result<String, SbpError>> {
        Box::pin(async move { Ok(self.insert(secret.clone())) })
    }

    fn update_secret<'a>(
        &'a self,
        id: &'a str,
        secret: &'a NewSecret,
    ) -> BoxFuture<'a, Result<(), SbpError>> {
        Box::pin(async move {
            let mut stored = self
                .secrets
                .get_mut(id)
                .ok_or_else(|| SbpError::SecretStore(format!("no secret with id {id}")))?;
            stored.name = secret.name.clone();
            stored.value = secret.value.clone();
            Ok(())
        })
    }

    fn get_secret_value<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Result<SecretValue, SbpError>> {
        Box::pin(async move {
            self.secrets
                .iter()
                .find(|entry| entry.value().name == name)
                .map(|entry| SecretValue {
                    value: entry.value().value.clone(),
                })
                .ok_or_else(|| SbpError::SecretStore(format!("secret {name} not found")))
        })
    }
}

/// Fixed primary site URL.
#[derive(Debug, Clone)]
pub struct StaticSiteUrls {
    url: String,
}

impl StaticSiteUrls {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl SiteUrls for StaticSiteUrls {
    fn list_published_site_urls(&self) -> BoxFuture<'_, Result<Vec<SiteUrl>, SbpError>> {
        Box::pin(async move {
            Ok(vec![SiteUrl {
                url: self.url.clone(),
                primary: true,
            }])
        })
    }
}

/// Event sink that keeps every submitted event in memory.
#[derive(Default)]
pub struct InMemoryEventSink {
    events: Mutex<Vec<SubmitEventRequest>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events submitted so far.
    pub fn events(&self) -> Vec<SubmitEventRequest> {
        self.recorded().clone()
    }

    // A push never leaves the list half-written, so a poisoned lock still
    // guards complete data.
    fn recorded(&self) -> MutexGuard<'_, Vec<SubmitEventRequest>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSink for InMemoryEventSink {
    fn submit_event<'a>(
        &'a self,
        event: &'a SubmitEventRequest,
    ) -> BoxFuture<'a, Result<(), SbpError>> {
        Box::pin(async move {
            self.recorded().push(event.clone());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::TransactionEvent;

    fn secret(value: &str) -> NewSecret {
        NewSecret {
            name: "sbp_hmacSecret".to_string(),
            description: "SBP HMAC Secret".to_string(),
            value: value.to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_creates_then_updates() {
        let store = InMemorySecretStore::new();

        upsert_secret(&store, &secret("first")).await.unwrap();
        upsert_secret(&store, &secret("second")).await.unwrap();

        assert_eq!(store.len(), 1);
        let value = store.get_secret_value("sbp_hmacSecret").await.unwrap();
        assert_eq!(value.value, "second");
    }

    #[tokio::test]
    async fn upsert_leaves_other_secrets_alone() {
        let store = InMemorySecretStore::new().with_secret("other", "keep-me");
        upsert_secret(&store, &secret("mine")).await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get_secret_value("other").await.unwrap().value, "keep-me");
        assert_eq!(store.get_secret_value("sbp_hmacSecret").await.unwrap().value, "mine");
    }

    #[tokio::test]
    async fn missing_secret_is_an_error() {
        let store = InMemorySecretStore::new();
        assert!(matches!(
            store.get_secret_value("sbp_hmacSecret").await,
            Err(SbpError::SecretStore(_))
        ));
    }

    #[tokio::test]
    async fn update_unknown_id_fails() {
        let store = InMemorySecretStore::new();
        assert!(store.update_secret("nope", &secret("x")).await.is_err());
    }

    #[test]
    fn secret_debug_is_redacted() {
        assert!(!format!("{:?}", secret("hunter2")).contains("hunter2"));
        let value = SecretValue {
            value: "hunter2".to_string(),
        };
        assert!(!format!("{value:?}").contains("hunter2"));
    }

    #[test]
    fn picks_primary_url() {
        let urls = vec![
            SiteUrl {
                url: "https://a.example".to_string(),
                primary: false,
            },
            SiteUrl {
                url: "https://b.example".to_string(),
                primary: true,
            },
        ];
        assert_eq!(primary_site_url(&urls), Some("https://b.example"));
        assert_eq!(primary_site_url(&urls[..1]), None);
    }

    #[tokio::test]
    async fn event_sink_records_in_order() {
        let sink = InMemoryEventSink::new();
        let first = SubmitEventRequest::from(TransactionEvent::approved("w1", "i1"));
        let second = SubmitEventRequest::from(TransactionEvent::invoice_expired("w2", "i2"));
        sink.submit_event(&first).await.unwrap();
        sink.submit_event(&second).await.unwrap();
        assert_eq!(sink.events(), vec![first, second]);
    }

    #[tokio::test]
    async fn event_sink_survives_poisoned_lock() {
        let sink = InMemoryEventSink::new();
        let first = SubmitEventRequest::from(TransactionEvent::approved("w1", "i1"));
        sink.submit_event(&first).await.unwrap();

        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = sink.events.lock().unwrap();
            panic!("holder panicked");
        }));
        assert!(poisoned.is_err());
        assert!(sink.events.is_poisoned());

        assert_eq!(sink.events(), vec![first.clone()]);
        let second = SubmitEventRequest::from(TransactionEvent::invoice_expired("w2", "i2"));
        sink.submit_event(&second).await.unwrap();
        assert_eq!(sink.events(), vec![first, second]);
    }
}
