//! Injectable key-value storage — trait for the page-lifetime session store
//! and the durable admin store, plus the prefill message channel built on
//! top of it.
//!
//! Components accept an `Arc<dyn KeyValueStore>` rather than reaching for
//! ambient storage, so tests can substitute an in-memory fake.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::config::SubmissionConfig;

/// Key under which the services section publishes an enquiry subject for
/// the contact form to pick up.
pub const PREFILL_SUBJECT_KEY: &str = "metamech_enquiry_subject";

/// Key under which the admin panel stores the submission endpoint override.
pub const ADMIN_ENDPOINT_KEY: &str = "metamech_form_endpoint";

/// String key-value store with explicit get/set/remove. Lifetime (page vs.
/// durable) is a property of the backing implementation, not the trait.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str) -> Option<String>;
}

/// In-memory store backed by `DashMap`. Serves as the page-lifetime session
/// store and as the test stand-in for the durable admin store.
#[derive(Default)]
pub struct InMemoryStore {
    entries: DashMap<String, String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) -> Option<String> {
        self.entries.remove(key).map(|(_, v)| v)
    }
}

/// Convenience: a fresh in-memory store behind the trait object.
pub fn in_memory_store() -> Arc<dyn KeyValueStore> {
    Arc::new(InMemoryStore::new())
}

/// Effective submission endpoint: an admin-store override under
/// [`ADMIN_ENDPOINT_KEY`] wins over the configured value. A blank override
/// counts as unset.
pub fn submission_endpoint(store: &dyn KeyValueStore, config: &SubmissionConfig) -> String {
    match store.get(ADMIN_ENDPOINT_KEY) {
        Some(endpoint) if !endpoint.trim().is_empty() => {
            debug!(endpoint, "using admin endpoint override");
            endpoint
        }
        _ => config.endpoint.clone(),
    }
}

/// One-shot prefill channel between page sections: the producer publishes a
/// single enquiry subject, the consumer takes it at most once
/// (read-and-clear) on its next activation.
pub struct PrefillChannel {
    store: Arc<dyn KeyValueStore>,
}

impl PrefillChannel {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Publish an enquiry subject. A second publish before delivery
    /// overwrites the first; the channel carries one message.
    pub fn publish(&self, subject: &str) {
        debug!(subject, "prefill subject published");
        self.store.set(PREFILL_SUBJECT_KEY, subject);
    }

    /// Take the pending prefill message, clearing it so it is delivered at
    /// most once. Returns the ready-made contact-form message.
    pub fn take(&self) -> Option<String> {
        self.store
            .remove(PREFILL_SUBJECT_KEY)
            .map(|subject| format!("I'm interested in {subject}."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_get_set_remove() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "v1");
        store.set("k", "v2");
        assert_eq!(store.get("k"), Some("v2".into()));
        assert_eq!(store.remove("k"), Some("v2".into()));
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_admin_override_wins_over_configured_endpoint() {
        let store = InMemoryStore::new();
        let config = SubmissionConfig::default();

        // No override on record: configured endpoint applies
        assert_eq!(submission_endpoint(&store, &config), config.endpoint);

        store.set(ADMIN_ENDPOINT_KEY, "https://forms.example.com/submit");
        assert_eq!(
            submission_endpoint(&store, &config),
            "https://forms.example.com/submit"
        );

        // A blank override is treated as unset
        store.set(ADMIN_ENDPOINT_KEY, "  ");
        assert_eq!(submission_endpoint(&store, &config), config.endpoint);
    }

    #[test]
    fn test_prefill_delivers_at_most_once() {
        let channel = PrefillChannel::new(in_memory_store());
        assert_eq!(channel.take(), None);

        channel.publish("BOM Automation");
        assert_eq!(
            channel.take(),
            Some("I'm interested in BOM Automation.".into())
        );
        // Second read after delivery is empty
        assert_eq!(channel.take(), None);
    }

    #[test]
    fn test_prefill_overwrite_before_delivery() {
        let channel = PrefillChannel::new(in_memory_store());
        channel.publish("PDF Merge + Index");
        channel.publish("STEP/DXF Export");
        assert_eq!(
            channel.take(),
            Some("I'm interested in STEP/DXF Export.".into())
        );
        assert_eq!(channel.take(), None);
    }
}
