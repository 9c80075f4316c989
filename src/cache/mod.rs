use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

pub const METADATA_KEY_PREFIX: &str = "metadata";
pub const KEY_SEPARATOR: &str = ":";

/// Cache key for a target URL. The raw URL is used verbatim — no
/// normalization, so URLs differing only by trailing slash or query order
/// are distinct entries.
pub fn metadata_key(url: &str) -> String {
    format!("{METADATA_KEY_PREFIX}{KEY_SEPARATOR}{url}")
}

/// Store for previously computed metadata, keyed by [`metadata_key`].
/// Values are serialized `Metadata` JSON. The async contract allows a
/// networked backend (Redis, KV) to be swapped in without touching handlers.
#[async_trait]
pub trait MetadataCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn put(&self, key: &str, value: String, ttl: Duration);
}

/// In-process cache with per-entry expiry. Expired entries are dropped
/// lazily on read and swept on write, so the map never grows unbounded
/// under steady traffic.
#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataCache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key.to_string(), (value, now + ttl));
    }
}
