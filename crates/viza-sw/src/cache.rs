//! Cache storage
//!
//! Named request→response stores shared by every handler. Stores are kept in
//! creation order, which is the order [`CacheStorage::match_request`] searches.
//! Only `GET` requests are stored or matched, and URL fragments are ignored.

use std::collections::HashMap;
use std::sync::Arc;

use smol::lock::RwLock;
use viza_net::{Fetch, Method, Request, Response};

use crate::config::DEFAULT_QUOTA;
use crate::error::CacheError;

/// Identity of a request within a store
pub fn cache_key(request: &Request) -> String {
    let mut url = request.url.clone();
    url.set_fragment(None);
    url.into()
}

struct Storage {
    caches: Vec<(String, HashMap<String, Response>)>,
    quota: usize,
    used: usize,
}

impl Storage {
    fn entries(&self, name: &str) -> Option<&HashMap<String, Response>> {
        self.caches.iter().find(|(n, _)| n == name).map(|(_, e)| e)
    }

    /// Insert a batch of entries into one store, all or nothing.
    ///
    /// A key repeated within the batch keeps its last response.
    fn insert(&mut self, name: &str, batch: Vec<(String, Response)>) -> Result<(), CacheError> {
        let index = self.caches.iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| CacheError::NotFound(name.to_string()))?;

        let batch: HashMap<String, Response> = batch.into_iter().collect();

        let entries = &self.caches[index].1;
        let replaced: usize = batch.iter()
            .filter_map(|(key, _)| entries.get(key))
            .map(|r| r.body.len())
            .sum();
        let needed: usize = batch.iter().map(|(_, r)| r.body.len()).sum();
        let available = self.quota.saturating_sub(self.used - replaced);
        if needed > available {
            return Err(CacheError::QuotaExceeded { needed, available });
        }

        let entries = &mut self.caches[index].1;
        for (key, response) in batch {
            entries.insert(key, response);
        }
        self.used = self.used - replaced + needed;
        Ok(())
    }
}

/// Handle to the set of named stores; clones share the same storage
#[derive(Clone)]
pub struct CacheStorage {
    inner: Arc<RwLock<Storage>>,
}

impl CacheStorage {
    /// Create storage limited to `quota` bytes of response bodies
    pub fn new(quota: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Storage {
                caches: Vec::new(),
                quota,
                used: 0,
            })),
        }
    }

    /// Open a store, creating it if missing
    pub async fn open(&self, name: &str) -> Cache {
        let mut storage = self.inner.write().await;
        if storage.entries(name).is_none() {
            tracing::debug!(cache = name, "creating cache");
            storage.caches.push((name.to_string(), HashMap::new()));
        }
        Cache {
            storage: self.clone(),
            name: name.to_string(),
        }
    }

    pub async fn has(&self, name: &str) -> bool {
        self.inner.read().await.entries(name).is_some()
    }

    /// Delete a store and everything in it
    pub async fn delete(&self, name: &str) -> bool {
        let mut storage = self.inner.write().await;
        match storage.caches.iter().position(|(n, _)| n == name) {
            Some(index) => {
                let (_, entries) = storage.caches.remove(index);
                let freed: usize = entries.values().map(|r| r.body.len()).sum();
                storage.used -= freed;
                true
            }
            None => false,
        }
    }

    /// Store names in creation order
    pub async fn keys(&self) -> Vec<String> {
        self.inner.read().await.caches.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Look a request up in every store
    pub async fn match_request(&self, request: &Request) -> Option<Response> {
        if request.method != Method::Get {
            return None;
        }
        let key = cache_key(request);
        let storage = self.inner.read().await;
        storage.caches.iter().find_map(|(_, entries)| entries.get(&key).cloned())
    }

    /// Bytes of response bodies currently stored
    pub async fn usage(&self) -> usize {
        self.inner.read().await.used
    }

    pub async fn quota(&self) -> usize {
        self.inner.read().await.quota
    }
}

impl Default for CacheStorage {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTA)
    }
}

/// A single named store
#[derive(Clone)]
pub struct Cache {
    storage: CacheStorage,
    name: String,
}

impl Cache {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn match_request(&self, request: &Request) -> Option<Response> {
        if request.method != Method::Get {
            return None;
        }
        let storage = self.storage.inner.read().await;
        storage.entries(&self.name)?.get(&cache_key(request)).cloned()
    }

    /// Store a response; the last write for a key wins
    pub async fn put(&self, request: &Request, response: Response) -> Result<(), CacheError> {
        if request.method != Method::Get {
            return Err(CacheError::MethodNotCacheable(request.method));
        }
        let mut storage = self.storage.inner.write().await;
        storage.insert(&self.name, vec![(cache_key(request), response)])
    }

    pub async fn delete(&self, request: &Request) -> bool {
        let mut storage = self.storage.inner.write().await;
        let key = cache_key(request);
        let removed = storage.caches.iter_mut()
            .find(|(n, _)| *n == self.name)
            .and_then(|(_, entries)| entries.remove(&key));
        match removed {
            Some(response) => {
                storage.used -= response.body.len();
                true
            }
            None => false,
        }
    }

    /// Keys (request URLs) held by this store
    pub async fn keys(&self) -> Vec<String> {
        let storage = self.storage.inner.read().await;
        let mut keys: Vec<String> = storage.entries(&self.name)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Fetch every request and store all responses, or store nothing.
    ///
    /// Fails on the first transport error or non-2xx status.
    pub async fn add_all<F: Fetch>(&self, fetcher: &F, requests: &[Request]) -> Result<(), CacheError> {
        let mut batch = Vec::with_capacity(requests.len());
        for request in requests {
            if request.method != Method::Get {
                return Err(CacheError::MethodNotCacheable(request.method));
            }
            let url = request.url.to_string();
            let response = fetcher.fetch(request).await
                .map_err(|e| CacheError::AddAll { url: url.clone(), reason: e.to_string() })?;
            if !response.is_success() {
                return Err(CacheError::AddAll {
                    url,
                    reason: format!("status {}", response.status),
                });
            }
            batch.push((cache_key(request), response));
        }

        let mut storage = self.storage.inner.write().await;
        storage.insert(&self.name, batch)
    }
}
