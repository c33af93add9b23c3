//! API client with the request cache in front of every call.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{derive_key, CacheStats, CacheStore, FileStorage, MemoryStorage, TtlPolicy};
use crate::client::{HttpTransport, RequestOptions, Transport, TransportRequest};
use crate::config::Config;
use crate::error::Result;
use crate::tasks::spawn_cleanup_task;

// == API Client ==
/// Issues every API call and owns the cache in front of them.
///
/// Each client has its own cache. The expiry sweep, once started, runs until
/// the client is dropped.
pub struct ApiClient<T: Transport = HttpTransport> {
    transport: T,
    cache: Arc<RwLock<CacheStore>>,
    ttl_policy: TtlPolicy,
    cleanup: Option<JoinHandle<()>>,
}

impl ApiClient<HttpTransport> {
    /// Builds an HTTP client whose cache is mirrored to `config.storage_path`
    /// and pre-populated from it.
    ///
    /// If the storage file cannot be opened the cache runs without a durable
    /// mirror.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::from_config(config)?;

        let mut store = match FileStorage::open(&config.storage_path) {
            Ok(storage) => CacheStore::from_config(config, Box::new(storage)),
            Err(e) => {
                warn!(
                    path = %config.storage_path.display(),
                    error = %e,
                    "Durable cache storage unavailable, caching in memory only"
                );
                CacheStore::from_config(config, Box::new(MemoryStorage::new()))
            }
        };
        store.load_from_storage();

        Ok(Self::new(
            transport,
            store,
            TtlPolicy::dashboard(config.default_ttl),
        ))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, cache: CacheStore, ttl_policy: TtlPolicy) -> Self {
        Self {
            transport,
            cache: Arc::new(RwLock::new(cache)),
            ttl_policy,
            cleanup: None,
        }
    }

    // == Request ==
    /// Performs `endpoint` with `options`, answering from the cache when it can.
    ///
    /// A cacheable request that is not forced is looked up first; a hit makes
    /// no network call. Otherwise exactly one transport call is made, and a
    /// successful cacheable response is stored with `options.cache_ttl` or the
    /// TTL policy's value. Transport errors are returned unchanged and leave
    /// the cache untouched.
    pub async fn request(&self, endpoint: &str, options: &RequestOptions) -> Result<Value> {
        let key = options
            .is_cacheable()
            .then(|| derive_key(endpoint, options));

        if let Some(ref key) = key {
            if !options.force_refresh {
                if let Some(hit) = self.cache.write().await.get(key.as_str()) {
                    return Ok(hit);
                }
            }
        }

        let response = self
            .transport
            .send(TransportRequest::new(endpoint, options))
            .await?;

        if let Some(key) = key {
            let ttl = options
                .cache_ttl
                .unwrap_or_else(|| self.ttl_policy.resolve(endpoint));
            debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "Caching response");
            self.cache
                .write()
                .await
                .set(key.into_string(), response.clone(), ttl);
        }

        Ok(response)
    }

    /// Plain GET through the cache.
    pub async fn get(&self, endpoint: &str) -> Result<Value> {
        self.request(endpoint, &RequestOptions::get()).await
    }

    // == Invalidate Cache ==
    /// Drops cached reads whose key contains `pattern`, or every cached read
    /// when `pattern` is `None`. Returns how many entries were removed.
    pub async fn invalidate_cache(&self, pattern: Option<&str>) -> usize {
        self.cache.write().await.invalidate(pattern)
    }

    // == Expiry Sweep ==
    /// Starts the background sweep. Calling it again while a sweep is
    /// running does nothing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_expiry_cleanup(&mut self, interval: Duration) {
        if let Some(ref handle) = self.cleanup {
            if !handle.is_finished() {
                return;
            }
        }
        self.cleanup = Some(spawn_cleanup_task(self.cache.clone(), interval));
    }

    pub fn is_cleanup_running(&self) -> bool {
        self.cleanup
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    pub fn ttl_policy(&self) -> &TtlPolicy {
        &self.ttl_policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Drop for ApiClient<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.cleanup.take() {
            handle.abort();
        }
    }
}
