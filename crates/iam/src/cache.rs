use async_trait::async_trait;

/// Invalidation hook into the data plane's access-key -> account cache.
///
/// The cache is authoritative for request authentication, so every mutation
/// that changes account state must push an invalidation for each of the
/// account's access keys. Injected at store construction; deployments
/// without a cache use [`NoopAccountCache`].
#[async_trait]
pub trait AccountCache: Send + Sync {
    async fn invalidate(&self, access_key: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAccountCache;

#[async_trait]
impl AccountCache for NoopAccountCache {
    async fn invalidate(&self, _access_key: &str) {}
}
