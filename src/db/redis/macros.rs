/// Read-through caching over a [`Cache`](crate::db::Cache).
///
/// Returns the cached value for `$key` when present. Otherwise awaits
/// `$block`, queues the result for a background write with `$ttl` seconds to
/// live, and returns it. When the cache read itself fails the error is logged
/// and `$block` is returned as is, without a write. Errors from `$block` are
/// propagated with `?`, so the macro must be used inside a function returning
/// `AppResult`.
///
/// # Example
/// ```rust,ignore
/// let people: Vec<PersonAssociation> = cached!(
///     self.cache,
///     CacheKey::People(item_id),
///     self.ttl,
///     self.inner.people_of(item_id)
/// )?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(cached)
            }
            Ok(None) => {
                tracing::debug!(key = %key, "Cache miss");
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Redis get failed");
                $block.await
            }
        }
    }};
}
