/// Read-through caching over Redis.
///
/// Looks the key up first; on a miss, runs the block, queues the value for a
/// background write, and returns it. The block must evaluate to an
/// `AppResult` future.
///
/// # Arguments
/// * `$cache`: a [`Cache`](crate::db::Cache) instance.
/// * `$key`: the [`CacheKey`](crate::db::CacheKey) to read and write under.
/// * `$ttl`: time-to-live for the cached value, in seconds.
/// * `$block`: computes the value on a cache miss.
///
/// # Example
/// ```rust,ignore
/// let categories = cached!(cache, CacheKey::Categories, 300, async move {
///     catalog::distinct_categories(&pool).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok::<_, $crate::error::AppError>(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
