/// Returns the cached value for a key, or computes, caches and returns it.
///
/// # Arguments
/// * `$cache`: a [`Cache`](crate::db::Cache) (anything with `get` and `set_in_background`).
/// * `$key`: the [`CacheKey`](crate::db::CacheKey) to read and write.
/// * `$ttl`: time-to-live of a freshly computed value, in seconds.
/// * `$block`: future computing the value on a miss.
///
/// A failed or undecodable cache read counts as a miss. Errors from `$block`
/// are propagated with `?`.
///
/// # Example
/// ```rust,ignore
/// let games: Vec<Game> = cached!(self.cache, CacheKey::TopGames(3), 300, async move {
///     fetch_top_games().await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        if let Some(cached) = $cache.get(&key).await {
            tracing::debug!(key = %key, "Cache hit");
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
