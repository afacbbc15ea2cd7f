use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::CacheError;
use crate::models::Category;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    TopGames(usize),
    ItemSearch {
        game_id: String,
        category: Category,
        limit: usize,
    },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::TopGames(limit) => write!(f, "games:top:{}", limit),
            CacheKey::ItemSearch {
                game_id,
                category,
                limit,
            } => write!(
                f,
                "items:{}:{}:{}",
                category.endpoint(),
                game_id,
                limit
            ),
        }
    }
}

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

fn decode_cached<T: serde::de::DeserializeOwned>(key: &CacheKey, json: &str) -> Option<T> {
    match serde_json::from_str(json) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, key = %key, "Undecodable cache entry, treating as cache miss");
            None
        }
    }
}

struct PendingWrite {
    key: String,
    value: String,
    ttl: u64,
}

/// Short-lived cache for content provider responses.
///
/// Reads go straight to Redis through a reconnecting connection manager.
/// Writes are queued and flushed by a background task so a slow Redis never
/// delays a response.
#[derive(Clone)]
pub struct Cache {
    conn: ConnectionManager,
    write_tx: mpsc::UnboundedSender<PendingWrite>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Signals the writer to stop and waits until queued writes are flushed
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task panicked");
        }
    }
}

impl Cache {
    /// Connects to Redis and starts the background writer
    pub async fn connect(client: Client) -> Result<(Self, CacheWriterHandle), CacheError> {
        let conn = ConnectionManager::new(client).await?;
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = tokio::spawn(Self::run_writer(conn.clone(), write_rx, shutdown_rx));

        Ok((Self { conn, write_tx }, CacheWriterHandle { shutdown_tx, task }))
    }

    async fn run_writer(
        mut conn: ConnectionManager,
        mut write_rx: mpsc::UnboundedReceiver<PendingWrite>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                Some(write) = write_rx.recv() => {
                    Self::write(&mut conn, write).await;
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    let mut flushed = 0usize;
                    while let Some(write) = write_rx.recv().await {
                        Self::write(&mut conn, write).await;
                        flushed += 1;
                    }
                    tracing::info!(flushed, "Cache writer task stopped");
                    break;
                }
            }
        }
    }

    async fn write(conn: &mut ConnectionManager, write: PendingWrite) {
        let result: redis::RedisResult<()> = conn.set_ex(&write.key, write.value, write.ttl).await;
        if let Err(e) = result {
            tracing::error!(error = %e, key = %write.key, "Failed to write to Redis cache");
        }
    }

    /// Returns the cached value for `key`, or `None` on a miss.
    ///
    /// Redis failures and stale entries that no longer decode count as misses.
    pub async fn get<T: serde::de::DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let mut conn = self.conn.clone();
        let cached: redis::RedisResult<Option<String>> = conn.get(key.to_string()).await;

        match cached {
            Ok(Some(json)) => decode_cached(key, &json),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Redis read failed, treating as cache miss");
                None
            }
        }
    }

    /// Queues `value` for storage under `key` and returns immediately
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let value = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let write = PendingWrite {
            key: key.to_string(),
            value,
            ttl,
        };

        if self.write_tx.send(write).is_err() {
            tracing::warn!(key = %key, "Cache writer stopped, dropping write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Item;

    #[test]
    fn test_cache_key_display_top_games() {
        let key = CacheKey::TopGames(3);
        assert_eq!(format!("{}", key), "games:top:3");
    }

    #[test]
    fn test_cache_key_display_item_search() {
        let key = CacheKey::ItemSearch {
            game_id: "509658".to_string(),
            category: Category::Video,
            limit: 10,
        };
        assert_eq!(format!("{}", key), "items:videos:509658:10");
    }

    #[test]
    fn test_cache_key_distinguishes_categories() {
        let stream = CacheKey::ItemSearch {
            game_id: "1".to_string(),
            category: Category::Stream,
            limit: 10,
        };
        let clip = CacheKey::ItemSearch {
            game_id: "1".to_string(),
            category: Category::Clip,
            limit: 10,
        };
        assert_ne!(stream.to_string(), clip.to_string());
    }

    #[test]
    fn test_decode_cached_value() {
        let key = CacheKey::TopGames(2);
        let decoded: Option<Vec<String>> = decode_cached(&key, r#"["a","b"]"#);
        assert_eq!(decoded, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_undecodable_entry_is_a_miss() {
        let key = CacheKey::ItemSearch {
            game_id: "509658".to_string(),
            category: Category::Stream,
            limit: 10,
        };

        let truncated: Option<Vec<Item>> = decode_cached(&key, r#"[{"id":"1","title""#);
        assert_eq!(truncated, None);

        let wrong_shape: Option<Vec<Item>> = decode_cached(&key, r#"{"id":"1"}"#);
        assert_eq!(wrong_shape, None);
    }

    async fn connect_test_cache() -> (Cache, CacheWriterHandle, Client) {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let client = create_redis_client(&redis_url).unwrap();
        let (cache, handle) = Cache::connect(client.clone()).await.unwrap();
        (cache, handle, client)
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_cache_miss() {
        let (cache, _handle, _client) = connect_test_cache().await;

        let key = CacheKey::TopGames(987_654);
        let retrieved: Option<Vec<String>> = cache.get(&key).await;

        assert_eq!(retrieved, None);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_shutdown_flushes_pending_writes() {
        let (cache, handle, client) = connect_test_cache().await;

        let key = CacheKey::ItemSearch {
            game_id: "shutdown_test".to_string(),
            category: Category::Clip,
            limit: 1,
        };
        let value = vec!["clip".to_string()];

        cache.set_in_background(&key, &value, 60);
        handle.shutdown().await;

        let retrieved: Option<Vec<String>> = cache.get(&key).await;
        assert_eq!(retrieved, Some(value));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }
}
