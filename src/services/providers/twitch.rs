//! Twitch Helix API provider
//!
//! API Flow:
//! 1. Top games: /games/top → popular games, most viewed first
//! 2. Items: /streams, /videos or /clips filtered by `game_id`
//!
//! Every request carries the application's `Client-Id` and an app access token.

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::ProviderError,
    models::{
        twitch::{HelixClip, HelixGame, HelixResponse, HelixStream, HelixVideo, IntoItem},
        Category, Game, Item,
    },
    services::providers::ContentSource,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

const TOP_GAMES_CACHE_TTL: u64 = 300; // 5 minutes
const ITEM_CACHE_TTL: u64 = 120; // 2 minutes
pub const MAX_PAGE_SIZE: usize = 100;

/// Helix accepts `first` values between 1 and 100
fn page_size(limit: usize) -> String {
    limit.clamp(1, MAX_PAGE_SIZE).to_string()
}

#[derive(Clone)]
pub struct TwitchProvider {
    http_client: HttpClient,
    client_id: String,
    access_token: String,
    api_url: String,
    cache: Cache,
}

impl TwitchProvider {
    pub fn new(cache: Cache, client_id: String, access_token: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            client_id,
            access_token,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    /// Issues a GET against a Helix collection endpoint and returns its `data` array
    async fn fetch_data<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ProviderError> {
        let url = format!("{}/{}", self.api_url, endpoint);

        let response = self
            .http_client
            .get(&url)
            .header("Client-Id", &self.client_id)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let body = response.text().await?;
        let parsed: HelixResponse<T> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, endpoint = %endpoint, "Failed to deserialize Helix response");
            ProviderError::Decode(format!("{} response: {}", endpoint, e))
        })?;

        Ok(parsed.data)
    }

    async fn fetch_items<T>(&self, game_id: &str, limit: usize) -> Result<Vec<Item>, ProviderError>
    where
        T: DeserializeOwned + IntoItem,
    {
        let first = page_size(limit);
        let raw: Vec<T> = self
            .fetch_data(
                T::CATEGORY.endpoint(),
                &[("game_id", game_id), ("first", first.as_str())],
            )
            .await?;

        Ok(raw
            .into_iter()
            .take(limit)
            .map(|entry| entry.into_item(game_id))
            .collect())
    }
}

#[async_trait::async_trait]
impl ContentSource for TwitchProvider {
    async fn top_games(&self, limit: usize) -> Result<Vec<Game>, ProviderError> {
        cached!(
            self.cache,
            CacheKey::TopGames(limit),
            TOP_GAMES_CACHE_TTL,
            async move {
                let first = page_size(limit);
                let raw: Vec<HelixGame> = self
                    .fetch_data("games/top", &[("first", first.as_str())])
                    .await?;
                let games: Vec<Game> = raw.into_iter().take(limit).map(Game::from).collect();

                tracing::info!(
                    limit,
                    results = games.len(),
                    provider = "twitch",
                    "Top games fetched"
                );

                Ok::<_, ProviderError>(games)
            }
        )
    }

    async fn search_by_type(
        &self,
        game_id: &str,
        category: Category,
        limit: usize,
    ) -> Result<Vec<Item>, ProviderError> {
        cached!(
            self.cache,
            CacheKey::ItemSearch {
                game_id: game_id.to_string(),
                category,
                limit,
            },
            ITEM_CACHE_TTL,
            async move {
                let items = match category {
                    Category::Stream => self.fetch_items::<HelixStream>(game_id, limit).await?,
                    Category::Video => self.fetch_items::<HelixVideo>(game_id, limit).await?,
                    Category::Clip => self.fetch_items::<HelixClip>(game_id, limit).await?,
                };

                tracing::info!(
                    game_id = %game_id,
                    category = %category,
                    results = items.len(),
                    provider = "twitch",
                    "Items fetched"
                );

                Ok::<_, ProviderError>(items)
            }
        )
    }

    fn name(&self) -> &'static str {
        "twitch"
    }
}
