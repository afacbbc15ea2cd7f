//! Content provider abstraction
//!
//! The recommender only needs two things from a content source: the games
//! that are currently popular, and a batch of items of one category for a
//! given game. Each concrete provider (Twitch Helix today) implements both.

use async_trait::async_trait;

use crate::{
    error::ProviderError,
    models::{Category, Game, Item},
};

pub mod twitch;

pub use twitch::TwitchProvider;

/// Trait for content providers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Currently popular games, most popular first, at most `limit` of them
    async fn top_games(&self, limit: usize) -> Result<Vec<Game>, ProviderError>;

    /// Up to `limit` items of `category` about the game `game_id`.
    ///
    /// Item order is whatever the provider returns.
    async fn search_by_type(
        &self,
        game_id: &str,
        category: Category,
        limit: usize,
    ) -> Result<Vec<Item>, ProviderError>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
