use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use crate::{
    db::HistoryStore,
    error::RecommendationError,
    models::{Category, Game, Item, Recommendations},
    services::providers::ContentSource,
};

/// Caps applied while assembling recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationLimits {
    /// Games consulted per category
    pub game_limit: usize,
    /// Items requested from the content source per game
    pub per_game_limit: usize,
    /// Items returned per category
    pub total_limit: usize,
}

impl Default for RecommendationLimits {
    fn default() -> Self {
        Self {
            game_limit: 3,
            per_game_limit: 10,
            total_limit: 20,
        }
    }
}

/// How many favorited items of one category trace back to a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameFrequency<'a> {
    pub game_id: &'a str,
    pub count: usize,
}

/// Ranks games by how often they appear in `game_ids`, most frequent first.
///
/// Ties keep the order in which the games first appear. At most `limit`
/// games are returned.
pub fn rank_games_by_frequency(game_ids: &[String], limit: usize) -> Vec<GameFrequency<'_>> {
    let mut table: Vec<GameFrequency<'_>> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for game_id in game_ids {
        match positions.get(game_id.as_str()) {
            Some(&position) => table[position].count += 1,
            None => {
                positions.insert(game_id.as_str(), table.len());
                table.push(GameFrequency {
                    game_id: game_id.as_str(),
                    count: 1,
                });
            }
        }
    }

    // stable: ties stay in first-occurrence order
    table.sort_by(|a, b| b.count.cmp(&a.count));
    table.truncate(limit);
    table
}

/// Runs `build` for every category concurrently and collects the results.
///
/// The first failure aborts the whole computation and the other categories
/// are dropped.
async fn for_each_category<F, Fut>(build: F) -> Result<Recommendations, RecommendationError>
where
    F: Fn(Category) -> Fut,
    Fut: Future<Output = Result<Vec<Item>, RecommendationError>>,
{
    let [stream, video, clip] = Category::ALL;
    let (streams, videos, clips) = tokio::try_join!(build(stream), build(video), build(clip))?;

    Ok(Recommendations::from([
        (stream, streams),
        (video, videos),
        (clip, clips),
    ]))
}

/// Recommends streams, videos and clips from game popularity or a user's
/// favorite history
pub struct Recommender {
    content_source: Arc<dyn ContentSource>,
    history_store: Arc<dyn HistoryStore>,
    limits: RecommendationLimits,
}

impl Recommender {
    pub fn new(content_source: Arc<dyn ContentSource>, history_store: Arc<dyn HistoryStore>) -> Self {
        Self {
            content_source,
            history_store,
            limits: RecommendationLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: RecommendationLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> RecommendationLimits {
        self.limits
    }

    /// Recommends items about the currently most popular games.
    ///
    /// Every category is present in the result, possibly with an empty list.
    pub async fn recommend_by_popular_games(&self) -> Result<Recommendations, RecommendationError> {
        let top_games = self.fetch_top_games().await?;
        let top_games = top_games.as_slice();

        let recommendations = for_each_category(move |category| async move {
            self.recommend_by_top_games(category, top_games).await
        })
        .await?;

        tracing::info!(
            games = top_games.len(),
            streams = recommendations[&Category::Stream].len(),
            videos = recommendations[&Category::Video].len(),
            clips = recommendations[&Category::Clip].len(),
            "Popular recommendations computed"
        );

        Ok(recommendations)
    }

    /// Recommends items about the games behind the user's favorites.
    ///
    /// Categories without favorite history fall back to popular games. Items
    /// the user already favorited are never recommended back.
    #[tracing::instrument(skip(self))]
    pub async fn recommend_for_user(
        &self,
        user_id: &str,
    ) -> Result<Recommendations, RecommendationError> {
        let favorite_item_ids = self
            .history_store
            .favorite_item_ids(user_id)
            .await
            .map_err(RecommendationError::History)?;
        let favorite_game_ids = self
            .history_store
            .favorite_game_ids_by_category(&favorite_item_ids)
            .await
            .map_err(RecommendationError::History)?;

        let needs_fallback = Category::ALL.iter().any(|category| {
            favorite_game_ids
                .get(category)
                .map_or(true, |game_ids| game_ids.is_empty())
        });
        let top_games = if needs_fallback {
            self.fetch_top_games().await?
        } else {
            Vec::new()
        };

        let favorite_item_ids = &favorite_item_ids;
        let favorite_game_ids = &favorite_game_ids;
        let top_games = top_games.as_slice();

        let recommendations = for_each_category(move |category| async move {
            match favorite_game_ids.get(&category) {
                Some(game_ids) if !game_ids.is_empty() => {
                    self.recommend_by_favorite_history(category, game_ids, favorite_item_ids)
                        .await
                }
                _ => self.recommend_by_top_games(category, top_games).await,
            }
        })
        .await?;

        tracing::info!(
            favorites = favorite_item_ids.len(),
            fallback = needs_fallback,
            streams = recommendations[&Category::Stream].len(),
            videos = recommendations[&Category::Video].len(),
            clips = recommendations[&Category::Clip].len(),
            "Personalized recommendations computed"
        );

        Ok(recommendations)
    }

    async fn fetch_top_games(&self) -> Result<Vec<Game>, RecommendationError> {
        let mut games = self
            .content_source
            .top_games(self.limits.game_limit)
            .await
            .map_err(RecommendationError::TopGames)?;
        games.truncate(self.limits.game_limit);
        Ok(games)
    }

    async fn recommend_by_top_games(
        &self,
        category: Category,
        top_games: &[Game],
    ) -> Result<Vec<Item>, RecommendationError> {
        let game_ids: Vec<&str> = top_games
            .iter()
            .take(self.limits.game_limit)
            .map(|game| game.id.as_str())
            .collect();

        self.collect_items(category, &game_ids, &HashSet::new())
            .await
    }

    async fn recommend_by_favorite_history(
        &self,
        category: Category,
        favorite_game_ids: &[String],
        favorite_item_ids: &HashSet<String>,
    ) -> Result<Vec<Item>, RecommendationError> {
        let ranked = rank_games_by_frequency(favorite_game_ids, self.limits.game_limit);
        tracing::debug!(category = %category, ranked = ?ranked, "Ranked favorite games");

        let game_ids: Vec<&str> = ranked.iter().map(|entry| entry.game_id).collect();
        self.collect_items(category, &game_ids, favorite_item_ids)
            .await
    }

    /// Fills one category from the given games in order.
    ///
    /// Each game contributes its whole batch until the total cap is hit; later
    /// games are not queried once the category is full.
    async fn collect_items(
        &self,
        category: Category,
        game_ids: &[&str],
        excluded: &HashSet<String>,
    ) -> Result<Vec<Item>, RecommendationError> {
        let total_limit = self.limits.total_limit;
        let mut recommended: Vec<Item> = Vec::with_capacity(total_limit);
        let mut seen: HashSet<String> = HashSet::new();

        for &game_id in game_ids {
            if recommended.len() >= total_limit {
                break;
            }

            let batch = self
                .content_source
                .search_by_type(game_id, category, self.limits.per_game_limit)
                .await
                .map_err(|source| RecommendationError::ItemSearch {
                    game_id: game_id.to_string(),
                    category,
                    source,
                })?;

            for item in batch {
                if recommended.len() >= total_limit {
                    break;
                }
                if item.item_type != category {
                    tracing::warn!(
                        item_id = %item.id,
                        expected = %category,
                        actual = %item.item_type,
                        provider = self.content_source.name(),
                        "Skipping item of unexpected category"
                    );
                    continue;
                }
                if excluded.contains(&item.id) || !seen.insert(item.id.clone()) {
                    continue;
                }
                recommended.push(item);
            }
        }

        Ok(recommended)
    }
}
