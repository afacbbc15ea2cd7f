use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{error::StoreError, models::Category};

/// Read access to a user's favorite history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Ids of every item the user has favorited
    async fn favorite_item_ids(&self, user_id: &str) -> Result<HashSet<String>, StoreError>;

    /// Game ids behind the given items, grouped by category.
    ///
    /// Each category's list holds one entry per favorited item, so a game
    /// repeats once for every favorite that traces back to it.
    async fn favorite_game_ids_by_category(
        &self,
        item_ids: &HashSet<String>,
    ) -> Result<HashMap<Category, Vec<String>>, StoreError>;
}

/// Postgres-backed favorite history
#[derive(Clone)]
pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn empty_category_map() -> HashMap<Category, Vec<String>> {
    Category::ALL
        .into_iter()
        .map(|category| (category, Vec::new()))
        .collect()
}

fn group_by_category(
    rows: Vec<(String, String)>,
) -> Result<HashMap<Category, Vec<String>>, StoreError> {
    let mut by_category = empty_category_map();

    for (game_id, item_type) in rows {
        let category = item_type
            .parse::<Category>()
            .map_err(StoreError::UnknownCategory)?;
        by_category.entry(category).or_default().push(game_id);
    }

    Ok(by_category)
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn favorite_item_ids(&self, user_id: &str) -> Result<HashSet<String>, StoreError> {
        // Returned to the pool when dropped, on success and on error alike.
        let mut conn = self.pool.acquire().await?;

        let ids: Vec<String> =
            sqlx::query_scalar("SELECT item_id FROM favorite_records WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&mut *conn)
                .await?;

        tracing::debug!(user_id = %user_id, favorites = ids.len(), "Loaded favorite item ids");

        Ok(ids.into_iter().collect())
    }

    async fn favorite_game_ids_by_category(
        &self,
        item_ids: &HashSet<String>,
    ) -> Result<HashMap<Category, Vec<String>>, StoreError> {
        if item_ids.is_empty() {
            return Ok(empty_category_map());
        }

        let mut conn = self.pool.acquire().await?;
        let ids: Vec<String> = item_ids.iter().cloned().collect();

        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT game_id, item_type
            FROM items
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?;

        group_by_category(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(game_id: &str, item_type: &str) -> (String, String) {
        (game_id.to_string(), item_type.to_string())
    }

    #[test]
    fn test_group_by_category_keeps_every_category() {
        let grouped = group_by_category(vec![row("g1", "STREAM")]).unwrap();

        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[&Category::Stream], vec!["g1".to_string()]);
        assert!(grouped[&Category::Video].is_empty());
        assert!(grouped[&Category::Clip].is_empty());
    }

    #[test]
    fn test_group_by_category_keeps_repeats_in_order() {
        let grouped = group_by_category(vec![
            row("g1", "CLIP"),
            row("g2", "CLIP"),
            row("g1", "CLIP"),
            row("g3", "VIDEO"),
        ])
        .unwrap();

        assert_eq!(grouped[&Category::Clip], vec!["g1", "g2", "g1"]);
        assert_eq!(grouped[&Category::Video], vec!["g3"]);
    }

    #[test]
    fn test_group_by_category_rejects_unknown_type() {
        let result = group_by_category(vec![row("g1", "PODCAST")]);
        assert!(matches!(result, Err(StoreError::UnknownCategory(t)) if t == "PODCAST"));
    }
}
