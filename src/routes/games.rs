use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::Game,
    routes::AppState,
};

const DEFAULT_TOP_GAMES_LIMIT: usize = 20;
const MAX_TOP_GAMES_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct TopGamesQuery {
    limit: Option<usize>,
}

/// Handler for the top games endpoint
pub async fn top_games(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TopGamesQuery>,
) -> AppResult<Json<Vec<Game>>> {
    let limit = params.limit.unwrap_or(DEFAULT_TOP_GAMES_LIMIT);
    if !(1..=MAX_TOP_GAMES_LIMIT).contains(&limit) {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {}",
            MAX_TOP_GAMES_LIMIT
        )));
    }

    let games = state.content_source.top_games(limit).await?;
    Ok(Json(games))
}
