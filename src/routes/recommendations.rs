use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::Recommendations,
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub user_id: Option<String>,
}

/// Handler for recommendations endpoint
///
/// Personalized when a `user_id` is given, popular-games based otherwise.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<Recommendations>> {
    let recommendations = match query.user_id {
        Some(user_id) => {
            let user_id = user_id.trim();
            if user_id.is_empty() {
                return Err(AppError::InvalidInput(
                    "user_id cannot be empty".to_string(),
                ));
            }

            tracing::info!(request_id = %request_id, user_id = %user_id, "Recommending for user");
            state.recommender.recommend_for_user(user_id).await?
        }
        None => {
            tracing::info!(request_id = %request_id, "Recommending by popular games");
            state.recommender.recommend_by_popular_games().await?
        }
    };

    Ok(Json(recommendations))
}
