use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::Category;

/// Failures of the external content source (Twitch Helix)
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed provider response: {0}")]
    Decode(String),
}

/// Failures of the favorite-history store
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unknown item type in history store: {0}")]
    UnknownCategory(String),
}

/// Failures setting up the Redis response cache
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// The single failure surfaced by the recommender.
///
/// Every variant wraps the collaborator error that aborted the computation.
/// No partial result travels with it.
#[derive(thiserror::Error, Debug)]
pub enum RecommendationError {
    #[error("Failed to get game data for recommendation: {0}")]
    TopGames(#[source] ProviderError),

    #[error("Failed to get {category} recommendations for game {game_id}: {source}")]
    ItemSearch {
        game_id: String,
        category: Category,
        #[source]
        source: ProviderError,
    },

    #[error("Failed to get user favorite history for recommendation: {0}")]
    History(#[source] StoreError),
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Recommendation(#[from] RecommendationError),

    #[error("External API error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Recommendation(RecommendationError::History(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Recommendation(_) | AppError::Provider(_) => StatusCode::BAD_GATEWAY,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
