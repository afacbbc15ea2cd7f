use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{Category, Game, Item};

const BOX_ART_WIDTH: &str = "300";
const BOX_ART_HEIGHT: &str = "400";
const THUMBNAIL_WIDTH: &str = "320";
const THUMBNAIL_HEIGHT: &str = "180";

/// Envelope shared by every Helix collection endpoint
#[derive(Debug, Deserialize)]
pub struct HelixResponse<T> {
    pub data: Vec<T>,
}

/// Fills Helix thumbnail templates (`{width}x{height}` or `%{width}x%{height}`)
pub fn fill_thumbnail_template(url: &str, width: &str, height: &str) -> String {
    url.replace("%{width}", width)
        .replace("%{height}", height)
        .replace("{width}", width)
        .replace("{height}", height)
}

// ============================================================================
// Games
// ============================================================================

/// Entry from GET /games/top
#[derive(Debug, Clone, Deserialize)]
pub struct HelixGame {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub box_art_url: String,
}

impl From<HelixGame> for Game {
    fn from(game: HelixGame) -> Self {
        Game {
            box_art_url: fill_thumbnail_template(&game.box_art_url, BOX_ART_WIDTH, BOX_ART_HEIGHT),
            id: game.id,
            name: game.name,
            developer: None,
            release_time: None,
            website: None,
            price: None,
        }
    }
}

// ============================================================================
// Items
// ============================================================================

/// Converts a Helix payload into an [`Item`] for the game it was searched under
pub trait IntoItem {
    const CATEGORY: Category;

    fn into_item(self, game_id: &str) -> Item;
}

/// Entry from GET /streams
#[derive(Debug, Clone, Deserialize)]
pub struct HelixStream {
    pub id: String,
    pub user_login: String,
    pub user_name: String,
    #[serde(default)]
    pub game_id: String,
    pub title: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

impl IntoItem for HelixStream {
    const CATEGORY: Category = Category::Stream;

    fn into_item(self, game_id: &str) -> Item {
        Item {
            url: format!("https://www.twitch.tv/{}", self.user_login),
            thumbnail_url: fill_thumbnail_template(
                &self.thumbnail_url,
                THUMBNAIL_WIDTH,
                THUMBNAIL_HEIGHT,
            ),
            game_id: if self.game_id.is_empty() {
                game_id.to_string()
            } else {
                self.game_id
            },
            id: self.id,
            title: self.title,
            broadcaster_name: self.user_name,
            item_type: Self::CATEGORY,
            created_at: self.started_at,
        }
    }
}

/// Entry from GET /videos (Helix omits the game id here)
#[derive(Debug, Clone, Deserialize)]
pub struct HelixVideo {
    pub id: String,
    pub user_name: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl IntoItem for HelixVideo {
    const CATEGORY: Category = Category::Video;

    fn into_item(self, game_id: &str) -> Item {
        Item {
            thumbnail_url: fill_thumbnail_template(
                &self.thumbnail_url,
                THUMBNAIL_WIDTH,
                THUMBNAIL_HEIGHT,
            ),
            id: self.id,
            title: self.title,
            url: self.url,
            broadcaster_name: self.user_name,
            game_id: game_id.to_string(),
            item_type: Self::CATEGORY,
            created_at: self.created_at,
        }
    }
}

/// Entry from GET /clips
#[derive(Debug, Clone, Deserialize)]
pub struct HelixClip {
    pub id: String,
    pub url: String,
    pub broadcaster_name: String,
    #[serde(default)]
    pub game_id: String,
    pub title: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl IntoItem for HelixClip {
    const CATEGORY: Category = Category::Clip;

    fn into_item(self, game_id: &str) -> Item {
        Item {
            game_id: if self.game_id.is_empty() {
                game_id.to_string()
            } else {
                self.game_id
            },
            id: self.id,
            title: self.title,
            url: self.url,
            thumbnail_url: self.thumbnail_url,
            broadcaster_name: self.broadcaster_name,
            item_type: Self::CATEGORY,
            created_at: self.created_at,
        }
    }
}
