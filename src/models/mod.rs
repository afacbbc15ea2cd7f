use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Display, str::FromStr};

pub mod twitch;

/// Kind of recommendable content
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Stream,
    Video,
    Clip,
}

impl Category {
    /// Every category, in presentation order
    pub const ALL: [Category; 3] = [Category::Stream, Category::Video, Category::Clip];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Stream => "STREAM",
            Category::Video => "VIDEO",
            Category::Clip => "CLIP",
        }
    }

    /// Helix endpoint serving items of this category
    pub fn endpoint(&self) -> &'static str {
        match self {
            Category::Stream => "streams",
            Category::Video => "videos",
            Category::Clip => "clips",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STREAM" => Ok(Category::Stream),
            "VIDEO" => Ok(Category::Video),
            "CLIP" => Ok(Category::Clip),
            _ => Err(s.to_string()),
        }
    }
}

/// A game, the subject every item is about.
///
/// The optional metadata is informational and never affects ranking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Game {
    pub id: String,
    pub name: String,
    pub box_art_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// A recommendable live stream, video or clip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub url: String,
    pub thumbnail_url: String,
    pub broadcaster_name: String,
    pub game_id: String,
    pub item_type: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Recommended items keyed by category, each list in presentation order
pub type Recommendations = BTreeMap<Category, Vec<Item>>;
