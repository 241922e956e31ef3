//! Instagram post references and mapped post records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical host used when rebuilding permalinks
pub const INSTAGRAM_BASE_URL: &str = "https://www.instagram.com";

/// The URL path shape a post was linked through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PostKind {
    /// `/p/<shortcode>/`
    #[default]
    Post,
    /// `/reel/<shortcode>/`
    Reel,
    /// `/tv/<shortcode>/`
    Tv,
}

impl PostKind {
    /// Path segment preceding the shortcode
    pub fn path_segment(&self) -> &'static str {
        match self {
            PostKind::Post => "p",
            PostKind::Reel => "reel",
            PostKind::Tv => "tv",
        }
    }

    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "p" => Some(PostKind::Post),
            "reel" => Some(PostKind::Reel),
            "tv" => Some(PostKind::Tv),
            _ => None,
        }
    }
}

/// A post identified by shortcode
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostRef {
    pub shortcode: String,
    pub kind: PostKind,
}

impl PostRef {
    pub fn new(shortcode: impl Into<String>, kind: PostKind) -> Self {
        Self {
            shortcode: shortcode.into(),
            kind,
        }
    }

    /// Canonical `https://www.instagram.com/<kind>/<shortcode>/` URL
    pub fn permalink(&self) -> String {
        format!(
            "{}/{}/{}/",
            INSTAGRAM_BASE_URL,
            self.kind.path_segment(),
            self.shortcode
        )
    }
}

impl fmt::Display for PostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.path_segment(), self.shortcode)
    }
}

/// Normalized metadata for one post, ready to be applied to an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub caption: String,
    pub post_date: NaiveDate,
    pub permalink: String,
    pub username: String,
    pub shortcode: String,
}

impl PostRecord {
    /// Post date as `YYYY-MM-DD`
    pub fn date_string(&self) -> String {
        self.post_date.format("%Y-%m-%d").to_string()
    }
}
