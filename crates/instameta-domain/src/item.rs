//! Host items (scenes and images) as seen by the enrichment pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// The two kinds of host records the plugin can enrich
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Scene,
    Image,
}

impl ItemKind {
    /// Name used by the host for this kind ("Scene" / "Image")
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Scene => "Scene",
            ItemKind::Image => "Image",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown item kind: {0}")]
pub struct UnknownItemKind(pub String);

impl FromStr for ItemKind {
    type Err = UnknownItemKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scene" => Ok(ItemKind::Scene),
            "image" => Ok(ItemKind::Image),
            _ => Err(UnknownItemKind(s.to_string())),
        }
    }
}

/// A tag as referenced by an item (host id plus name)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagRef {
    pub id: String,
    pub name: String,
}

impl TagRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A scene or image record owned by the host.
///
/// Only the fields the pipeline reads or patches are modelled. Text fields the
/// host reports as null are `None`; blank strings are treated the same way by
/// [`Item::title_text`] and friends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub kind: ItemKind,
    pub title: Option<String>,
    pub date: Option<String>,
    pub url: Option<String>,
    pub tags: Vec<TagRef>,
    /// Media file paths in host order; the first one is the primary file
    pub files: Vec<PathBuf>,
}

impl Item {
    /// Create an item with no metadata, tags or files
    pub fn new(kind: ItemKind, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: None,
            date: None,
            url: None,
            tags: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_tag(mut self, tag: TagRef) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    pub fn title_text(&self) -> &str {
        non_blank(&self.title).unwrap_or("")
    }

    pub fn date_text(&self) -> &str {
        non_blank(&self.date).unwrap_or("")
    }

    pub fn url_text(&self) -> &str {
        non_blank(&self.url).unwrap_or("")
    }

    /// First associated media file, if any
    pub fn primary_file(&self) -> Option<&PathBuf> {
        self.files.first()
    }

    pub fn tag_ids(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.id.clone()).collect()
    }

    pub fn has_tag_id(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|t| t.id == tag_id)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
