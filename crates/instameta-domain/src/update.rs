//! Item patches sent back to the host

use serde::{Deserialize, Serialize};

/// Fields to change on a single item.
///
/// `None` means "leave as is". When `tag_ids` is set it carries the complete
/// list, existing tags included, because the host replaces the list wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<String>>,
}

impl ItemUpdate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            date: None,
            url: None,
            tag_ids: None,
        }
    }

    /// True when the patch would not change anything
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.date.is_none() && self.url.is_none() && self.tag_ids.is_none()
    }
}
