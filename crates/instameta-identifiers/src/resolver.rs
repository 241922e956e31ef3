//! Post URL resolution for an item
//!
//! Sources are tried in a fixed order and the first one that yields a URL wins:
//! 1. the explicit `url` task argument
//! 2. the item's own URL, when it is an Instagram post URL
//! 3. a sidecar JSON file next to the item's first media file

use instameta_domain::{Item, TaskArgs};
use std::path::PathBuf;

use crate::error::{IdentifierError, Result};
use crate::extractors::is_instagram_post_url;
use crate::sidecar::{load_sidecar, url_from_sidecar};

/// Where a resolved URL came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlSource {
    Argument,
    ItemUrl,
    Sidecar(PathBuf),
}

/// A URL chosen for an item along with its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub url: String,
    pub source: UrlSource,
}

type ResolveRule = fn(&TaskArgs, &Item) -> Option<ResolvedUrl>;

/// Resolution rules in priority order
const RESOLVE_RULES: [ResolveRule; 3] = [from_argument, from_item_url, from_sidecar];

/// Resolve the Instagram post URL to use for `item`
pub fn resolve_post_url(args: &TaskArgs, item: &Item) -> Result<ResolvedUrl> {
    RESOLVE_RULES
        .iter()
        .find_map(|rule| rule(args, item))
        .ok_or(IdentifierError::NoUrlFound)
}

fn from_argument(args: &TaskArgs, _item: &Item) -> Option<ResolvedUrl> {
    let url = args.url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
    Some(ResolvedUrl {
        url: url.to_string(),
        source: UrlSource::Argument,
    })
}

fn from_item_url(_args: &TaskArgs, item: &Item) -> Option<ResolvedUrl> {
    let url = item.url_text();
    if url.is_empty() {
        return None;
    }
    if !is_instagram_post_url(url) {
        tracing::debug!("Item URL is not an Instagram post URL, ignoring: {}", url);
        return None;
    }
    Some(ResolvedUrl {
        url: url.to_string(),
        source: UrlSource::ItemUrl,
    })
}

fn from_sidecar(_args: &TaskArgs, item: &Item) -> Option<ResolvedUrl> {
    let media = item.primary_file()?;
    let (path, data) = load_sidecar(media)?;
    let url = url_from_sidecar(&data)?;
    Some(ResolvedUrl {
        url,
        source: UrlSource::Sidecar(path),
    })
}
