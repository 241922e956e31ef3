//! Sidecar metadata files written next to downloaded media
//!
//! Download tools such as yt-dlp and gallery-dl store a JSON document beside
//! each media file. yt-dlp names it after the file stem (`clip.info.json`),
//! gallery-dl after the full file name (`clip.mp4.json`); both are checked.

use instameta_domain::{PostKind, PostRef};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::extractors::{is_instagram_post_url, is_valid_shortcode};

/// Keys that may hold the post URL, most specific first
pub const SIDECAR_URL_KEYS: &[&str] = &["webpage_url", "post_url", "permalink", "url"];

/// Keys that may hold a bare shortcode
pub const SIDECAR_SHORTCODE_KEYS: &[&str] = &["shortcode", "post_shortcode", "code"];

const SIDECAR_SUFFIXES: &[&str] = &[".info.json", ".json"];

/// Candidate sidecar paths for a media file, in lookup order
pub fn sidecar_candidates(media_path: &Path) -> Vec<PathBuf> {
    let Some(file_name) = media_path.file_name().and_then(|n| n.to_str()) else {
        return Vec::new();
    };
    let dir = media_path.parent().unwrap_or_else(|| Path::new(""));

    let mut bases = vec![file_name.to_string()];
    if let Some(stem) = media_path.file_stem().and_then(|s| s.to_str()) {
        if stem != file_name {
            bases.push(stem.to_string());
        }
    }

    let mut candidates = Vec::new();
    for base in &bases {
        for suffix in SIDECAR_SUFFIXES {
            candidates.push(dir.join(format!("{}{}", base, suffix)));
        }
    }
    candidates
}

/// Load the first readable, parseable sidecar for a media file
pub fn load_sidecar(media_path: &Path) -> Option<(PathBuf, Value)> {
    for candidate in sidecar_candidates(media_path) {
        if !candidate.is_file() {
            continue;
        }
        let text = match std::fs::read_to_string(&candidate) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Skipping unreadable sidecar {:?}: {}", candidate, e);
                continue;
            }
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => {
                tracing::debug!("Loaded sidecar {:?}", candidate);
                return Some((candidate, value));
            }
            Err(e) => {
                tracing::warn!("Skipping malformed sidecar {:?}: {}", candidate, e);
            }
        }
    }
    None
}

/// Pick a post URL out of sidecar JSON.
///
/// Order: the first URL key holding an Instagram post URL, then a shortcode
/// key (turned into a `/p/` permalink), then the first non-empty URL key.
pub fn url_from_sidecar(data: &Value) -> Option<String> {
    let object = data.as_object()?;
    let string_at = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    if let Some(url) = SIDECAR_URL_KEYS
        .iter()
        .filter_map(|key| string_at(*key))
        .find(|url| is_instagram_post_url(url))
    {
        return Some(url.to_string());
    }

    if let Some(code) = SIDECAR_SHORTCODE_KEYS
        .iter()
        .filter_map(|key| string_at(*key))
        .find(|code| is_valid_shortcode(code))
    {
        return Some(PostRef::new(code, PostKind::Post).permalink());
    }

    SIDECAR_URL_KEYS
        .iter()
        .find_map(|key| string_at(*key))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_candidates_order() {
        let candidates = sidecar_candidates(Path::new("/media/clip.mp4"));
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/media/clip.mp4.info.json"),
                PathBuf::from("/media/clip.mp4.json"),
                PathBuf::from("/media/clip.info.json"),
                PathBuf::from("/media/clip.json"),
            ]
        );
    }

    #[test]
    fn test_candidates_without_extension() {
        let candidates = sidecar_candidates(Path::new("/media/clip"));
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_url_prefers_post_url_over_media_url() {
        let data = json!({
            "url": "https://scontent.cdninstagram.com/v/t51/123.mp4",
            "post_url": "https://www.instagram.com/p/GHI789/"
        });
        assert_eq!(
            url_from_sidecar(&data),
            Some("https://www.instagram.com/p/GHI789/".to_string())
        );
    }

    #[test]
    fn test_url_from_shortcode() {
        let data = json!({"shortcode": "JKL012"});
        assert_eq!(
            url_from_sidecar(&data),
            Some("https://www.instagram.com/p/JKL012/".to_string())
        );
    }

    #[test]
    fn test_url_falls_back_to_any_url() {
        let data = json!({"url": "https://example.com/video"});
        assert_eq!(
            url_from_sidecar(&data),
            Some("https://example.com/video".to_string())
        );
    }

    #[test]
    fn test_no_url() {
        assert_eq!(url_from_sidecar(&json!({"title": "x"})), None);
        assert_eq!(url_from_sidecar(&json!(["a"])), None);
    }
}
