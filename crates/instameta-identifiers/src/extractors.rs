//! Shortcode extraction from Instagram post URLs

use instameta_domain::{PostKind, PostRef};
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::error::{IdentifierError, Result};

lazy_static! {
    // Shortcodes are base64url-style: letters, digits, '_' and '-'
    static ref SHORTCODE_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();

    static ref SCHEME_REGEX: Regex = Regex::new(r"(?i)^[a-z][a-z0-9+.-]*://").unwrap();
}

/// Hosts that serve Instagram post pages
fn is_instagram_host(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    host == "instagram.com"
        || host.ends_with(".instagram.com")
        || host == "instagr.am"
        || host == "www.instagr.am"
}

/// Parse an Instagram post URL into a [`PostRef`].
///
/// Accepted shapes (scheme optional, any `*.instagram.com` host or `instagr.am`):
/// - `/p/<shortcode>`
/// - `/reel/<shortcode>`
/// - `/tv/<shortcode>`
/// - `/<username>/p/<shortcode>` (and the reel/tv equivalents)
///
/// Trailing slashes, query strings and fragments are ignored.
pub fn extract_post_ref(url: &str) -> Result<PostRef> {
    let invalid = || IdentifierError::InvalidUrl(url.to_string());

    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let with_scheme = if SCHEME_REGEX.is_match(trimmed) {
        trimmed.to_string()
    } else if let Some(rest) = trimmed.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = Url::parse(&with_scheme).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid());
    }
    if !parsed.host_str().is_some_and(is_instagram_host) {
        return Err(invalid());
    }

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    // Either /<kind>/<code> or /<username>/<kind>/<code>; a username may
    // itself read like a kind ("/p/p/<code>")
    let is_kind = |index: usize| {
        segments
            .get(index)
            .copied()
            .and_then(PostKind::from_path_segment)
            .is_some()
    };
    let kind_index = if is_kind(0) && !(is_kind(1) && segments.len() > 2) {
        0
    } else {
        1
    };
    let kind = segments
        .get(kind_index)
        .copied()
        .and_then(PostKind::from_path_segment)
        .ok_or_else(invalid)?;
    let shortcode = segments.get(kind_index + 1).copied().ok_or_else(invalid)?;

    if !SHORTCODE_REGEX.is_match(shortcode) {
        return Err(invalid());
    }

    Ok(PostRef::new(shortcode, kind))
}

/// Extract just the shortcode from a post URL
pub fn extract_shortcode(url: &str) -> Option<String> {
    extract_post_ref(url).ok().map(|r| r.shortcode)
}

/// Whether `url` is a recognized Instagram post URL
pub fn is_instagram_post_url(url: &str) -> bool {
    extract_post_ref(url).is_ok()
}

/// Whether `value` is usable as a bare shortcode
pub fn is_valid_shortcode(value: &str) -> bool {
    SHORTCODE_REGEX.is_match(value)
}
