//! Mapping raw Instagram post JSON onto a [`PostRecord`]
//!
//! Instagram has served several layouts over time; the media node is looked up
//! in each known location and fields are read from whichever variant is
//! present.

use chrono::{DateTime, NaiveDate, Utc};
use instameta_domain::{PostRecord, PostRef};
use serde_json::Value;

use crate::error::{InstametaError, Result};

/// JSON pointers to the media node, in lookup order
const MEDIA_POINTERS: &[&str] = &[
    "/graphql/shortcode_media",
    "/data/shortcode_media",
    "/data/xdt_shortcode_media",
    "/items/0",
];

/// Keys that mark an object as a media node itself
const MEDIA_MARKER_KEYS: &[&str] = &[
    "owner",
    "user",
    "username",
    "taken_at_timestamp",
    "taken_at",
    "timestamp",
];

const TIMESTAMP_KEYS: &[&str] = &["taken_at_timestamp", "taken_at", "timestamp"];

const SHORTCODE_KEYS: &[&str] = &["shortcode", "code"];

/// Map a fetched payload for `requested` into a post record
pub fn map_post(payload: &Value, requested: &PostRef) -> Result<PostRecord> {
    let media = media_node(payload)
        .ok_or_else(|| malformed("no media node in response"))?;

    let caption = caption_text(media).ok_or_else(|| malformed("caption missing"))?;
    let post_date = post_date(media)?;
    let username = username(media).ok_or_else(|| malformed("owner username missing"))?;

    let shortcode = SHORTCODE_KEYS
        .iter()
        .find_map(|key| non_empty_str(media.get(*key)))
        .unwrap_or(requested.shortcode.as_str())
        .to_string();
    let permalink = PostRef::new(shortcode.clone(), requested.kind).permalink();

    Ok(PostRecord {
        caption,
        post_date,
        permalink,
        username,
        shortcode,
    })
}

fn malformed(reason: &str) -> InstametaError {
    InstametaError::MalformedResponse(reason.to_string())
}

fn media_node(payload: &Value) -> Option<&Value> {
    MEDIA_POINTERS
        .iter()
        .find_map(|pointer| payload.pointer(pointer).filter(|v| v.is_object()))
        .or_else(|| {
            let object = payload.as_object()?;
            MEDIA_MARKER_KEYS
                .iter()
                .any(|key| object.contains_key(*key))
                .then_some(payload)
        })
}

/// Caption text. `Some("")` when the post explicitly has no caption.
fn caption_text(media: &Value) -> Option<String> {
    if let Some(edges) = media
        .pointer("/edge_media_to_caption/edges")
        .and_then(Value::as_array)
    {
        let text = edges
            .first()
            .and_then(|edge| edge.pointer("/node/text"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Some(text.to_string());
    }

    match media.get("caption")? {
        Value::String(text) => Some(text.clone()),
        Value::Object(caption) => Some(
            caption
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        ),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

fn post_date(media: &Value) -> Result<NaiveDate> {
    let raw = TIMESTAMP_KEYS
        .iter()
        .find_map(|key| media.get(*key).filter(|v| !v.is_null()))
        .ok_or_else(|| malformed("timestamp missing"))?;

    parse_timestamp(raw)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| malformed(&format!("unrecognized timestamp {}", raw)))
}

/// Unix seconds (number or numeric string) or an RFC 3339 string, as UTC
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(secs) => DateTime::from_timestamp(secs, 0),
                Err(_) => DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc)),
            }
        }
        _ => None,
    }
}

fn username(media: &Value) -> Option<String> {
    ["/owner/username", "/user/username", "/username"]
        .iter()
        .find_map(|pointer| non_empty_str(media.pointer(pointer)))
        .map(str::to_string)
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use instameta_domain::PostKind;
    use serde_json::json;

    fn post_ref() -> PostRef {
        PostRef::new("ABC123", PostKind::Post)
    }

    #[test]
    fn test_graphql_layout() {
        let payload = json!({
            "graphql": {"shortcode_media": {
                "shortcode": "ABC123",
                "taken_at_timestamp": 1684333330,
                "edge_media_to_caption": {"edges": [{"node": {"text": "Sunset"}}]},
                "owner": {"username": "alice"}
            }}
        });
        let record = map_post(&payload, &post_ref()).unwrap();
        assert_eq!(record.caption, "Sunset");
        assert_eq!(record.date_string(), "2023-05-17");
        assert_eq!(record.username, "alice");
        assert_eq!(record.permalink, "https://www.instagram.com/p/ABC123/");
    }

    #[test]
    fn test_items_layout() {
        let payload = json!({
            "items": [{
                "code": "Reel99",
                "taken_at": 1641081600,
                "caption": {"text": "Dance"},
                "user": {"username": "bob"}
            }]
        });
        let record = map_post(&payload, &PostRef::new("Reel99", PostKind::Reel)).unwrap();
        assert_eq!(record.caption, "Dance");
        assert_eq!(record.date_string(), "2022-01-02");
        assert_eq!(record.username, "bob");
        assert_eq!(record.shortcode, "Reel99");
        assert_eq!(record.permalink, "https://www.instagram.com/reel/Reel99/");
    }

    #[test]
    fn test_public_graphql_layout() {
        let payload = json!({
            "data": {"shortcode_media": {
                "shortcode": "ABC123",
                "taken_at_timestamp": "1684333330",
                "edge_media_to_caption": {"edges": []},
                "owner": {"username": "carol"}
            }},
            "status": "ok"
        });
        let record = map_post(&payload, &post_ref()).unwrap();
        assert_eq!(record.caption, "");
        assert_eq!(record.username, "carol");
    }

    #[test]
    fn test_flat_layout_with_rfc3339() {
        let payload = json!({
            "caption": "Hi",
            "timestamp": "2023-05-17T14:22:10Z",
            "username": "alice"
        });
        let record = map_post(&payload, &post_ref()).unwrap();
        assert_eq!(record.date_string(), "2023-05-17");
        assert_eq!(record.shortcode, "ABC123");
    }

    #[test]
    fn test_timestamp_is_converted_to_utc() {
        let payload = json!({
            "caption": "late",
            "timestamp": "2023-05-17T23:30:00-05:00",
            "username": "alice"
        });
        let record = map_post(&payload, &post_ref()).unwrap();
        assert_eq!(record.date_string(), "2023-05-18");
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let no_owner = json!({"graphql": {"shortcode_media": {
            "taken_at_timestamp": 1, "caption": "x"
        }}});
        assert!(matches!(
            map_post(&no_owner, &post_ref()),
            Err(InstametaError::MalformedResponse(_))
        ));

        let no_time = json!({"items": [{"caption": "x", "user": {"username": "a"}}]});
        assert!(matches!(
            map_post(&no_time, &post_ref()),
            Err(InstametaError::MalformedResponse(_))
        ));

        let no_caption = json!({"items": [{"taken_at": 1, "user": {"username": "a"}}]});
        assert!(matches!(
            map_post(&no_caption, &post_ref()),
            Err(InstametaError::MalformedResponse(_))
        ));

        assert!(matches!(
            map_post(&json!({"status": "fail"}), &post_ref()),
            Err(InstametaError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert_eq!(
            parse_timestamp(&json!(0)).map(|d| d.to_rfc3339()),
            Some("1970-01-01T00:00:00+00:00".to_string())
        );
        assert!(parse_timestamp(&json!("yesterday")).is_none());
        assert!(parse_timestamp(&json!(true)).is_none());
    }
}
