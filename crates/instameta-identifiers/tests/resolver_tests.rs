//! URL resolution and shortcode extraction integration tests

use instameta_domain::{Item, ItemKind, PostKind, TaskArgs};
use instameta_identifiers::{
    extract_post_ref, resolve_post_url, IdentifierError, UrlSource,
};
use rstest::rstest;
use std::fs;
use tempfile::TempDir;

// === Shortcode extraction ===

#[rstest]
#[case("https://www.instagram.com/p/ABC123/", "ABC123", PostKind::Post)]
#[case("https://www.instagram.com/p/ABC123", "ABC123", PostKind::Post)]
#[case("https://www.instagram.com/p/ABC123/?utm_source=ig_web_copy_link", "ABC123", PostKind::Post)]
#[case("https://www.instagram.com/p/ABC123/#comments", "ABC123", PostKind::Post)]
#[case("http://instagram.com/p/ABC123?img_index=2#x", "ABC123", PostKind::Post)]
#[case("https://m.instagram.com/reel/Cz_9-Qr/", "Cz_9-Qr", PostKind::Reel)]
#[case("www.instagram.com/tv/B7xYz12/", "B7xYz12", PostKind::Tv)]
#[case("https://instagr.am/p/XYZ/", "XYZ", PostKind::Post)]
#[case("https://www.instagram.com/alice/reel/R3el/", "R3el", PostKind::Reel)]
fn test_extracts_shortcode(#[case] url: &str, #[case] shortcode: &str, #[case] kind: PostKind) {
    let post = extract_post_ref(url).unwrap();
    assert_eq!(post.shortcode, shortcode);
    assert_eq!(post.kind, kind);
}

#[rstest]
#[case("https://www.instagram.com/alice/")]
#[case("https://www.instagram.com/stories/alice/3141592653/")]
#[case("https://www.instagram.com/explore/tags/cats/")]
#[case("https://www.youtube.com/watch?v=abc")]
#[case("https://www.instagram.com/reels/audio/123/")]
#[case("not a url")]
fn test_rejects_non_post_urls(#[case] url: &str) {
    assert_eq!(
        extract_post_ref(url),
        Err(IdentifierError::InvalidUrl(url.to_string()))
    );
}

// === Resolution ===

fn media_dir_with(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

#[test]
fn test_sidecar_used_when_no_other_source() {
    let dir = media_dir_with(&[
        ("clip.mp4", ""),
        ("clip.info.json", r#"{"webpage_url": "https://instagram.com/p/XYZ/"}"#),
    ]);
    let item = Item::new(ItemKind::Scene, "5").with_file(dir.path().join("clip.mp4"));

    let resolved = resolve_post_url(&TaskArgs::default(), &item).unwrap();
    assert_eq!(resolved.url, "https://instagram.com/p/XYZ/");
    assert_eq!(
        resolved.source,
        UrlSource::Sidecar(dir.path().join("clip.info.json"))
    );
}

#[test]
fn test_gallery_dl_style_sidecar() {
    let dir = media_dir_with(&[
        ("photo.jpg", ""),
        (
            "photo.jpg.json",
            r#"{"post_shortcode": "GdL0001", "url": "https://scontent.cdninstagram.com/x.jpg"}"#,
        ),
    ]);
    let item = Item::new(ItemKind::Image, "8").with_file(dir.path().join("photo.jpg"));

    let resolved = resolve_post_url(&TaskArgs::default(), &item).unwrap();
    assert_eq!(resolved.url, "https://www.instagram.com/p/GdL0001/");
}

#[test]
fn test_malformed_sidecar_falls_through_to_next_candidate() {
    let dir = media_dir_with(&[
        ("clip.mp4", ""),
        ("clip.mp4.info.json", "{not json"),
        ("clip.json", r#"{"url": "https://www.instagram.com/reel/Next1/"}"#),
    ]);
    let item = Item::new(ItemKind::Scene, "5").with_file(dir.path().join("clip.mp4"));

    let resolved = resolve_post_url(&TaskArgs::default(), &item).unwrap();
    assert_eq!(resolved.url, "https://www.instagram.com/reel/Next1/");
}

#[test]
fn test_only_first_media_file_is_consulted() {
    let dir = media_dir_with(&[
        ("a.mp4", ""),
        ("b.mp4", ""),
        ("b.info.json", r#"{"webpage_url": "https://instagram.com/p/B0nly/"}"#),
    ]);
    let item = Item::new(ItemKind::Scene, "5")
        .with_file(dir.path().join("a.mp4"))
        .with_file(dir.path().join("b.mp4"));

    assert_eq!(
        resolve_post_url(&TaskArgs::default(), &item),
        Err(IdentifierError::NoUrlFound)
    );
}

#[test]
fn test_item_url_beats_sidecar() {
    let dir = media_dir_with(&[
        ("clip.mp4", ""),
        ("clip.info.json", r#"{"webpage_url": "https://instagram.com/p/SIDE1/"}"#),
    ]);
    let item = Item::new(ItemKind::Scene, "5")
        .with_url("https://www.instagram.com/p/ITEM1/")
        .with_file(dir.path().join("clip.mp4"));

    let resolved = resolve_post_url(&TaskArgs::default(), &item).unwrap();
    assert_eq!(resolved.url, "https://www.instagram.com/p/ITEM1/");
}
