use super::*;

fn jpeg_like(payload: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x80, 0x9C, 0x00];
    bytes.extend_from_slice(payload.as_bytes());
    bytes.extend_from_slice(&[0x00, 0xC3, 0x28, 0xFF, 0xD9]);
    bytes
}

#[test]
fn surrogate_pair_becomes_emoji_prefix() {
    let bytes = jpeg_like(r#"{"prompt": "x", "theme": "\ud83c\udf34 Jungle"}"#);
    assert_eq!(extract_theme(&bytes), vec!["🌴 Jungle".to_string()]);
}

#[test]
fn plain_label_without_emoji() {
    let bytes = jpeg_like(r#""theme":"Desert Night""#);
    assert_eq!(extract_theme(&bytes), vec!["Desert Night".to_string()]);
}

#[test]
fn missing_field_yields_empty() {
    assert!(extract_theme(&jpeg_like(r#"{"title": "nothing here"}"#)).is_empty());
    assert!(extract_theme(&[]).is_empty());
    assert!(extract_theme(&[0xFF, 0xFE, 0x00, 0x81]).is_empty());
}

#[test]
fn label_of_only_escapes_yields_empty() {
    let bytes = jpeg_like(r#""theme": "\ud83c\udf34 \u00e9""#);
    assert!(extract_theme(&bytes).is_empty());
}

#[test]
fn stray_escapes_and_non_ascii_are_stripped() {
    let bytes = jpeg_like("\"theme\": \"  Caf\\u00e9 Noir\u{00e9}  \"");
    assert_eq!(extract_theme(&bytes), vec!["Caf Noir".to_string()]);
}

#[test]
fn invalid_surrogate_pair_keeps_plain_label() {
    // Two high surrogates cannot form a code point; only the emoji is lost.
    let bytes = jpeg_like(r#""theme": "\ud83c\ud83c Broken""#);
    assert_eq!(extract_theme(&bytes), vec!["Broken".to_string()]);

    let bytes = jpeg_like(r#""theme": "\udf34\ud83c""#);
    assert!(extract_theme(&bytes).is_empty());
}

#[test]
fn escape_pair_decoding_reports_bad_utf16() {
    assert_eq!(decode_escape_pair("d83c", "df34").unwrap(), "🌴");
    assert!(matches!(
        decode_escape_pair("d83c", "d83c"),
        Err(ThemeScrapeError::Utf16(0xd83c, 0xd83c))
    ));
}

#[test]
fn first_field_match_wins() {
    let bytes = jpeg_like(r#""theme": "First" ... "theme": "Second""#);
    assert_eq!(extract_theme(&bytes), vec!["First".to_string()]);
}

#[test]
fn custom_field_name_is_escaped() {
    let x = PatternTagExtractor::with_field("mood.tag").unwrap();
    assert_eq!(
        x.extract_tag(&jpeg_like(r#""mood.tag": "Calm""#)).as_deref(),
        Some("Calm")
    );
    assert!(x.extract_tag(&jpeg_like(r#""moodxtag": "Calm""#)).is_none());
}
