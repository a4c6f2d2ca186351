use super::*;

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn parse_minimal_manifest() {
    let json = r#"{ "items": [ { "source": "a.png" }, { "source": "b.png", "title": "B", "theme": "Sea" } ] }"#;
    let m = Manifest::from_reader(json.as_bytes()).unwrap();
    assert_eq!(m.options, CollageOptions::default());
    assert_eq!(m.items.len(), 2);
    assert_eq!(m.items[1].title.as_deref(), Some("B"));
    assert_eq!(m.items[1].theme.as_deref(), Some("Sea"));
    assert!(m.font.is_none());
}

#[test]
fn manifest_rejects_bad_options_and_paths() {
    let zero = r#"{ "options": { "width": 0 }, "items": [] }"#;
    assert!(Manifest::from_reader(zero.as_bytes()).is_err());

    let escape = r#"{ "items": [ { "source": "../secret.png" } ] }"#;
    assert!(Manifest::from_reader(escape.as_bytes()).is_err());

    let unknown = r#"{ "items": [], "extra": 1 }"#;
    assert!(Manifest::from_reader(unknown.as_bytes()).is_err());
}

#[test]
fn load_items_reads_bytes_and_defaults_titles() {
    let dir = std::path::PathBuf::from("target").join("manifest_load_items");
    std::fs::create_dir_all(dir.join("imgs")).unwrap();
    std::fs::write(dir.join("imgs/one.png"), b"one").unwrap();
    std::fs::write(dir.join("two.png"), b"two").unwrap();

    let json = r#"{ "items": [ { "source": "imgs/one.png" }, { "source": "two.png", "title": "Second" } ] }"#;
    let m = Manifest::from_reader(json.as_bytes()).unwrap();
    let items = m.load_items(&dir).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].bytes, b"one");
    assert_eq!(items[0].title, "one.png");
    assert_eq!(items[1].title, "Second");
    assert!(m.load_font(&dir).unwrap().is_none());

    let missing = r#"{ "items": [ { "source": "nope.png" } ] }"#;
    let m = Manifest::from_reader(missing.as_bytes()).unwrap();
    assert!(m.load_items(&dir).is_err());
}
