use super::*;

struct FixedTag;

impl TagExtractor for FixedTag {
    fn extract_tag(&self, bytes: &[u8]) -> Option<String> {
        (!bytes.is_empty()).then(|| format!("len{}", bytes.len()))
    }
}

fn items() -> Vec<ImageSourceItem> {
    vec![
        ImageSourceItem::new(vec![1, 2, 3], "a"),
        ImageSourceItem::new(vec![], "b").with_theme("stale"),
        ImageSourceItem::new(vec![9], "c"),
    ]
}

#[test]
fn default_extract_wraps_tag_in_list() {
    assert_eq!(FixedTag.extract(&[1]), vec!["len1".to_string()]);
    assert!(FixedTag.extract(&[]).is_empty());
}

#[test]
fn extract_themes_keeps_item_order() {
    let out = extract_themes(&items(), &FixedTag);
    assert_eq!(
        out,
        vec![vec!["len3".to_string()], vec![], vec!["len1".to_string()]]
    );
}

#[test]
fn attach_overwrites_and_clears() {
    let mut items = items();
    attach_themes(&mut items, &FixedTag);
    assert_eq!(items[0].theme.as_deref(), Some("len3"));
    assert_eq!(items[1].theme, None);
    assert_eq!(items[2].theme.as_deref(), Some("len1"));

    clear_themes(&mut items);
    assert!(items.iter().all(|i| i.theme.is_none()));
}
