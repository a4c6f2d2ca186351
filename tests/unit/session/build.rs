use std::io::Cursor;

use super::*;

fn png_item(width: u32, height: u32, title: &str) -> ImageSourceItem {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 120, 200, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    ImageSourceItem::new(buf, title)
}

fn opts(width: u32) -> CollageOptions {
    CollageOptions {
        width,
        ..CollageOptions::default()
    }
}

fn builder() -> CollageBuilder {
    CollageBuilder::new(
        BuildOpts {
            threads: Some(2),
            ..BuildOpts::default()
        },
        CaptionStyle::default(),
    )
    .unwrap()
}

#[test]
fn decode_all_keeps_order() {
    let items = vec![png_item(4, 2, "a"), png_item(2, 4, "b"), png_item(3, 3, "c")];
    let decoded = decode_all(&items, DecodeLimits::default()).unwrap();
    let dims: Vec<_> = decoded.iter().map(|d| (d.dimensions(), d.source_index)).collect();
    assert_eq!(dims, vec![((4, 2), 0), ((2, 4), 1), ((3, 3), 2)]);
}

#[test]
fn one_bad_item_fails_the_batch() {
    let items = vec![
        png_item(4, 2, "a"),
        ImageSourceItem::new(b"broken".to_vec(), "b"),
        png_item(3, 3, "c"),
    ];
    let err = decode_all(&items, DecodeLimits::default()).unwrap_err();
    assert!(matches!(err, CollageError::Decode { index: 1, .. }));

    let err = build_collage(
        &items,
        &opts(64),
        &CaptionStyle::default(),
        &BuildOpts::default(),
    )
    .unwrap_err();
    assert!(err.is_decode());
}

#[test]
fn build_collage_height_comes_from_layout() {
    let items = vec![png_item(40, 20, "a"), png_item(20, 20, "b")];
    let options = CollageOptions {
        width: 80,
        height: 9999,
        ..CollageOptions::default()
    };
    let out = build_collage(&items, &options, &CaptionStyle::default(), &BuildOpts::default())
        .unwrap();
    // Two rows (one image each): 80x40 and 80x80.
    assert_eq!((out.width, out.height), (80, 120));
}

#[test]
fn empty_and_invalid_requests_are_rejected() {
    let style = CaptionStyle::default();
    assert!(build_collage(&[], &opts(64), &style, &BuildOpts::default()).is_err());
    assert!(build_collage(&[png_item(2, 2, "a")], &opts(0), &style, &BuildOpts::default()).is_err());
}

#[test]
fn zero_threads_is_rejected() {
    let opts = BuildOpts {
        threads: Some(0),
        ..BuildOpts::default()
    };
    assert!(CollageBuilder::new(opts, CaptionStyle::default()).is_err());
}

#[test]
fn generations_increase_monotonically() {
    let b = builder();
    assert_eq!(b.latest_generation(), 0);
    let t1 = b.begin();
    let t2 = b.begin();
    assert_eq!((t1.generation(), t2.generation()), (1, 2));
    assert!(!b.is_current(t1));
    assert!(b.is_current(t2));
}

#[test]
fn stale_build_is_discarded_not_published() {
    let b = builder();
    let items = vec![png_item(8, 8, "a")];

    let old = b.begin();
    let new = b.begin();

    let out = b.run(new, &items, &opts(32)).unwrap();
    let published = out.published().unwrap().clone();
    assert_eq!(published.generation, 2);

    // The older build finishes last and must not overwrite the newer result.
    let out = b.run(old, &items, &opts(64)).unwrap();
    assert!(matches!(
        out,
        BuildOutcome::Superseded {
            generation: 1,
            latest: 2
        }
    ));
    let current = b.current().unwrap();
    assert_eq!(current.generation, 2);
    assert_eq!(current.collage.width, 32);
}

#[test]
fn stale_build_is_discarded_even_before_newer_finishes() {
    let b = builder();
    let items = vec![png_item(8, 8, "a")];
    let old = b.begin();
    let _new = b.begin();
    assert!(b.run(old, &items, &opts(32)).unwrap().published().is_none());
    assert!(b.current().is_none());
}

#[test]
fn stale_failures_are_swallowed_current_failures_surface() {
    let b = builder();
    let bad = vec![ImageSourceItem::new(b"nope".to_vec(), "x")];

    let old = b.begin();
    let current = b.begin();
    assert!(b.run(old, &bad, &opts(32)).unwrap().published().is_none());
    assert!(b.run(current, &bad, &opts(32)).unwrap_err().is_decode());
    assert!(b.current().is_none());
}

#[test]
fn run_with_extractor_attaches_themes_before_compositing() {
    struct LenTag;
    impl TagExtractor for LenTag {
        fn extract_tag(&self, bytes: &[u8]) -> Option<String> {
            Some(format!("{} bytes", bytes.len()))
        }
    }

    let b = builder();
    let mut items = vec![png_item(8, 4, "a"), png_item(4, 8, "b")];
    let options = CollageOptions {
        width: 40,
        show_themes: true,
        ..CollageOptions::default()
    };
    let ticket = b.begin();
    let out = b
        .run_with_extractor(ticket, &mut items, &options, &LenTag)
        .unwrap();
    assert!(out.published().is_some());
    for item in &items {
        assert_eq!(
            item.theme.as_deref(),
            Some(format!("{} bytes", item.bytes.len()).as_str())
        );
    }
}
