use super::*;

const WHITE: TextBrushRgba8 = TextBrushRgba8 {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};

#[test]
fn garbage_font_bytes_are_rejected() {
    assert!(TextLayoutEngine::new(b"not a font").is_err());
}

#[test]
fn line_layout_with_fixture_font() {
    let font_bytes = std::fs::read("tests/data/fonts/DejaVuSans.ttf").unwrap();

    let mut engine = TextLayoutEngine::new(&font_bytes).unwrap();
    let layout = engine.layout_line("Jungle", 16.0, WHITE).unwrap();
    assert_eq!(layout.lines().count(), 1);
    assert!(layout.width() > 0.0);

    let wide = engine.layout_line("MMMMMM", 16.0, WHITE).unwrap();
    let narrow = engine.layout_line("ii", 16.0, WHITE).unwrap();
    assert!(wide.width() > narrow.width() * 3.0);

    assert!(engine.layout_line("x", 0.0, WHITE).is_err());
}
