use std::io::Cursor;

use super::*;

fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let buf = png_bytes(1, 1, [100, 50, 200, 128]);

    let decoded = decode_image(&buf, 7, DecodeLimits::default()).unwrap();
    assert_eq!(decoded.dimensions(), (1, 1));
    assert_eq!(decoded.source_index, 7);
    assert_eq!(
        decoded.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn aspect_ratio_is_exact() {
    let buf = png_bytes(30, 20, [0, 0, 0, 255]);
    let decoded = decode_image(&buf, 0, DecodeLimits::default()).unwrap();
    assert_eq!(decoded.aspect_ratio(), 1.5);
    assert_eq!(decoded.rgba8_premul.len(), 30 * 20 * 4);
}

#[test]
fn garbage_bytes_are_a_decode_error() {
    let err = decode_image(b"definitely not an image", 2, DecodeLimits::default()).unwrap_err();
    assert!(err.is_decode());
    assert!(err.to_string().contains("item 2"));
}

#[test]
fn truncated_png_is_a_decode_error() {
    let buf = png_bytes(8, 8, [1, 2, 3, 255]);
    let truncated = &buf[..buf.len() / 2];
    assert!(
        decode_image(truncated, 0, DecodeLimits::default())
            .unwrap_err()
            .is_decode()
    );
}

#[test]
fn limits_reject_oversized_sources() {
    let buf = png_bytes(64, 4, [1, 2, 3, 255]);
    let limits = DecodeLimits {
        max_width: 32,
        ..DecodeLimits::default()
    };
    assert!(decode_image(&buf, 0, limits).unwrap_err().is_decode());
}
