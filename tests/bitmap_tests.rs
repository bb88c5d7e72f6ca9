use std::fs;
use std::path::PathBuf;

use blitline::bitmap;
use blitline::error::{AssetStage, RenderError};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("blitline-test-{}-{}", std::process::id(), name))
}

#[test]
fn test_missing_file_fails_at_open_stage() {
    let err = bitmap::load(&temp_path("does-not-exist.bmp")).unwrap_err();
    match err {
        RenderError::AssetLoad { stage, .. } => assert_eq!(stage, AssetStage::Open),
        other => panic!("expected AssetLoad, got {other:?}"),
    }
}

#[test]
fn test_garbage_file_fails_at_header_stage() {
    let path = temp_path("garbage.bmp");
    fs::write(&path, b"this is not a bitmap").unwrap();

    let err = bitmap::load(&path).unwrap_err();
    fs::remove_file(&path).ok();

    match err {
        RenderError::AssetLoad { stage, .. } => assert_eq!(stage, AssetStage::Header),
        other => panic!("expected AssetLoad, got {other:?}"),
    }
}

#[test]
fn test_load_matches_file_dimensions_and_pixels() {
    let path = temp_path("solid.png");
    image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
        .save(&path)
        .unwrap();

    let surface = bitmap::load(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(surface.width(), 3);
    assert_eq!(surface.height(), 2);
    assert_eq!(surface.pitch(), 12);
    assert_eq!(surface.pixel(0, 0), [10, 20, 30, 255]);
    assert_eq!(surface.pixel(2, 1), [10, 20, 30, 255]);
}

#[test]
fn test_convert_produces_matching_persistent_copy() {
    let path = temp_path("convert.png");
    image::RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255]))
        .save(&path)
        .unwrap();

    let scratch = bitmap::load(&path).unwrap();
    fs::remove_file(&path).ok();

    let session = bitmap::convert(&scratch);
    assert_eq!(session.width(), scratch.width());
    assert_eq!(session.height(), scratch.height());
    assert_eq!(session.data(), scratch.data());
}
