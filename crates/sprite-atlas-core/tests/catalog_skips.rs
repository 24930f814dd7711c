use image::{Rgba, RgbaImage};
use sprite_atlas_core::prelude::*;
use sprite_atlas_core::scan_dir_with;
use std::fs;

fn png(path: &std::path::Path, w: u32, h: u32) {
    RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 255]))
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

#[test]
fn only_top_level_pngs_are_catalogued() {
    let dir = tempfile::tempdir().unwrap();
    png(&dir.path().join("home.png"), 24, 24);
    png(&dir.path().join("Search.PNG"), 16, 12);
    fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    png(&dir.path().join("nested").join("deep.png"), 8, 8);

    let cfg = AtlasConfig::default();
    let found = scan_dir(dir.path(), &cfg).expect("scan");
    let names: Vec<(&str, u32, u32)> = found
        .iter()
        .map(|d| (d.name.as_str(), d.width, d.height))
        .collect();
    assert_eq!(names, vec![("Search", 16, 12), ("home", 24, 24)]);
}

#[test]
fn undecodable_file_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    png(&dir.path().join("good.png"), 4, 4);
    fs::write(dir.path().join("broken.png"), b"definitely not a png").unwrap();

    let found = scan_dir(dir.path(), &AtlasConfig::default()).expect("scan");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "good");
}

fn truncated_png(path: &std::path::Path, w: u32, h: u32) {
    let mut img = RgbaImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            img.put_pixel(x, y, Rgba([(x * 7) as u8, (y * 13) as u8, (x ^ y) as u8, 255]));
        }
    }
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    // header stays valid, pixel data and IEND are cut short
    bytes.truncate(bytes.len() - 30);
    fs::write(path, bytes).unwrap();
}

#[test]
fn truncated_pixel_data_is_skipped_at_catalog_time() {
    let dir = tempfile::tempdir().unwrap();
    png(&dir.path().join("good.png"), 4, 4);
    truncated_png(&dir.path().join("bad.png"), 64, 64);

    let found = scan_dir(dir.path(), &AtlasConfig::default()).expect("scan");
    let names: Vec<&str> = found.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["good"]);
}

#[test]
fn truncated_png_does_not_abort_the_run() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    png(&src.path().join("good.png"), 4, 4);
    truncated_png(&src.path().join("bad.png"), 64, 64);

    let cfg = AtlasConfig::builder()
        .source_dir(src.path())
        .out_dir(out.path())
        .build();
    let written = run(&cfg).expect("run").expect("written");
    let manifest: Manifest =
        serde_json::from_str(&fs::read_to_string(&written.manifest_path).unwrap()).unwrap();
    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest["good"], Placement::new(0, 0, 4, 4));
}

#[test]
fn duplicate_stems_keep_the_first_in_file_name_order() {
    let dir = tempfile::tempdir().unwrap();
    png(&dir.path().join("icon.PNG"), 4, 4);
    png(&dir.path().join("icon.png"), 8, 8);

    let found = scan_dir(dir.path(), &AtlasConfig::default()).expect("scan");
    assert_eq!(found.len(), 1);
    // "icon.PNG" sorts before "icon.png" byte-wise
    assert_eq!((found[0].width, found[0].height), (4, 4));
}

#[test]
fn extra_extensions_can_be_enabled() {
    let dir = tempfile::tempdir().unwrap();
    png(&dir.path().join("a.png"), 4, 4);
    RgbaImage::from_pixel(3, 3, Rgba([1, 1, 1, 255]))
        .save_with_format(dir.path().join("b.bmp"), image::ImageFormat::Bmp)
        .unwrap();

    let only_png = scan_dir(dir.path(), &AtlasConfig::default()).unwrap();
    assert_eq!(only_png.len(), 1);

    let cfg = AtlasConfig::builder().extensions(["png", "bmp"]).build();
    let both = scan_dir(dir.path(), &cfg).unwrap();
    assert_eq!(both.len(), 2);
}

#[test]
fn filter_rejects_before_measuring() {
    let dir = tempfile::tempdir().unwrap();
    png(&dir.path().join("keep.png"), 4, 4);
    png(&dir.path().join("drop.png"), 4, 4);

    let found = scan_dir_with(dir.path(), &AtlasConfig::default(), |p| {
        !p.to_string_lossy().ends_with("drop.png")
    })
    .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "keep");
}

#[test]
fn file_as_source_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("a.png");
    png(&file, 2, 2);
    let err = scan_dir(&file, &AtlasConfig::default()).unwrap_err();
    assert!(matches!(err, AtlasError::SourceDir { .. }));
}
