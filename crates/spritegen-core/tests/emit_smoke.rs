use image::{Rgba, RgbaImage};
use spritegen_core::prelude::*;
use std::path::Path;

fn packed_package() -> Package {
    let mut pkg = Package::new(Path::new("/assets"), "/assets/ui");
    pkg.images.push(ImageEntry::new(
        RgbaImage::from_pixel(4, 2, Rgba([255, 0, 0, 255])),
        "red_bar.png",
        "/assets/ui/red_bar.png",
    ));
    pkg.images.push(ImageEntry::new(
        RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255])),
        "blue.png",
        "/assets/ui/blue.png",
    ));
    ShelfPacker::new(1).pack(&mut pkg).expect("pack");
    pkg
}

#[test]
fn sheet_pixels_follow_positions() {
    let pkg = packed_package();
    let sheet = render_sheet(&pkg).expect("render");
    assert!(sheet.failures.is_empty());
    let size = pkg.size.expect("packed");
    assert_eq!(sheet.rgba.dimensions(), (size.width, size.height));
    for entry in &pkg.images {
        let r = entry.rect();
        if r.x < size.width && r.y < size.height {
            assert_eq!(sheet.rgba.get_pixel(r.x, r.y), entry.image.get_pixel(0, 0));
        }
    }
}

#[test]
fn colliding_selectors_keep_the_later_frame() {
    let mut pkg = Package::new(Path::new("/assets"), "/assets/ui");
    pkg.images.push(ImageEntry::new(RgbaImage::new(3, 3), "a_b.png", "/assets/ui/a_b.png"));
    pkg.images.push(ImageEntry::new(RgbaImage::new(5, 5), "a.b.png", "/assets/ui/a.b.png"));
    ShelfPacker::new(0).pack(&mut pkg).expect("pack");

    assert_eq!(duplicate_selectors(&pkg), vec!["ui-a-b-png".to_string()]);
    let value = to_json(&pkg, SHEET_FILE_NAME);
    let frames = value["frames"].as_object().expect("frames object");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames["ui-a-b-png"]["file"], "a.b.png");
    assert_eq!(to_css(&pkg, SHEET_FILE_NAME).matches(".ui-a-b-png {").count(), 2);
}

#[test]
fn png_round_trips_through_disk() {
    let pkg = packed_package();
    let sheet = render_sheet(&pkg).expect("render");
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SHEET_FILE_NAME);
    write_png(&path, &sheet.rgba).expect("write");
    let back = decode_raster(&path).expect("decode");
    assert_eq!(back.dimensions(), sheet.rgba.dimensions());
}

#[test]
fn json_metadata_is_keyed_by_selector() {
    let pkg = packed_package();
    let value = to_json(&pkg, SHEET_FILE_NAME);
    let frames = value["frames"].as_object().expect("frames object");
    assert!(frames.contains_key("ui-red-bar-png"));
    assert!(frames.contains_key("ui-blue-png"));
    assert_eq!(frames["ui-blue-png"]["file"], "blue.png");
    assert_eq!(value["meta"]["sheet"], "sprite.png");
    assert_eq!(value["meta"]["namespace"], "ui-");
    assert_eq!(value["meta"]["size"]["w"], pkg.size.expect("packed").width);
}

#[test]
fn css_has_one_rule_per_image() {
    let pkg = packed_package();
    let css = to_css(&pkg, SHEET_FILE_NAME);
    assert_eq!(css.matches("background-image").count(), 2);
    assert!(css.contains(".ui-red-bar-png {"));
    assert!(css.contains(".ui-blue-png {"));
}

#[test]
fn stats_cover_all_images() {
    let pkg = packed_package();
    let stats = pkg.stats();
    assert_eq!(stats.num_images, 2);
    assert_eq!(stats.used_area, 4 * 2 + 2 * 2);
    assert!(stats.occupancy > 0.0);
    assert!(stats.summary().contains("Images: 2"));
}
