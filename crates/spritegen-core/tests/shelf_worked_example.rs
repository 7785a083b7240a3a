use image::RgbaImage;
use spritegen_core::prelude::*;
use std::path::Path;

fn package(sizes: &[(&str, u32, u32)]) -> Package {
    let mut pkg = Package::new(Path::new("/assets"), "/assets");
    for (name, w, h) in sizes {
        pkg.images.push(ImageEntry::new(
            RgbaImage::new(*w, *h),
            *name,
            Path::new("/assets").join(name),
        ));
    }
    pkg
}

fn position_of(pkg: &Package, name: &str) -> Position {
    pkg.images
        .iter()
        .find(|e| e.file_name == name)
        .map(|e| e.position)
        .expect("entry present")
}

#[test]
fn three_images_stack_into_three_rows() {
    let mut pkg = package(&[("A.png", 100, 50), ("B.png", 80, 30), ("C.png", 60, 60)]);
    let size = ShelfPacker::new(2).pack(&mut pkg).expect("pack");

    assert_eq!(size, SheetSize { width: 100, height: 144 });
    assert_eq!(pkg.size, Some(size));
    assert_eq!(position_of(&pkg, "C.png"), Position { top: 0, left: 2 });
    assert_eq!(position_of(&pkg, "B.png"), Position { top: 62, left: 2 });
    assert_eq!(position_of(&pkg, "A.png"), Position { top: 94, left: 2 });
}

#[test]
fn worked_example_stylesheet() {
    let mut pkg = package(&[("A.png", 100, 50), ("B.png", 80, 30), ("C.png", 60, 60)]);
    ShelfPacker::new(2).pack(&mut pkg).expect("pack");

    let css = to_css(&pkg, SHEET_FILE_NAME);
    let expected = concat!(
        ".A-png {\n",
        "\tbackground-image: url(\"sprite.png\");\n",
        "\tbackground-repeat: no-repeat;\n",
        "\tbackground-position: -2px -94px;\n",
        "\twidth: 100px;\n",
        "\theight: 50px;\n",
        "}\n\n",
        ".B-png {\n",
        "\tbackground-image: url(\"sprite.png\");\n",
        "\tbackground-repeat: no-repeat;\n",
        "\tbackground-position: -2px -62px;\n",
        "\twidth: 80px;\n",
        "\theight: 30px;\n",
        "}\n\n",
        ".C-png {\n",
        "\tbackground-image: url(\"sprite.png\");\n",
        "\tbackground-repeat: no-repeat;\n",
        "\tbackground-position: -2px 0px;\n",
        "\twidth: 60px;\n",
        "\theight: 60px;\n",
        "}\n\n",
    );
    assert_eq!(css, expected);
}

#[test]
fn packing_keeps_package_order() {
    let mut pkg = package(&[("A.png", 100, 50), ("B.png", 80, 30), ("C.png", 60, 60)]);
    ShelfPacker::new(2).pack(&mut pkg).expect("pack");
    let names: Vec<&str> = pkg.images.iter().map(|e| e.file_name.as_str()).collect();
    assert_eq!(names, vec!["A.png", "B.png", "C.png"]);
}

#[test]
fn config_padding_reaches_the_packer() {
    let cfg = SpriteConfig::builder().directory("/assets").padding(0).build();
    let mut pkg = package(&[("a.png", 10, 10), ("b.png", 10, 10), ("c.png", 20, 5)]);
    let size = pack_package(&mut pkg, &cfg).expect("pack");
    // Sorted: a(100010), b(100010), c(200005); a and b share the first row exactly.
    assert_eq!(size, SheetSize { width: 20, height: 15 });
    assert_eq!(position_of(&pkg, "a.png"), Position { top: 0, left: 0 });
    assert_eq!(position_of(&pkg, "b.png"), Position { top: 0, left: 10 });
    assert_eq!(position_of(&pkg, "c.png"), Position { top: 10, left: 0 });
}

#[test]
fn empty_package_cannot_be_packed() {
    let mut pkg = package(&[]);
    assert!(matches!(
        ShelfPacker::new(2).pack(&mut pkg),
        Err(SpriteError::Empty)
    ));
    assert!(!pkg.is_packed());
}
