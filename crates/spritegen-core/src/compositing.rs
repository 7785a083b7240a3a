use crate::error::{Result, SpriteError};
use crate::model::{ImageEntry, Package};
use image::{ImageFormat, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Composited sheet plus the images that could not be drawn onto it.
pub struct RenderedSheet {
    pub rgba: RgbaImage,
    /// Draw failures. The matching stylesheet rules are still emitted, so their
    /// class exists but points at a blank region.
    pub failures: Vec<SpriteError>,
}

/// Copy `src` into `canvas` with its top-left at (dx, dy). Pixels that fall
/// outside the canvas are clipped.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    let w = sw.min(cw.saturating_sub(dx));
    let h = sh.min(ch.saturating_sub(dy));
    for yy in 0..h {
        for xx in 0..w {
            let px = *src.get_pixel(xx, yy);
            canvas.put_pixel(dx + xx, dy + yy, px);
        }
    }
}

fn draw_entry(entry: &ImageEntry, canvas: &mut RgbaImage) -> Result<()> {
    let (cw, ch) = canvas.dimensions();
    let (left, top) = (entry.position.left, entry.position.top);
    if left >= cw || top >= ch {
        return Err(SpriteError::Draw {
            file: entry.file_name.clone(),
            left,
            top,
            width: cw,
            height: ch,
        });
    }
    blit_rgba(&entry.image, canvas, left, top);
    Ok(())
}

/// Composites every image of a packed package onto a transparent canvas.
///
/// A failed draw is logged and recorded; the remaining images are still drawn.
#[instrument(skip_all, fields(dir = %package.directory.display()))]
pub fn render_sheet(package: &Package) -> Result<RenderedSheet> {
    let size = package.size.ok_or_else(|| {
        SpriteError::InvalidConfig(format!(
            "package {} must be packed before rendering",
            package.directory.display()
        ))
    })?;
    debug!("Rendering sprite for directory \"{}\".", package.directory.display());

    let mut canvas = RgbaImage::new(size.width, size.height);
    let mut failures = Vec::new();
    for entry in &package.images {
        debug!(
            "\tRendering image \"{}\" ({}, {}, {}, {}).",
            entry.source.display(),
            entry.position.left,
            entry.position.top,
            entry.width(),
            entry.height()
        );
        if let Err(e) = draw_entry(entry, &mut canvas) {
            warn!("\t\t{} - \"{}\".", e, entry.source.display());
            failures.push(e);
        }
    }
    Ok(RenderedSheet {
        rgba: canvas,
        failures,
    })
}

/// Encodes `rgba` as PNG, streaming into `path`.
pub fn write_png(path: &Path, rgba: &RgbaImage) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    rgba.write_to(&mut writer, ImageFormat::Png)
        .map_err(|e| SpriteError::Encode(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Position, SheetSize};
    use image::Rgba;
    use std::path::Path;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(px))
    }

    #[test]
    fn blit_clips_at_canvas_edge() {
        let mut canvas = RgbaImage::new(4, 4);
        blit_rgba(&solid(3, 3, [9, 9, 9, 255]), &mut canvas, 2, 2);
        assert_eq!(canvas.get_pixel(3, 3)[0], 9);
        assert_eq!(canvas.get_pixel(1, 1)[3], 0);
    }

    #[test]
    fn render_requires_packed_package() {
        let pkg = Package::new(Path::new("/a"), "/a");
        assert!(render_sheet(&pkg).is_err());
    }

    #[test]
    fn unplaceable_image_is_reported_and_others_drawn() {
        let mut pkg = Package::new(Path::new("/a"), "/a");
        let mut ok = ImageEntry::new(solid(2, 2, [255, 0, 0, 255]), "ok.png", "/a/ok.png");
        ok.position = Position { top: 0, left: 0 };
        let mut off = ImageEntry::new(solid(2, 2, [0, 255, 0, 255]), "off.png", "/a/off.png");
        off.position = Position { top: 0, left: 10 };
        pkg.images = vec![ok, off];
        pkg.size = Some(SheetSize {
            width: 4,
            height: 2,
        });

        let sheet = render_sheet(&pkg).expect("render");
        assert_eq!(sheet.rgba.dimensions(), (4, 2));
        assert_eq!(*sheet.rgba.get_pixel(1, 1), Rgba([255, 0, 0, 255]));
        assert_eq!(sheet.failures.len(), 1);
        assert!(matches!(
            &sheet.failures[0],
            SpriteError::Draw { file, left: 10, .. } if file == "off.png"
        ));
    }
}
