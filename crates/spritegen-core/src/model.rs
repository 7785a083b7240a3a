use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Returns true if the two rectangles share at least one pixel.
    pub fn intersects(&self, r: &Rect) -> bool {
        !(self.x >= r.x + r.w || r.x >= self.x + self.w || self.y >= r.y + r.h || r.y >= self.y + self.h)
    }
}

/// Placement of an image inside its sheet. Written once by the packer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Position {
    pub top: u32,
    pub left: u32,
}

/// Final sheet dimensions, known once a package has been packed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SheetSize {
    pub width: u32,
    pub height: u32,
}

/// One decoded source image and its place in the sheet.
#[derive(Debug, Clone)]
pub struct ImageEntry {
    pub image: RgbaImage,
    /// Output-facing name. Vector sources carry their rasterized name (`icon.svg.png`).
    pub file_name: String,
    /// Where the image was read from.
    pub source: PathBuf,
    pub position: Position,
}

impl ImageEntry {
    pub fn new(image: RgbaImage, file_name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            image,
            file_name: file_name.into(),
            source: source.into(),
            position: Position::default(),
        }
    }
    pub fn width(&self) -> u32 {
        self.image.width()
    }
    pub fn height(&self) -> u32 {
        self.image.height()
    }
    /// Occupied rectangle at the current position.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.position.left,
            self.position.top,
            self.width(),
            self.height(),
        )
    }
}

/// The images of one directory and, after packing, their layout in one sheet.
#[derive(Debug, Clone)]
pub struct Package {
    /// Selector prefix derived from the directory's path relative to the scan root.
    /// Empty for the root; otherwise ends with `-`.
    pub namespace: String,
    pub directory: PathBuf,
    /// Unset until the package is packed.
    pub size: Option<SheetSize>,
    pub images: Vec<ImageEntry>,
}

impl Package {
    pub fn new(root: &Path, directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        Self {
            namespace: namespace_label(root, &directory),
            directory,
            size: None,
            images: Vec::new(),
        }
    }

    pub fn is_packed(&self) -> bool {
        self.size.is_some()
    }

    /// Computes fill statistics for the packed sheet.
    pub fn stats(&self) -> SheetStats {
        let (width, height) = self
            .size
            .map(|s| (s.width, s.height))
            .unwrap_or((0, 0));
        let sheet_area = (width as u64) * (height as u64);
        let used_area: u64 = self
            .images
            .iter()
            .map(|e| (e.width() as u64) * (e.height() as u64))
            .sum();
        let occupancy = if sheet_area > 0 {
            used_area as f64 / sheet_area as f64
        } else {
            0.0
        };
        SheetStats {
            num_images: self.images.len(),
            width,
            height,
            sheet_area,
            used_area,
            occupancy,
        }
    }
}

/// Statistics about how well a sheet is filled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SheetStats {
    pub num_images: usize,
    pub width: u32,
    pub height: u32,
    /// `width * height` of the sheet.
    pub sheet_area: u64,
    /// Sum of image areas.
    pub used_area: u64,
    /// used_area / sheet_area (0.0 to 1.0). May exceed 1.0 only when the
    /// widest image overhangs the sheet by its padding.
    pub occupancy: f64,
}

impl SheetStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Images: {}, Sheet: {}x{}, Occupancy: {:.2}%, Used Area: {} px²",
            self.num_images,
            self.width,
            self.height,
            self.occupancy * 100.0,
            self.used_area,
        )
    }
}

/// Builds the selector prefix for `dir`: its path components relative to
/// `root`, with separators and spaces turned into `-`, plus a trailing `-`.
pub fn namespace_label(root: &Path, dir: &Path) -> String {
    let rel = dir.strip_prefix(root).unwrap_or(dir);
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().replace(' ', "-")),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        let mut label = parts.join("-");
        label.push('-');
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_is_empty_for_root() {
        let root = Path::new("/assets");
        assert_eq!(namespace_label(root, root), "");
    }

    #[test]
    fn namespace_joins_nested_components() {
        let root = Path::new("/assets");
        assert_eq!(namespace_label(root, Path::new("/assets/icons")), "icons-");
        assert_eq!(
            namespace_label(root, Path::new("/assets/icons/small set")),
            "icons-small-set-"
        );
    }

    #[test]
    fn rect_intersection_is_exclusive_of_edges() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.intersects(&Rect::new(9, 9, 5, 5)));
        assert!(!a.intersects(&Rect::new(10, 0, 5, 5)));
        assert!(!a.intersects(&Rect::new(0, 10, 5, 5)));
    }

    #[test]
    fn stats_of_unpacked_package_are_zero() {
        let mut pkg = Package::new(Path::new("/a"), "/a");
        pkg.images
            .push(ImageEntry::new(RgbaImage::new(4, 4), "a.png", "/a/a.png"));
        let stats = pkg.stats();
        assert_eq!(stats.sheet_area, 0);
        assert_eq!(stats.used_area, 16);
        assert_eq!(stats.occupancy, 0.0);
    }
}
