use crate::config::SpriteConfig;
use crate::error::Result;
use crate::model::{Package, Rect, SheetSize};

pub mod shelf;

pub use shelf::ShelfPacker;

/// Size-only input for layout computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutItem<K = String> {
    pub key: K,
    pub w: u32,
    pub h: u32,
}

/// A placed item; `rect.x` is the left offset and `rect.y` the top offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement<K = String> {
    pub key: K,
    pub rect: Rect,
}

/// Result of a layout run. `placements` are in placement order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout<K = String> {
    pub width: u32,
    pub height: u32,
    pub placements: Vec<Placement<K>>,
}

impl<K> Layout<K> {
    pub fn size(&self) -> SheetSize {
        SheetSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// Packs `package` in place using the padding and width weight from `cfg`.
pub fn pack_package(package: &mut Package, cfg: &SpriteConfig) -> Result<SheetSize> {
    ShelfPacker::from_config(cfg).pack(package)
}
