use super::{Layout, LayoutItem, Placement};
use crate::config::{SpriteConfig, WIDTH_WEIGHT};
use crate::error::{Result, SpriteError};
use crate::model::{Package, Position, Rect, SheetSize};
use tracing::{debug, warn};

/// Single-pass next-fit shelf packer.
///
/// Items are ordered by `w * width_weight + h` ascending, the sheet is as wide
/// as the last item in that order, and items are laid left to right, starting a
/// new row whenever the next one would cross the right edge. With a weight
/// larger than every height the last item is the widest one, so no row ever
/// needs to be wider than the sheet except by its leading padding.
#[derive(Debug, Clone, Copy)]
pub struct ShelfPacker {
    padding: u32,
    width_weight: u64,
}

impl Default for ShelfPacker {
    fn default() -> Self {
        Self::new(2)
    }
}

impl ShelfPacker {
    pub fn new(padding: u32) -> Self {
        Self {
            padding,
            width_weight: WIDTH_WEIGHT,
        }
    }

    pub fn from_config(cfg: &SpriteConfig) -> Self {
        Self::new(cfg.padding).with_width_weight(cfg.width_weight)
    }

    pub fn with_width_weight(mut self, weight: u64) -> Self {
        self.width_weight = weight;
        self
    }

    #[inline]
    fn sort_key(&self, w: u32, h: u32) -> u64 {
        (w as u64)
            .saturating_mul(self.width_weight)
            .saturating_add(h as u64)
    }

    /// Computes the layout of `items`. Deterministic for a given input order
    /// (the sort is stable, so equal keys keep their relative order).
    pub fn layout<K>(&self, items: Vec<LayoutItem<K>>) -> Result<Layout<K>> {
        if items.is_empty() {
            return Err(SpriteError::Empty);
        }

        if let Some(tall) = items.iter().find(|it| it.h as u64 >= self.width_weight) {
            warn!(
                height = tall.h,
                weight = self.width_weight,
                "image height reaches the width weight; sheet width may not be the widest image"
            );
        }

        let mut sorted = items;
        sorted.sort_by_key(|it| self.sort_key(it.w, it.h));

        let width = sorted.last().map(|it| it.w).unwrap_or(0);
        let pad = self.padding;

        let mut current_top = 0u32;
        let mut current_left = 0u32;
        let mut max_row_height = 0u32;
        let mut placements = Vec::with_capacity(sorted.len());

        for item in sorted {
            // An empty row always takes the item. A single-image sheet therefore
            // starts at top 0 even though `pad + w` exceeds the sheet width.
            let row_occupied = current_left > 0;
            if row_occupied && current_left + pad + item.w > width {
                current_top += max_row_height + pad;
                current_left = 0;
                max_row_height = 0;
            }

            let rect = Rect::new(current_left + pad, current_top, item.w, item.h);
            current_left += pad + item.w;
            max_row_height = max_row_height.max(item.h);

            placements.push(Placement {
                key: item.key,
                rect,
            });
        }

        Ok(Layout {
            width,
            height: current_top + max_row_height,
            placements,
        })
    }

    /// Packs `package` in place: every image receives its position and the
    /// package its sheet size. Image order inside the package is left as is.
    pub fn pack(&self, package: &mut Package) -> Result<SheetSize> {
        let items: Vec<LayoutItem<usize>> = package
            .images
            .iter()
            .enumerate()
            .map(|(idx, entry)| LayoutItem {
                key: idx,
                w: entry.width(),
                h: entry.height(),
            })
            .collect();

        let layout = self.layout(items)?;
        for placement in &layout.placements {
            let entry = &mut package.images[placement.key];
            entry.position = Position {
                top: placement.rect.y,
                left: placement.rect.x,
            };
        }

        let size = layout.size();
        package.size = Some(size);
        debug!(
            dir = %package.directory.display(),
            width = size.width,
            height = size.height,
            images = package.images.len(),
            "packed sheet"
        );
        Ok(size)
    }
}
