//! Core library for turning image directories into CSS sprite sheets.
//!
//! - Scan: `Scanner::scan` walks a tree concurrently and yields one `Package` per directory with images
//! - Pack: `ShelfPacker` lays a package out on a single fixed-width sheet (next-fit shelves)
//! - Emit: `render_sheet` composites the sheet; `to_css` / `to_json` describe it
//!
//! Quick example:
//! ```ignore
//! use spritegen_core::prelude::*;
//! # async fn run() -> spritegen_core::Result<()> {
//! let cfg = SpriteConfig::builder().directory("assets").build();
//! let report = scan_directory(&cfg).await?;
//! for mut pkg in report.packages {
//!     pack_package(&mut pkg, &cfg)?;
//!     let sheet = render_sheet(&pkg)?;
//!     write_png(&pkg.directory.join(SHEET_FILE_NAME), &sheet.rgba)?;
//!     std::fs::write(pkg.directory.join(STYLESHEET_FILE_NAME), to_css(&pkg, SHEET_FILE_NAME))?;
//! }
//! # Ok(()) }
//! ```

pub mod barrier;
pub mod classify;
pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod raster;
pub mod scan;
pub mod stylesheet;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use scan::*;

/// Convenience prelude for common types and functions.
/// Importing `spritegen_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::barrier::{BarrierReport, CompletionBarrier};
    pub use crate::classify::{EntryKind, classify};
    pub use crate::compositing::{RenderedSheet, render_sheet, write_png};
    pub use crate::config::{
        METADATA_FILE_NAME, MetadataFormat, SHEET_FILE_NAME, STYLESHEET_FILE_NAME, SpriteConfig,
        SpriteConfigBuilder, WIDTH_WEIGHT,
    };
    pub use crate::error::{Result, SpriteError};
    pub use crate::export::to_json;
    pub use crate::model::{ImageEntry, Package, Position, Rect, SheetSize, SheetStats};
    pub use crate::packer::{Layout, LayoutItem, Placement, ShelfPacker, pack_package};
    pub use crate::raster::{Rasterizer, SvgCommand, decode_raster};
    pub use crate::scan::{ScanReport, Scanner, scan_directory};
    pub use crate::stylesheet::{duplicate_selectors, normalize_file_name, selector, to_css};
}
