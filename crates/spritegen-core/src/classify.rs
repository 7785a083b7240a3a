use crate::config::SHEET_FILE_NAME;
use std::path::Path;

const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff"];
const VECTOR_EXTENSIONS: &[&str] = &["svg"];

/// How a directory entry takes part in a sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Decoded directly.
    Raster,
    /// Rasterized first, then decoded.
    Vector,
    Ignored,
}

/// Classifies a file by its extension (case-insensitive).
///
/// The generated sheet (`sprite.png`) is always ignored so a second run never
/// packs the output of the first one.
pub fn classify(file_name: &str) -> EntryKind {
    if file_name == SHEET_FILE_NAME {
        return EntryKind::Ignored;
    }
    let ext = match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return EntryKind::Ignored,
    };
    if RASTER_EXTENSIONS.contains(&ext.as_str()) {
        EntryKind::Raster
    } else if VECTOR_EXTENSIONS.contains(&ext.as_str()) {
        EntryKind::Vector
    } else {
        EntryKind::Ignored
    }
}
