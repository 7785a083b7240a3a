use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("A root directory is required")]
    MissingDirectory,
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Cannot list directory {}: {source}", dir.display())]
    Listing {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Cannot rasterize {}: {message}", path.display())]
    Rasterize { path: PathBuf, message: String },
    #[error("Task for {} did not finish: {message}", path.display())]
    Task { path: PathBuf, message: String },
    #[error("Cannot draw {file} at ({left}, {top}) on a {width}x{height} sheet")]
    Draw {
        file: String,
        left: u32,
        top: u32,
        width: u32,
        height: u32,
    },
    #[error("Nothing to pack")]
    Empty,
    #[error("Encoding error: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, SpriteError>;
