use crate::error::{Result, SpriteError};
use image::{ImageReader, RgbaImage};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Turns a vector image into a raster file on disk.
///
/// Implementations write a PNG to `output` at the given `scale` and return the
/// path that was written.
pub trait Rasterizer: Send + Sync + 'static {
    fn rasterize(
        &self,
        source: &Path,
        output: &Path,
        scale: f32,
    ) -> impl Future<Output = Result<PathBuf>> + Send;
}

/// Rasterizes SVG files by running an external converter.
///
/// The program is invoked as `<program> --zoom <scale> --format png --output
/// <output> <source>`, which matches `rsvg-convert`.
#[derive(Debug, Clone)]
pub struct SvgCommand {
    program: String,
}

impl Default for SvgCommand {
    fn default() -> Self {
        Self::new("rsvg-convert")
    }
}

impl SvgCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Rasterizer for SvgCommand {
    async fn rasterize(&self, source: &Path, output: &Path, scale: f32) -> Result<PathBuf> {
        debug!(program = %self.program, source = %source.display(), scale, "rasterizing vector image");
        let out = Command::new(&self.program)
            .arg("--zoom")
            .arg(scale.to_string())
            .arg("--format")
            .arg("png")
            .arg("--output")
            .arg(output)
            .arg(source)
            .output()
            .await
            .map_err(|e| SpriteError::Rasterize {
                path: source.to_path_buf(),
                message: format!("failed to run {}: {}", self.program, e),
            })?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("{} exited with {}", self.program, out.status)
            } else {
                stderr
            };
            return Err(SpriteError::Rasterize {
                path: source.to_path_buf(),
                message,
            });
        }
        Ok(output.to_path_buf())
    }
}

/// Decodes a raster file into RGBA pixels. Blocking; run it off the async workers.
pub fn decode_raster(path: &Path) -> Result<RgbaImage> {
    let decode = || -> std::result::Result<RgbaImage, image::ImageError> {
        let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        Ok(img.to_rgba8())
    };
    decode().map_err(|source| SpriteError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_reports_path_on_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bogus = dir.path().join("broken.png");
        std::fs::write(&bogus, b"definitely not a png").expect("write");
        match decode_raster(&bogus) {
            Err(SpriteError::Decode { path, .. }) => assert_eq!(path, bogus),
            other => panic!("expected Decode error, got {:?}", other.map(|i| i.dimensions())),
        }
    }

    #[test]
    fn decode_reads_dimensions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ok.png");
        RgbaImage::new(7, 3).save(&path).expect("save");
        let img = decode_raster(&path).expect("decode");
        assert_eq!(img.dimensions(), (7, 3));
    }

    #[tokio::test]
    async fn missing_converter_is_a_rasterize_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let svg = dir.path().join("a.svg");
        std::fs::write(&svg, "<svg xmlns=\"http://www.w3.org/2000/svg\"/>").expect("write");
        let cmd = SvgCommand::new("spritegen-no-such-converter");
        let res = cmd.rasterize(&svg, &dir.path().join("a.svg.png"), 1.0).await;
        assert!(matches!(res, Err(SpriteError::Rasterize { .. })));
    }
}
