//! Concurrent directory walk producing one [`Package`] per image directory.
//!
//! Every directory is listed, then each entry is dispatched as its own task:
//! subdirectories recurse, raster files are decoded on the blocking pool and
//! vector files are rasterized first. The directory's [`CompletionBarrier`]
//! fires after the last entry reports; only then is the package finalized.
//! Finished packages and subtree failures travel over one channel to the
//! coordinating [`Scanner::scan`] call, which is their single owner.

use crate::barrier::CompletionBarrier;
use crate::classify::{EntryKind, classify};
use crate::config::SpriteConfig;
use crate::error::{Result, SpriteError};
use crate::model::{ImageEntry, Package};
use crate::raster::{Rasterizer, SvgCommand, decode_raster};
use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Everything a scan produced.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Finalized packages, sorted by directory.
    pub packages: Vec<Package>,
    /// Subtrees that could not be listed. Their siblings were still scanned.
    pub failures: Vec<SpriteError>,
    /// Files that could not be decoded or rasterized; they contribute no image.
    pub skipped: Vec<SpriteError>,
}

impl ScanReport {
    pub fn image_count(&self) -> usize {
        self.packages.iter().map(|p| p.images.len()).sum()
    }
}

enum WalkEvent {
    Package(Package),
    Failed(SpriteError),
    Skipped(SpriteError),
}

struct WalkContext<R> {
    root: PathBuf,
    rasterizer: Arc<R>,
    vector_scale: f32,
    scratch: PathBuf,
    scratch_seq: AtomicUsize,
    /// Canonical paths of directories already entered, so symlink cycles end.
    visited: Mutex<HashSet<PathBuf>>,
    events: mpsc::UnboundedSender<WalkEvent>,
}

impl<R> WalkContext<R> {
    fn scratch_path(&self, file_name: &str) -> PathBuf {
        let seq = self.scratch_seq.fetch_add(1, Ordering::Relaxed);
        self.scratch.join(format!("{}-{}.png", seq, file_name))
    }

    /// Records `canonical` as entered. Returns false if it was entered before.
    fn enter(&self, canonical: PathBuf) -> bool {
        match self.visited.lock() {
            Ok(mut visited) => visited.insert(canonical),
            Err(poisoned) => poisoned.into_inner().insert(canonical),
        }
    }

    fn emit(&self, event: WalkEvent) {
        // The receiver lives until the scan returns; a send can only fail after that.
        let _ = self.events.send(event);
    }
}

pub struct Scanner<R = SvgCommand> {
    rasterizer: Arc<R>,
    vector_scale: f32,
}

impl Scanner<SvgCommand> {
    /// Scanner using the configured SVG converter and scale.
    pub fn from_config(cfg: &SpriteConfig) -> Self {
        Scanner::new(SvgCommand::new(cfg.svg_command.clone())).with_vector_scale(cfg.vector_scale)
    }
}

impl<R: Rasterizer> Scanner<R> {
    pub fn new(rasterizer: R) -> Self {
        Self {
            rasterizer: Arc::new(rasterizer),
            vector_scale: 1.0,
        }
    }

    pub fn with_vector_scale(mut self, scale: f32) -> Self {
        self.vector_scale = scale;
        self
    }

    /// Scans `root` recursively.
    ///
    /// Fails only when `root` itself cannot be listed. Failures below the root
    /// are collected in [`ScanReport::failures`].
    #[instrument(skip_all, fields(root = %root.display()))]
    pub async fn scan(&self, root: &Path) -> Result<ScanReport> {
        let root = tokio::fs::canonicalize(root)
            .await
            .map_err(|source| SpriteError::Listing {
                dir: root.to_path_buf(),
                source,
            })?;
        let scratch = tempfile::Builder::new().prefix("spritegen-").tempdir()?;

        let (events, mut rx) = mpsc::unbounded_channel();
        let ctx = Arc::new(WalkContext {
            root: root.clone(),
            rasterizer: Arc::clone(&self.rasterizer),
            vector_scale: self.vector_scale,
            scratch: scratch.path().to_path_buf(),
            scratch_seq: AtomicUsize::new(0),
            visited: Mutex::new(HashSet::new()),
            events,
        });

        let outcome = walk_dir(ctx, root).await;

        // Resolves once the last task drops its context.
        let mut report = ScanReport::default();
        while let Some(event) = rx.recv().await {
            match event {
                WalkEvent::Package(p) => report.packages.push(p),
                WalkEvent::Failed(e) => report.failures.push(e),
                WalkEvent::Skipped(e) => report.skipped.push(e),
            }
        }
        outcome?;

        report.packages.sort_by(|a, b| a.directory.cmp(&b.directory));
        info!(
            packages = report.packages.len(),
            images = report.image_count(),
            failures = report.failures.len(),
            skipped = report.skipped.len(),
            "scan finished"
        );
        Ok(report)
    }
}

/// Validates `cfg` and scans its directory with the external SVG converter.
pub async fn scan_directory(cfg: &SpriteConfig) -> Result<ScanReport> {
    cfg.validate()?;
    let root = cfg.directory.as_deref().ok_or(SpriteError::MissingDirectory)?;
    Scanner::from_config(cfg).scan(root).await
}

type WalkFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

fn walk_dir<R: Rasterizer>(ctx: Arc<WalkContext<R>>, dir: PathBuf) -> WalkFuture {
    Box::pin(async move {
        let canonical = tokio::fs::canonicalize(&dir)
            .await
            .map_err(|source| SpriteError::Listing {
                dir: dir.clone(),
                source,
            })?;
        if !ctx.enter(canonical) {
            warn!(dir = %dir.display(), "directory already scanned through another path, skipping");
            return Ok(());
        }

        let entries = list_dir(&dir).await?;
        let mut package = Package::new(&ctx.root, &dir);
        let mut barrier = CompletionBarrier::new(entries.len());
        let (entry_tx, mut entry_rx) = mpsc::unbounded_channel::<ImageEntry>();

        for (name, path) in entries {
            let Some(report) = barrier.reporter() else {
                break;
            };
            let ctx = Arc::clone(&ctx);
            let entry_tx = entry_tx.clone();
            tokio::spawn(async move {
                // The inner task turns a panicking rasterizer into a skip instead of a lost entry.
                let visit = tokio::spawn(visit_entry(Arc::clone(&ctx), name, path.clone()));
                match visit.await {
                    Ok(Some(entry)) => {
                        let _ = entry_tx.send(entry);
                    }
                    Ok(None) => {}
                    Err(join_err) => {
                        warn!(path = %path.display(), error = %join_err, "entry task panicked");
                        ctx.emit(WalkEvent::Skipped(task_failure(path, join_err)));
                    }
                }
                report.report();
            });
        }
        drop(entry_tx);

        barrier.wait().await;

        // Every unit sends before it reports, so all entries are queued by now.
        while let Ok(entry) = entry_rx.try_recv() {
            package.images.push(entry);
        }
        finalize(&ctx, package);
        Ok(())
    })
}

async fn list_dir(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let listing = |source: std::io::Error| SpriteError::Listing {
        dir: dir.to_path_buf(),
        source,
    };
    let mut rd = tokio::fs::read_dir(dir).await.map_err(listing)?;
    let mut entries = Vec::new();
    while let Some(entry) = rd.next_entry().await.map_err(listing)? {
        entries.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
    }
    Ok(entries)
}

async fn visit_entry<R: Rasterizer>(
    ctx: Arc<WalkContext<R>>,
    name: String,
    path: PathBuf,
) -> Option<ImageEntry> {
    let meta = match tokio::fs::metadata(&path).await {
        Ok(m) => m,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot stat entry");
            ctx.emit(WalkEvent::Skipped(SpriteError::Io(e)));
            return None;
        }
    };

    if meta.is_dir() {
        if let Err(e) = walk_dir(Arc::clone(&ctx), path).await {
            warn!(error = %e, "subtree skipped");
            ctx.emit(WalkEvent::Failed(e));
        }
        return None;
    }

    match classify(&name) {
        EntryKind::Ignored => None,
        EntryKind::Raster => decode_entry(&ctx, path.clone(), name, path).await,
        EntryKind::Vector => {
            let output = ctx.scratch_path(&name);
            match ctx
                .rasterizer
                .rasterize(&path, &output, ctx.vector_scale)
                .await
            {
                Ok(written) => decode_entry(&ctx, written, format!("{}.png", name), path).await,
                Err(e) => {
                    warn!(error = %e, "skip vector image");
                    ctx.emit(WalkEvent::Skipped(e));
                    None
                }
            }
        }
    }
}

async fn decode_entry<R>(
    ctx: &WalkContext<R>,
    read_from: PathBuf,
    file_name: String,
    source: PathBuf,
) -> Option<ImageEntry> {
    match tokio::task::spawn_blocking(move || decode_raster(&read_from)).await {
        Ok(Ok(image)) => {
            debug!(file = %file_name, width = image.width(), height = image.height(), "decoded image");
            Some(ImageEntry::new(image, file_name, source))
        }
        Ok(Err(e)) => {
            warn!(error = %e, "skip image");
            ctx.emit(WalkEvent::Skipped(e));
            None
        }
        Err(join_err) => {
            warn!(path = %source.display(), error = %join_err, "decode task panicked");
            ctx.emit(WalkEvent::Skipped(task_failure(source, join_err)));
            None
        }
    }
}

fn task_failure(path: PathBuf, join_err: tokio::task::JoinError) -> SpriteError {
    let message = if join_err.is_panic() {
        "panicked".to_string()
    } else {
        join_err.to_string()
    };
    SpriteError::Task { path, message }
}

fn finalize<R>(ctx: &WalkContext<R>, mut package: Package) {
    if package.images.is_empty() {
        debug!("No images found for directory \"{}\".", package.directory.display());
        return;
    }
    // Completion order is arbitrary; file name order keeps output stable.
    package.images.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    info!(
        "\"{}\" is done. Found {} images.",
        package.directory.display(),
        package.images.len()
    );
    ctx.emit(WalkEvent::Package(package));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn panicked_decode_becomes_a_task_error() {
        let join_err = tokio::task::spawn_blocking(|| -> u8 { panic!("decoder") })
            .await
            .expect_err("task panics");
        match task_failure(PathBuf::from("/a/b.png"), join_err) {
            SpriteError::Task { path, message } => {
                assert_eq!(path, PathBuf::from("/a/b.png"));
                assert_eq!(message, "panicked");
            }
            other => panic!("expected Task, got {:?}", other),
        }
    }

    #[test]
    fn directories_are_entered_once() {
        let (events, _rx) = mpsc::unbounded_channel();
        let ctx = WalkContext {
            root: PathBuf::from("/r"),
            rasterizer: Arc::new(SvgCommand::default()),
            vector_scale: 1.0,
            scratch: PathBuf::from("/tmp"),
            scratch_seq: AtomicUsize::new(0),
            visited: Mutex::new(HashSet::new()),
            events,
        };
        assert!(ctx.enter(PathBuf::from("/r/a")));
        assert!(!ctx.enter(PathBuf::from("/r/a")));
        assert!(ctx.enter(PathBuf::from("/r/b")));
    }
}
