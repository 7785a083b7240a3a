use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use spritegen_core::config::{
    METADATA_FILE_NAME, MetadataFormat, SHEET_FILE_NAME, STYLESHEET_FILE_NAME, SpriteConfig,
    WIDTH_WEIGHT,
};
use spritegen_core::stylesheet::selector;
use spritegen_core::{Package, pack_package, scan_directory};
use tracing::{debug, error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "spritegen",
    about = "Turn every image directory of a tree into a sprite sheet and stylesheet",
    version,
    author
)]
struct Cli {
    // Input/Output
    /// Root directory to scan (may also come from --config)
    #[arg(help_heading = "Input/Output")]
    directory: Option<PathBuf>,
    /// YAML config file path (keys present in the file override flags)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Metadata to write next to each sheet: css | json | both
    #[arg(long, value_parser = ["css", "json", "both"], default_value = "css", help_heading = "Input/Output")]
    metadata: String,
    /// Handlebars template used instead of the built-in CSS rules
    #[arg(long, help_heading = "Input/Output")]
    template: Option<PathBuf>,

    // Layout
    /// Padding between images
    #[arg(long, default_value_t = 2, help_heading = "Layout")]
    padding: u32,
    /// Sort weight of width over height; must exceed every image height
    #[arg(long, default_value_t = WIDTH_WEIGHT, help_heading = "Layout")]
    width_weight: u64,

    // Vector images
    /// Scale used when rasterizing SVG files
    #[arg(long, default_value_t = 1.0, help_heading = "Vector")]
    vector_scale: f32,
    /// Program used to rasterize SVG files (rsvg-convert compatible)
    #[arg(long, default_value = "rsvg-convert", help_heading = "Vector")]
    svg_command: String,

    // Export
    /// Dry run: scan and pack, log stats, but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,

    // Logging/UX
    /// Show progress bars (default; --quiet also hides them)
    #[arg(long, overrides_with = "no_progress", help_heading = "Logging/UX")]
    progress: bool,
    /// Hide progress bars
    #[arg(long, overrides_with = "progress", help_heading = "Logging/UX")]
    no_progress: bool,
    /// Increase verbosity (-v per-image diagnostics, -vv trace)
    #[arg(short, long, action = ArgAction::Count, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(short, long, default_value_t = false, help_heading = "Logging/UX")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = build_config(&cli)?;
    let verbosity = if cfg.verbose { cli.verbose.max(1) } else { cli.verbose };
    init_tracing_with_level(cli.quiet, verbosity);

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    cfg.validate().context("invalid configuration")?;
    let template = match &cli.template {
        Some(path) => Some(load_template(path)?),
        None => None,
    };

    let report = scan_directory(&cfg).await?;
    for failure in &report.failures {
        error!(error = %failure, "directory skipped");
    }
    if !report.skipped.is_empty() {
        warn!(count = report.skipped.len(), "some files could not be read");
    }

    let opts = EmitOptions {
        cfg,
        template,
        dry_run: cli.dry_run,
        progress: show_progress(&cli),
    };
    let packages = report.packages;
    let failed = tokio::task::spawn_blocking(move || emit_packages(packages, &opts))
        .await
        .context("emit task panicked")?;

    let total_failed = failed + report.failures.len();
    if total_failed > 0 {
        anyhow::bail!("{} directories failed; see log for details", total_failed);
    }
    Ok(())
}

/// The last of `--progress`/`--no-progress` wins; `--quiet` always hides the bar.
fn show_progress(cli: &Cli) -> bool {
    (cli.progress || !cli.no_progress) && !cli.quiet
}

fn build_config(cli: &Cli) -> anyhow::Result<SpriteConfig> {
    let metadata: MetadataFormat = cli
        .metadata
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown metadata format: {}", cli.metadata))?;
    let cfg = SpriteConfig {
        directory: cli.directory.clone(),
        padding: cli.padding,
        verbose: cli.verbose > 0,
        vector_scale: cli.vector_scale,
        width_weight: cli.width_weight,
        svg_command: cli.svg_command.clone(),
        metadata,
    };

    // Config file sets options en bloc; an explicit positional directory still wins.
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        let mut merged = y.into_sprite_config(cfg)?;
        if cli.directory.is_some() {
            merged.directory = cli.directory.clone();
        }
        return Ok(merged);
    }
    Ok(cfg)
}

struct EmitOptions {
    cfg: SpriteConfig,
    template: Option<Handlebars<'static>>,
    dry_run: bool,
    progress: bool,
}

/// Packs and writes every package; returns how many failed.
fn emit_packages(packages: Vec<Package>, opts: &EmitOptions) -> usize {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if opts.progress && !packages.is_empty() {
        let b = ProgressBar::new(packages.len() as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} writing {pos}/{len} [{elapsed_precise}] {wide_msg}",
        ) {
            b.set_style(style);
        }
        Some(b)
    } else {
        None
    };

    let mut failed = 0;
    for mut package in packages {
        if let Some(b) = &bar {
            b.set_message(package.directory.display().to_string());
        }
        if let Err(e) = emit_package(&mut package, opts) {
            error!(dir = %package.directory.display(), error = ?e, "sheet not written");
            failed += 1;
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    failed
}

fn emit_package(package: &mut Package, opts: &EmitOptions) -> anyhow::Result<()> {
    pack_package(package, &opts.cfg)?;
    let stats = package.stats();
    info!(
        dir = %package.directory.display(),
        images = stats.num_images,
        width = stats.width,
        height = stats.height,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        "stats"
    );
    if opts.dry_run {
        return Ok(());
    }

    let sheet = spritegen_core::compositing::render_sheet(package)?;
    let png_path = package.directory.join(SHEET_FILE_NAME);
    spritegen_core::compositing::write_png(&png_path, &sheet.rgba)
        .with_context(|| format!("write {}", png_path.display()))?;
    info!("Wrote sprite \"{}\".", png_path.display());

    if opts.cfg.metadata.wants_css() {
        let css = match &opts.template {
            Some(reg) => reg.render("tpl", &build_template_context(package))?,
            None => spritegen_core::stylesheet::to_css(package, SHEET_FILE_NAME),
        };
        let css_path = package.directory.join(STYLESHEET_FILE_NAME);
        fs::write(&css_path, css).with_context(|| format!("write {}", css_path.display()))?;
        debug!("\tWrote style sheet \"{}\".", css_path.display());
    }
    if opts.cfg.metadata.wants_json() {
        let json_path = package.directory.join(METADATA_FILE_NAME);
        let json = serde_json::to_string_pretty(&spritegen_core::to_json(package, SHEET_FILE_NAME))?;
        fs::write(&json_path, json).with_context(|| format!("write {}", json_path.display()))?;
        debug!("\tWrote metadata \"{}\".", json_path.display());
    }
    Ok(())
}

fn load_template(path: &Path) -> anyhow::Result<Handlebars<'static>> {
    let tpl = fs::read_to_string(path)
        .with_context(|| format!("read template {}", path.display()))?;
    let mut reg = Handlebars::new();
    reg.set_strict_mode(true);
    reg.register_escape_fn(handlebars::no_escape);
    reg.register_template_string("tpl", tpl)?;
    Ok(reg)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Serialize)]
struct TemplateSprite {
    selector: String,
    file: String,
    left: u32,
    top: u32,
    width: u32,
    height: u32,
}

#[derive(Serialize)]
struct TemplateContext {
    sheet: String,
    namespace: String,
    width: u32,
    height: u32,
    sprites: Vec<TemplateSprite>,
}

fn build_template_context(package: &Package) -> TemplateContext {
    let (width, height) = package
        .size
        .map(|s| (s.width, s.height))
        .unwrap_or((0, 0));
    let sprites = package
        .images
        .iter()
        .map(|entry| TemplateSprite {
            selector: selector(package, entry),
            file: entry.file_name.clone(),
            left: entry.position.left,
            top: entry.position.top,
            width: entry.width(),
            height: entry.height(),
        })
        .collect();
    TemplateContext {
        sheet: SHEET_FILE_NAME.into(),
        namespace: package.namespace.clone(),
        width,
        height,
        sprites,
    }
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    directory: Option<PathBuf>,
    padding: Option<u32>,
    verbose: Option<bool>,
    vector_scale: Option<f32>,
    width_weight: Option<u64>,
    svg_command: Option<String>,
    metadata: Option<String>,
}

impl YamlConfig {
    fn into_sprite_config(self, mut cfg: SpriteConfig) -> anyhow::Result<SpriteConfig> {
        if let Some(v) = self.directory {
            cfg.directory = Some(v);
        }
        if let Some(v) = self.padding {
            cfg.padding = v;
        }
        if let Some(v) = self.verbose {
            cfg.verbose = v;
        }
        if let Some(v) = self.vector_scale {
            cfg.vector_scale = v;
        }
        if let Some(v) = self.width_weight {
            cfg.width_weight = v;
        }
        if let Some(v) = self.svg_command {
            cfg.svg_command = v;
        }
        if let Some(v) = self.metadata {
            cfg.metadata = v
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown metadata format: {}", v))?;
        }
        Ok(cfg)
    }
}
