use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, CommandFactory, Parser};
use collage_core::{CollageConfig, FsSource, layout_to_json, make_collage};
use globset::{Glob, GlobSet, GlobSetBuilder};
use image::ImageFormat;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::info;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "collage",
    about = "Photo collage maker",
    version,
    author
)]
struct Cli {
    // Input/Output
    /// Folder with images (*.jpg, *.jpeg, *.png)
    #[arg(short = 'f', long = "folder", default_value = ".", help_heading = "Input/Output")]
    folder: PathBuf,
    /// Output collage image filename (format follows the extension)
    #[arg(short, long, default_value = "collage.jpg", help_heading = "Input/Output")]
    output: PathBuf,
    /// Include patterns (glob, matched against file names)
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob, matched against file names)
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
    /// YAML config file path (command-line flags take precedence)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,

    // Layout
    /// Collage image width (px)
    #[arg(short = 'w', long = "collage_width", visible_alias = "collage-width", help_heading = "Layout")]
    collage_width: Option<u32>,
    /// Individual image height (px); the starting target row height
    #[arg(short = 'i', long = "image_height", visible_alias = "image-height", help_heading = "Layout")]
    image_height: Option<u32>,
    /// Shuffle images before packing
    #[arg(short, long, default_value_t = false, help_heading = "Layout")]
    shuffle: bool,
    /// Seed for --shuffle (reproducible order)
    #[arg(long, help_heading = "Layout")]
    seed: Option<u64>,
    /// Convert the collage to greyscale
    #[arg(short, long, default_value_t = false, help_heading = "Layout")]
    greyscale: bool,

    // Export
    /// Write the run report (JSON) to this file
    #[arg(long, help_heading = "Export")]
    report: Option<PathBuf>,
    /// Write the row layout (JSON) to this file
    #[arg(long, help_heading = "Export")]
    layout: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: build the collage and report but do not write the image
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,

    // Logging/UX
    /// Show a spinner while the collage is built (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action = ArgAction::Set, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(short, long, default_value_t = false, help_heading = "Logging/UX")]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);

    let file_cfg = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            serde_yaml::from_str::<YamlConfig>(&text)
                .with_context(|| format!("parse config {}", path.display()))?
        }
        None => YamlConfig::default(),
    };
    let Some(cfg) = build_config(&cli, file_cfg) else {
        Cli::command().print_help()?;
        std::process::exit(1);
    };
    cfg.validate()?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let format = output_format(&cli.output)?;

    let mut paths = gather_paths(&cli.folder, &cli.include, &cli.exclude)?;
    if paths.is_empty() {
        anyhow::bail!("No images for making collage! Please select another folder with images!");
    }
    if cli.shuffle {
        shuffle_paths(&mut paths, cli.seed);
    }
    let keys: Vec<String> = paths
        .iter()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect();
    info!(count = keys.len(), folder = ?cli.folder, "found images");

    println!("Making collage...");
    let spinner = if cli.progress && !cli.quiet {
        Some(start_spinner(keys.len())?)
    } else {
        None
    };
    let result = make_collage(&keys, &FsSource, &cfg);
    if let Some(s) = &spinner {
        s.finish_and_clear();
    }
    let out = result.context("Failed to create collage!")?;
    println!("{} photos used", out.report.images_used);
    info!(summary = %out.report.summary(), "stats");

    if !cli.dry_run {
        out.image
            .save_with_format(&cli.output, format)
            .with_context(|| format!("write {}", cli.output.display()))?;
        info!(output = ?cli.output, width = out.report.width, height = out.report.height, "collage written");
    }

    if let Some(path) = &cli.report {
        fs::write(path, serde_json::to_string_pretty(&out.report)?)
            .with_context(|| format!("write {}", path.display()))?;
        info!(?path, "report exported");
    }
    if let Some(path) = &cli.layout {
        let value = layout_to_json(&out.layout, cfg.margin);
        fs::write(path, serde_json::to_string_pretty(&value)?)
            .with_context(|| format!("write {}", path.display()))?;
        info!(?path, "layout exported");
    }

    if cli.dry_run {
        println!("{}", out.report.summary());
    } else {
        println!("Collage complete!");
    }
    Ok(())
}

/// Image format for `path`, taken from its extension. Only JPEG and PNG are written.
fn output_format(path: &Path) -> anyhow::Result<ImageFormat> {
    let format = ImageFormat::from_path(path)
        .with_context(|| format!("unknown output format for {}", path.display()))?;
    match format {
        ImageFormat::Jpeg | ImageFormat::Png => Ok(format),
        other => anyhow::bail!(
            "unsupported output format {other:?} for {} (use .jpg, .jpeg or .png)",
            path.display()
        ),
    }
}

/// Merges YAML settings under the command line. `None` when width or height is missing.
fn build_config(cli: &Cli, file: YamlConfig) -> Option<CollageConfig> {
    let mut cfg = CollageConfig::default();
    file.apply(&mut cfg);
    let width = cli.collage_width.or(file.width)?;
    let row_height = cli.image_height.or(file.row_height)?;
    cfg.width = width;
    cfg.row_height = row_height;
    if cli.greyscale {
        cfg.greyscale = true;
    }
    Some(cfg)
}

fn start_spinner(count: usize) -> anyhow::Result<indicatif::ProgressBar> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template(
        "{spinner:.green} arranging {msg} [{elapsed_precise}]",
    )?);
    bar.set_message(format!("{count} images"));
    bar.enable_steady_tick(Duration::from_millis(100));
    Ok(bar)
}

fn shuffle_paths(paths: &mut [PathBuf], seed: Option<u64>) {
    match seed {
        Some(seed) => paths.shuffle(&mut StdRng::seed_from_u64(seed)),
        None => paths.shuffle(&mut rand::thread_rng()),
    }
}

/// Lists images directly inside `folder` (no recursion), sorted by path.
fn gather_paths(
    folder: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;
    let mut list: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let p = entry.path();
        if p.is_file() && is_image(p) && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) {
            list.push(p.to_path_buf());
        }
    }
    list.sort();
    Ok(list)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("invalid glob {pat}"))?);
    }
    Ok(Some(b.build()?))
}

fn should_skip(p: &Path, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    let name = p.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    if let Some(ex) = exclude {
        if ex.is_match(&*name) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&*name) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "jpg" | "jpeg" | "png")
    )
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
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    width: Option<u32>,
    row_height: Option<u32>,
    margin: Option<u32>,
    shrink_step: Option<u32>,
    background: Option<[u8; 3]>,
    greyscale: Option<bool>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn apply(&self, cfg: &mut CollageConfig) {
        if let Some(v) = self.width {
            cfg.width = v;
        }
        if let Some(v) = self.row_height {
            cfg.row_height = v;
        }
        if let Some(v) = self.margin {
            cfg.margin = v;
        }
        if let Some(v) = self.shrink_step {
            cfg.shrink_step = v;
        }
        if let Some(v) = self.background {
            cfg.background = v;
        }
        if let Some(v) = self.greyscale {
            cfg.greyscale = v;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").expect("write fixture");
    }

    #[test]
    fn gathers_only_top_level_images_case_insensitively() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "b.JPG");
        touch(dir.path(), "a.png");
        touch(dir.path(), "c.jpeg");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "d.gif");
        fs::create_dir(dir.path().join("nested")).expect("mkdir");
        touch(&dir.path().join("nested"), "e.jpg");

        let found = gather_paths(dir.path(), &[], &[]).expect("gather");
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.JPG", "c.jpeg"]);
    }

    #[test]
    fn include_and_exclude_filter_by_file_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "keep_1.jpg");
        touch(dir.path(), "keep_2.png");
        touch(dir.path(), "drop.jpg");

        let found = gather_paths(dir.path(), &["keep_*".into()], &["*.png".into()]).expect("gather");
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("keep_1.jpg"));
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let base: Vec<PathBuf> = (0..20).map(|i| PathBuf::from(format!("{i}.jpg"))).collect();
        let mut a = base.clone();
        let mut b = base.clone();
        shuffle_paths(&mut a, Some(7));
        shuffle_paths(&mut b, Some(7));
        assert_eq!(a, b);
        a.sort();
        let mut sorted = base.clone();
        sorted.sort();
        assert_eq!(a, sorted);
    }

    #[test]
    fn output_format_follows_extension() {
        assert_eq!(output_format(Path::new("out/collage.JPG")).expect("jpeg"), ImageFormat::Jpeg);
        assert_eq!(output_format(Path::new("collage.jpeg")).expect("jpeg"), ImageFormat::Jpeg);
        assert_eq!(output_format(Path::new("collage.png")).expect("png"), ImageFormat::Png);
        assert!(output_format(Path::new("collage.gif")).is_err());
        assert!(output_format(Path::new("collage")).is_err());
    }

    #[test]
    fn missing_dimensions_yield_no_config() {
        let cli = Cli::parse_from(["collage", "--collage_width", "800"]);
        assert!(build_config(&cli, YamlConfig::default()).is_none());

        let cli = Cli::parse_from(["collage", "-w", "800", "-i", "120", "-g"]);
        let cfg = build_config(&cli, YamlConfig::default()).expect("config");
        assert_eq!((cfg.width, cfg.row_height), (800, 120));
        assert!(cfg.greyscale);
        assert_eq!(cfg.margin, collage_core::MARGIN_SIZE);
    }

    #[test]
    fn yaml_fills_in_missing_flags() {
        let file: YamlConfig =
            serde_yaml::from_str("width: 640\nrow_height: 90\nmargin: 4\n").expect("yaml");
        let cli = Cli::parse_from(["collage", "-i", "150"]);
        let cfg = build_config(&cli, file).expect("config");
        assert_eq!(cfg.width, 640);
        assert_eq!(cfg.row_height, 150);
        assert_eq!(cfg.margin, 4);
    }
}
