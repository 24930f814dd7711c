use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use sprite_atlas_core::{AtlasConfig, AtlasStats, pack_directory_with, write_atlas};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "sprite-atlas",
    about = "Pack a folder of icons into one sprite atlas + JSON manifest",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack a directory of icons into an atlas image and manifest
    Pack(PackArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Directory holding the source icons (not scanned recursively)
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// File name of the atlas image
    #[arg(long, default_value = "sprite.png", help_heading = "Input/Output")]
    image_name: String,
    /// File name of the JSON manifest
    #[arg(long, default_value = "sprite.json", help_heading = "Input/Output")]
    manifest_name: String,
    /// YAML config file path (keys present there override the command line)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Accepted image extension; repeat to accept several
    #[arg(long = "ext", default_values_t = vec!["png".to_string()], help_heading = "Input/Output")]
    extensions: Vec<String>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Layout
    /// Maximum summed width of one row, in pixels
    #[arg(long, default_value_t = 255, help_heading = "Layout")]
    max_width: u32,
    /// Decode sources in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    parallel: bool,

    // Export
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args),
    }
}

fn run_pack(cli: &PackArgs) -> anyhow::Result<()> {
    let mut cfg = AtlasConfig {
        source_dir: cli.input.clone(),
        out_dir: cli.out_dir.clone(),
        image_name: cli.image_name.clone(),
        manifest_name: cli.manifest_name.clone(),
        max_row_width: cli.max_width,
        extensions: cli.extensions.clone(),
        parallel: cli.parallel,
    };
    if let Some(path) = &cli.config {
        let file =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg = y.into_atlas_config(cfg);
    }
    cfg.validate()?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    if cfg.parallel && !cfg!(feature = "parallel") {
        warn!(
            "--parallel requested but the `parallel` feature is not enabled; decoding sequentially"
        );
    }

    let filter = PathFilter::new(&cli.include, &cli.exclude)?;
    let Some(out) = pack_directory_with(&cfg, |p| filter.accepts(p))
        .with_context(|| format!("pack {}", cfg.source_dir.display()))?
    else {
        info!(source_dir = ?cfg.source_dir, "no images found; nothing written");
        return Ok(());
    };
    let stats = out.stats();

    if !cli.dry_run {
        let written = write_atlas(
            &cfg.out_dir,
            &cfg.image_name,
            &cfg.manifest_name,
            &out.canvas,
            &out.manifest,
        )
        .with_context(|| format!("write atlas into {}", cfg.out_dir.display()))?;
        info!(image = ?written.image_path, manifest = ?written.manifest_path, "atlas written");
    } else {
        info!("dry run: no files written");
    }
    info!("{}", stats.summary());

    if let Some(stats_path) = &cli.export_stats {
        write_stats(stats_path, &stats)?;
    }
    Ok(())
}

fn write_stats(path: &Path, stats: &AtlasStats) -> anyhow::Result<()> {
    let value = serde_json::json!({
        "rows": stats.num_rows,
        "images": stats.num_images,
        "width": stats.canvas_width,
        "height": stats.canvas_height,
        "used_area": stats.used_area,
        "total_area": stats.canvas_area,
        "occupancy": stats.occupancy,
    });
    fs::write(path, serde_json::to_string_pretty(&value)?)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Include/exclude glob matchers applied to candidate image paths.
struct PathFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl PathFilter {
    fn new(include: &[String], exclude: &[String]) -> anyhow::Result<Self> {
        Ok(Self {
            include: build_globset(include)?,
            exclude: build_globset(exclude)?,
        })
    }

    fn accepts(&self, p: &Path) -> bool {
        let s = p.to_string_lossy().replace('\\', "/");
        if let Some(ex) = &self.exclude {
            if ex.is_match(&s) {
                return false;
            }
        }
        if let Some(inc) = &self.include {
            if !inc.is_match(&s) {
                return false;
            }
        }
        true
    }
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("invalid glob `{pat}`"))?);
    }
    Ok(Some(b.build()?))
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

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    source_dir: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    image_name: Option<String>,
    manifest_name: Option<String>,
    max_row_width: Option<u32>,
    extensions: Option<Vec<String>>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_atlas_config(self, mut cfg: AtlasConfig) -> AtlasConfig {
        if let Some(v) = self.source_dir {
            cfg.source_dir = v;
        }
        if let Some(v) = self.out_dir {
            cfg.out_dir = v;
        }
        if let Some(v) = self.image_name {
            cfg.image_name = v;
        }
        if let Some(v) = self.manifest_name {
            cfg.manifest_name = v;
        }
        if let Some(v) = self.max_row_width {
            cfg.max_row_width = v;
        }
        if let Some(v) = self.extensions {
            cfg.extensions = v;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        cfg
    }
}
