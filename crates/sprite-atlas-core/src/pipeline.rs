use crate::catalog::scan_dir_with;
use crate::compositing::compose;
use crate::config::AtlasConfig;
use crate::error::Result;
use crate::manifest::build_manifest;
use crate::model::{AtlasStats, Layout, Manifest, Row};
use crate::packer::{layout_rows, pack_rows};
use crate::writer::{WrittenAtlas, write_atlas};
use image::RgbaImage;
use std::path::Path;
use tracing::{info, instrument};

/// Output of a packing run: rows, the layout walk, the composite canvas and its manifest.
pub struct PackOutput {
    pub rows: Vec<Row>,
    pub layout: Layout,
    pub canvas: RgbaImage,
    pub manifest: Manifest,
}

impl PackOutput {
    /// Computes packing statistics for this output.
    /// This is a convenience method that delegates to `layout.stats()`.
    pub fn stats(&self) -> AtlasStats {
        self.layout.stats()
    }
}

/// Catalogs `cfg.source_dir`, packs it into rows and composites the atlas in memory.
///
/// Returns `Ok(None)` when the directory holds no usable image.
pub fn pack_directory(cfg: &AtlasConfig) -> Result<Option<PackOutput>> {
    pack_directory_with(cfg, |_| true)
}

/// Like [`pack_directory`], with a path filter applied while cataloging.
#[instrument(skip_all, fields(source_dir = %cfg.source_dir.display()))]
pub fn pack_directory_with<F>(cfg: &AtlasConfig, filter: F) -> Result<Option<PackOutput>>
where
    F: Fn(&Path) -> bool,
{
    cfg.validate()?;

    let images = scan_dir_with(&cfg.source_dir, cfg, filter)?;
    if images.is_empty() {
        info!("no images found, nothing to pack");
        return Ok(None);
    }
    info!(count = images.len(), "catalogued source images");

    let rows = pack_rows(images, cfg.max_row_width);
    let layout = layout_rows(&rows, cfg.max_row_width);
    let canvas = compose(&layout, cfg.parallel)?;
    let manifest = build_manifest(&layout);

    Ok(Some(PackOutput {
        rows,
        layout,
        canvas,
        manifest,
    }))
}

/// Packs `cfg.source_dir` and writes the atlas image and manifest into `cfg.out_dir`.
///
/// An empty source directory is a no-op: nothing is written and `Ok(None)` is returned.
pub fn run(cfg: &AtlasConfig) -> Result<Option<WrittenAtlas>> {
    run_with(cfg, |_| true)
}

/// Like [`run`], with a path filter applied while cataloging.
pub fn run_with<F>(cfg: &AtlasConfig, filter: F) -> Result<Option<WrittenAtlas>>
where
    F: Fn(&Path) -> bool,
{
    let Some(out) = pack_directory_with(cfg, filter)? else {
        return Ok(None);
    };
    let written = write_atlas(
        &cfg.out_dir,
        &cfg.image_name,
        &cfg.manifest_name,
        &out.canvas,
        &out.manifest,
    )?;
    info!(stats = %out.stats().summary(), "packing finished");
    Ok(Some(written))
}
