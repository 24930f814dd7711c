use crate::config::AtlasConfig;
use crate::error::{AtlasError, Result};
use crate::model::ImageDescriptor;
use image::ImageReader;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

/// Scans `dir` (non-recursive) and measures every file with an accepted extension.
///
/// Entries are visited in file-name order, so the result is deterministic.
/// Files that cannot be opened or fully decoded are skipped with a warning.
pub fn scan_dir(dir: &Path, cfg: &AtlasConfig) -> Result<Vec<ImageDescriptor>> {
    scan_dir_with(dir, cfg, |_| true)
}

/// Like [`scan_dir`], but `filter` can reject a candidate path before it is measured.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn scan_dir_with<F>(dir: &Path, cfg: &AtlasConfig, filter: F) -> Result<Vec<ImageDescriptor>>
where
    F: Fn(&Path) -> bool,
{
    // fail early and loudly on the root; per-entry errors below are recoverable
    let meta = std::fs::metadata(dir).map_err(|source| AtlasError::SourceDir {
        path: dir.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(AtlasError::SourceDir {
            path: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        });
    }
    std::fs::read_dir(dir).map_err(|source| AtlasError::SourceDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut list = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skip unreadable entry");
                continue;
            }
        };
        let p = entry.path();
        if !entry.file_type().is_file() && !p.is_file() {
            continue;
        }
        if !is_image(p, cfg) {
            debug!(?p, "not an image, skipped");
            continue;
        }
        if !filter(p) {
            debug!(?p, "filtered out");
            continue;
        }
        let Some(name) = p.file_stem().and_then(|s| s.to_str()) else {
            warn!(?p, "skip image with non UTF-8 name");
            continue;
        };
        if seen.contains(name) {
            warn!(?p, name, "skip image with duplicate name");
            continue;
        }
        match measure(p) {
            Ok((0, _)) | Ok((_, 0)) => {
                warn!(?p, "skip empty image");
            }
            Ok((w, h)) => {
                seen.insert(name.to_string());
                list.push(ImageDescriptor::new(name, w, h, p));
            }
            Err(e) => {
                warn!(?p, error = %e, "skip image");
            }
        }
    }
    debug!(count = list.len(), "catalogued images");
    Ok(list)
}

fn is_image(p: &Path, cfg: &AtlasConfig) -> bool {
    p.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| cfg.accepts_extension(ext))
}

/// Decodes the whole image so truncated pixel data is caught here, not at composite time.
fn measure(p: &Path) -> Result<(u32, u32)> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok((img.width(), img.height()))
}
