use crate::error::{AtlasError, Result};
use crate::manifest::to_json_string;
use crate::model::Manifest;
use image::{ImageFormat, RgbaImage};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Paths of a successfully written atlas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenAtlas {
    pub image_path: PathBuf,
    pub manifest_path: PathBuf,
}

/// Writes the canvas as PNG and the manifest as JSON into `out_dir`.
///
/// Both payloads are encoded in memory and staged as temporary siblings before being
/// renamed into place. If any step fails, staged files are removed and a target that was
/// already replaced is restored, so the pair is written together or not at all.
/// Existing files at the target paths are overwritten.
#[instrument(skip_all, fields(out_dir = %out_dir.display()))]
pub fn write_atlas(
    out_dir: &Path,
    image_name: &str,
    manifest_name: &str,
    canvas: &RgbaImage,
    manifest: &Manifest,
) -> Result<WrittenAtlas> {
    fs::create_dir_all(out_dir).map_err(|source| AtlasError::OutputDir {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut png = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| AtlasError::Encode(e.to_string()))?;
    let json = to_json_string(manifest)?;

    let image_path = out_dir.join(image_name);
    let manifest_path = out_dir.join(manifest_name);
    let mut staged = vec![
        Staged::new(out_dir, image_name),
        Staged::new(out_dir, manifest_name),
    ];

    let result = stage_and_commit(&mut staged, [&png[..], json.as_bytes()]);
    if let Err(e) = result {
        for s in staged.iter().rev() {
            s.rollback();
        }
        return Err(e);
    }
    for s in &staged {
        s.discard_backup();
    }

    info!(?image_path, ?manifest_path, entries = manifest.len(), "atlas written");
    Ok(WrittenAtlas {
        image_path,
        manifest_path,
    })
}

fn stage_and_commit(staged: &mut [Staged], payloads: [&[u8]; 2]) -> Result<()> {
    for (s, bytes) in staged.iter_mut().zip(payloads) {
        fs::write(&s.tmp, bytes)?;
        s.written = true;
    }
    for s in staged.iter_mut() {
        if s.target.exists() {
            fs::rename(&s.target, &s.backup)?;
            s.backed_up = true;
        }
        fs::rename(&s.tmp, &s.target)?;
        s.written = false;
        s.committed = true;
    }
    Ok(())
}

/// One output file moving through tmp -> target, with the previous target kept as backup.
struct Staged {
    target: PathBuf,
    tmp: PathBuf,
    backup: PathBuf,
    written: bool,
    backed_up: bool,
    committed: bool,
}

impl Staged {
    fn new(dir: &Path, name: &str) -> Self {
        Self {
            target: dir.join(name),
            tmp: dir.join(format!(".{name}.tmp")),
            backup: dir.join(format!(".{name}.bak")),
            written: false,
            backed_up: false,
            committed: false,
        }
    }

    fn rollback(&self) {
        if self.written {
            let _ = fs::remove_file(&self.tmp);
        }
        if self.committed {
            let _ = fs::remove_file(&self.target);
        }
        if self.backed_up {
            if let Err(e) = fs::rename(&self.backup, &self.target) {
                warn!(path = ?self.target, error = %e, "could not restore previous file");
            }
        }
    }

    fn discard_backup(&self) {
        if self.backed_up {
            let _ = fs::remove_file(&self.backup);
        }
    }
}
