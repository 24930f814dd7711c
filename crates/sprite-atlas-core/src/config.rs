use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Atlas configuration.
/// Key notes:
///   - `max_row_width` bounds the running width of every row; an image wider than it gets a row of its own
///   - `extensions` selects which files in `source_dir` are treated as images (ASCII case-insensitive)
///   - `parallel` only takes effect when the crate is built with the `parallel` feature
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Directory scanned for source images (not recursive).
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Directory receiving the atlas image and manifest.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// File name of the composite PNG inside `out_dir`.
    #[serde(default = "default_image_name")]
    pub image_name: String,
    /// File name of the JSON manifest inside `out_dir`.
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,
    /// Maximum summed width of the images in one row, in pixels.
    #[serde(default = "default_max_row_width")]
    pub max_row_width: u32,
    /// Accepted file extensions, without the dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Decode sources in parallel while compositing.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            out_dir: default_out_dir(),
            image_name: default_image_name(),
            manifest_name: default_manifest_name(),
            max_row_width: default_max_row_width(),
            extensions: default_extensions(),
            parallel: false,
        }
    }
}

impl AtlasConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - `max_row_width` is zero
    /// - no extension is accepted
    /// - an output file name is empty, contains a path separator, or both names collide
    /// - `image_name` does not have a `.png` extension (the atlas is always PNG-encoded)
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::AtlasError;

        if self.max_row_width == 0 {
            return Err(AtlasError::InvalidDimensions {
                width: self.max_row_width,
                height: 0,
            });
        }

        if self.extensions.iter().all(|e| e.trim_start_matches('.').is_empty()) {
            return Err(AtlasError::InvalidConfig(
                "at least one image extension is required".into(),
            ));
        }

        for (field, name) in [
            ("image_name", &self.image_name),
            ("manifest_name", &self.manifest_name),
        ] {
            if name.is_empty() {
                return Err(AtlasError::InvalidConfig(format!("{field} is empty")));
            }
            if name.contains('/') || name.contains('\\') {
                return Err(AtlasError::InvalidConfig(format!(
                    "{field} must be a plain file name, got `{name}`"
                )));
            }
        }

        let is_png = Path::new(&self.image_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if !is_png {
            return Err(AtlasError::InvalidConfig(format!(
                "image_name must end in .png, got `{}`",
                self.image_name
            )));
        }

        if self.image_name == self.manifest_name {
            return Err(AtlasError::InvalidConfig(format!(
                "image_name and manifest_name are both `{}`",
                self.image_name
            )));
        }

        Ok(())
    }

    /// Returns true if `ext` (without the dot) is one of the accepted extensions.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions
            .iter()
            .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    /// Full path of the atlas image.
    pub fn image_path(&self) -> PathBuf {
        self.out_dir.join(&self.image_name)
    }

    /// Full path of the manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.out_dir.join(&self.manifest_name)
    }
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("icons")
}
fn default_out_dir() -> PathBuf {
    PathBuf::from("out")
}
fn default_image_name() -> String {
    "sprite.png".into()
}
fn default_manifest_name() -> String {
    "sprite.json".into()
}
fn default_max_row_width() -> u32 {
    255
}
fn default_extensions() -> Vec<String> {
    vec!["png".into()]
}

/// Builder for `AtlasConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct AtlasConfigBuilder {
    cfg: AtlasConfig,
}

impl AtlasConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: AtlasConfig::default(),
        }
    }
    pub fn source_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.cfg.source_dir = v.into();
        self
    }
    pub fn out_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.cfg.out_dir = v.into();
        self
    }
    pub fn image_name(mut self, v: impl Into<String>) -> Self {
        self.cfg.image_name = v.into();
        self
    }
    pub fn manifest_name(mut self, v: impl Into<String>) -> Self {
        self.cfg.manifest_name = v.into();
        self
    }
    pub fn max_row_width(mut self, v: u32) -> Self {
        self.cfg.max_row_width = v;
        self
    }
    pub fn extensions<I, S>(mut self, v: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cfg.extensions = v.into_iter().map(Into::into).collect();
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> AtlasConfig {
        self.cfg
    }
}

impl AtlasConfig {
    /// Create a fluent builder for `AtlasConfig`.
    pub fn builder() -> AtlasConfigBuilder {
        AtlasConfigBuilder::new()
    }
}
