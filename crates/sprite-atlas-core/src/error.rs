use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Cannot read source directory {}: {source}", .path.display())]
    SourceDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Source image `{name}` at {} could not be re-read: {source}", .path.display())]
    SourceVanished {
        name: String,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(
        "Source image `{name}` changed size since it was catalogued: expected {expected:?}, found {found:?}"
    )]
    SourceChanged {
        name: String,
        expected: (u32, u32),
        found: (u32, u32),
    },
    #[error("Cannot write output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid atlas dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Encoding error: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, AtlasError>;
