//! Core library for packing a directory of icons into a single sprite atlas.
//!
//! - Catalog: scan one directory (non-recursive) and measure every accepted image
//! - Packer: sort by name (desc), then greedy row packing under `max_row_width`
//! - Compositing: copy pixels onto a transparent canvas at the packed coordinates
//! - Manifest: `{ name: { x, y, width, height, pixelRatio, visible } }` built from the same walk
//! - Writer: PNG + JSON written together or not at all
//!
//! Quick example:
//! ```ignore
//! use sprite_atlas_core::{AtlasConfig, run};
//! # fn main() -> anyhow::Result<()> {
//! let cfg = AtlasConfig::builder()
//!     .source_dir("assets/icons")
//!     .out_dir("dist")
//!     .max_row_width(255)
//!     .build();
//! match run(&cfg)? {
//!     Some(w) => println!("wrote {}", w.image_path.display()),
//!     None => println!("no icons"),
//! }
//! # Ok(()) }
//! ```

pub mod catalog;
pub mod compositing;
pub mod config;
pub mod error;
pub mod manifest;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod writer;

pub use catalog::*;
pub use compositing::*;
pub use config::*;
pub use error::*;
pub use manifest::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;
pub use writer::*;

/// Convenience prelude for common types and functions.
/// Importing `sprite_atlas_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{AtlasConfig, AtlasConfigBuilder};
    pub use crate::error::AtlasError;
    pub use crate::model::{
        AtlasStats, ImageDescriptor, Layout, Manifest, PlacedImage, Placement, Row,
    };
    pub use crate::writer::WrittenAtlas;
    pub use crate::{
        PackOutput, build_manifest, compose, layout_rows, pack_directory, pack_rows, run,
        scan_dir, write_atlas,
    };
}
