use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A measured source image. `name` is the file stem and is unique within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// File the dimensions were read from; re-read at composite time.
    pub path: PathBuf,
}

impl ImageDescriptor {
    pub fn new(name: impl Into<String>, width: u32, height: u32, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            path: path.into(),
        }
    }
}

/// A horizontal band of the atlas, packed left to right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub images: Vec<ImageDescriptor>,
}

impl Row {
    /// Vertical advance of this row: the tallest member.
    pub fn height(&self) -> u32 {
        self.images.iter().map(|d| d.height).max().unwrap_or(0)
    }
    /// Summed member widths.
    pub fn width(&self) -> u32 {
        self.images.iter().map(|d| d.width).sum()
    }
    pub fn len(&self) -> usize {
        self.images.len()
    }
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// An image positioned on the canvas; `x,y` is its top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedImage {
    pub image: ImageDescriptor,
    pub x: u32,
    pub y: u32,
}

/// Result of walking the rows once. Both the compositor and the manifest read from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    /// Placements in row order, left to right.
    pub placed: Vec<PlacedImage>,
    pub row_count: usize,
}

/// Manifest entry for one image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: u32,
    pub visible: bool,
}

impl Placement {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            pixel_ratio: 1,
            visible: true,
        }
    }

    /// True if the half-open rectangles `[x, x+w) × [y, y+h)` intersect.
    pub fn overlaps(&self, other: &Placement) -> bool {
        !(self.x >= other.x.saturating_add(other.width)
            || other.x >= self.x.saturating_add(self.width)
            || self.y >= other.y.saturating_add(other.height)
            || other.y >= self.y.saturating_add(self.height))
    }
}

/// Image name -> placement. Sorted by name so serialization is byte-stable.
pub type Manifest = BTreeMap<String, Placement>;

/// Statistics about atlas packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AtlasStats {
    pub num_rows: usize,
    pub num_images: usize,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// `canvas_width * canvas_height`.
    pub canvas_area: u64,
    /// Sum of image areas.
    pub used_area: u64,
    /// used_area / canvas_area (0.0 to 1.0).
    pub occupancy: f64,
}

impl Layout {
    /// Computes packing statistics for this layout.
    pub fn stats(&self) -> AtlasStats {
        let canvas_area = (self.width as u64) * (self.height as u64);
        let used_area: u64 = self
            .placed
            .iter()
            .map(|p| (p.image.width as u64) * (p.image.height as u64))
            .sum();
        let occupancy = if canvas_area > 0 {
            used_area as f64 / canvas_area as f64
        } else {
            0.0
        };
        AtlasStats {
            num_rows: self.row_count,
            num_images: self.placed.len(),
            canvas_width: self.width,
            canvas_height: self.height,
            canvas_area,
            used_area,
            occupancy,
        }
    }
}

impl AtlasStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Rows: {}, Images: {}, Canvas: {}x{}, Occupancy: {:.2}%, Used Area: {} px², Wasted: {} px²",
            self.num_rows,
            self.num_images,
            self.canvas_width,
            self.canvas_height,
            self.occupancy * 100.0,
            self.used_area,
            self.wasted_area(),
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.canvas_area.saturating_sub(self.used_area)
    }
}
