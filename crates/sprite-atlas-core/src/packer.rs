use crate::model::{ImageDescriptor, Layout, PlacedImage, Row};
use std::cmp::Ordering;
use tracing::debug;

/// Sorts descriptors by name descending, then height descending for equal names.
///
/// This is the exact net effect of sorting by (name, height) ascending and reversing
/// the whole sequence; the atlas layout depends on it, so it must not change.
pub fn sort_descriptors(images: &mut [ImageDescriptor]) {
    images.sort_by(layout_order);
}

fn layout_order(a: &ImageDescriptor, b: &ImageDescriptor) -> Ordering {
    b.name.cmp(&a.name).then_with(|| b.height.cmp(&a.height))
}

/// Greedy single-pass row packing.
///
/// `images` is sorted with [`sort_descriptors`] first. An image that pushes the running
/// width past `max_row_width` closes the current row and is retried on a fresh one.
/// An image wider than `max_row_width` on its own is force-placed into an empty row,
/// and the row is closed behind it.
pub fn pack_rows(mut images: Vec<ImageDescriptor>, max_row_width: u32) -> Vec<Row> {
    sort_descriptors(&mut images);

    let mut rows: Vec<Row> = Vec::new();
    let mut current = Row::default();
    let mut row_width: u64 = 0;
    let mut queue = images.into_iter();
    let mut pending: Option<ImageDescriptor> = queue.next();

    while let Some(image) = pending.take() {
        let next_width = row_width + image.width as u64;
        if next_width > max_row_width as u64 && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            row_width = 0;
            // retry the same image on the fresh row
            pending = Some(image);
            continue;
        }
        if next_width > max_row_width as u64 {
            debug!(
                name = %image.name,
                width = image.width,
                max_row_width,
                "image wider than a row, placed alone"
            );
        }
        row_width = next_width;
        current.images.push(image);
        pending = queue.next();
    }
    if !current.is_empty() {
        rows.push(current);
    }
    rows
}

/// Walks the rows in order and assigns each image its top-left corner.
///
/// Canvas width is `max_row_width`, widened to the widest row when a single image
/// exceeds it. Canvas height is the sum of row heights.
pub fn layout_rows(rows: &[Row], max_row_width: u32) -> Layout {
    let mut placed = Vec::with_capacity(rows.iter().map(Row::len).sum());
    let mut width = max_row_width;
    let mut y = 0u32;
    for row in rows {
        let mut x = 0u32;
        for image in &row.images {
            placed.push(PlacedImage {
                image: image.clone(),
                x,
                y,
            });
            x += image.width;
        }
        width = width.max(x);
        y += row.height();
    }
    Layout {
        width,
        height: y,
        placed,
        row_count: rows.len(),
    }
}
