use crate::error::{AtlasError, Result};
use crate::model::{Layout, PlacedImage};
use image::{ImageReader, Rgba, RgbaImage};
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Fully transparent pixel used to initialize the canvas.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Allocates a `w`×`h` canvas with every pixel set to [`TRANSPARENT`].
pub fn new_transparent_canvas(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_pixel(w, h, TRANSPARENT)
}

/// Copy every pixel of `src` into `canvas` with its top-left at (dx, dy).
///
/// Plain per-pixel copy: no blending, scaling or color conversion.
/// Pixels that would land outside the canvas are dropped.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    for yy in 0..sh {
        if dy + yy >= ch {
            break;
        }
        for xx in 0..sw {
            if dx + xx >= cw {
                break;
            }
            canvas.put_pixel(dx + xx, dy + yy, *src.get_pixel(xx, yy));
        }
    }
}

/// Re-reads every placed source and draws it onto a fresh transparent canvas.
///
/// Any source that can no longer be decoded, or whose size changed since it was
/// catalogued, fails the whole composite.
#[instrument(skip_all, fields(width = layout.width, height = layout.height))]
pub fn compose(layout: &Layout, parallel: bool) -> Result<RgbaImage> {
    let mut canvas = new_transparent_canvas(layout.width, layout.height);

    #[cfg(feature = "parallel")]
    {
        if parallel {
            let sources: Vec<RgbaImage> = layout
                .placed
                .par_iter()
                .map(load_source)
                .collect::<Result<_>>()?;
            for (p, src) in layout.placed.iter().zip(&sources) {
                blit_rgba(src, &mut canvas, p.x, p.y);
            }
            return Ok(canvas);
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    for p in &layout.placed {
        let src = load_source(p)?;
        blit_rgba(&src, &mut canvas, p.x, p.y);
    }
    Ok(canvas)
}

fn load_source(p: &PlacedImage) -> Result<RgbaImage> {
    let img = &p.image;
    let vanished = |source: image::ImageError| AtlasError::SourceVanished {
        name: img.name.clone(),
        path: img.path.clone(),
        source,
    };
    let rgba = ImageReader::open(&img.path)
        .map_err(image::ImageError::IoError)
        .and_then(|r| r.with_guessed_format().map_err(image::ImageError::IoError))
        .and_then(|r| r.decode())
        .map_err(vanished)?
        .to_rgba8();
    let found = rgba.dimensions();
    if found != (img.width, img.height) {
        return Err(AtlasError::SourceChanged {
            name: img.name.clone(),
            expected: (img.width, img.height),
            found,
        });
    }
    debug!(name = %img.name, x = p.x, y = p.y, "blit");
    Ok(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_canvas_is_transparent() {
        let c = new_transparent_canvas(4, 3);
        assert!(c.pixels().all(|p| *p == TRANSPARENT));
    }

    #[test]
    fn blit_copies_alpha_verbatim() {
        let mut src = RgbaImage::new(2, 2);
        src.put_pixel(0, 0, Rgba([10, 20, 30, 0]));
        src.put_pixel(1, 1, Rgba([1, 2, 3, 128]));
        let mut canvas = RgbaImage::from_pixel(5, 5, Rgba([255, 255, 255, 255]));
        blit_rgba(&src, &mut canvas, 3, 3);
        assert_eq!(*canvas.get_pixel(3, 3), Rgba([10, 20, 30, 0]));
        assert_eq!(*canvas.get_pixel(4, 4), Rgba([1, 2, 3, 128]));
        assert_eq!(*canvas.get_pixel(2, 2), Rgba([255, 255, 255, 255]));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_decode_matches_sequential() {
        use crate::config::AtlasConfig;
        use crate::packer::{layout_rows, pack_rows};

        let dir = tempfile::tempdir().unwrap();
        for i in 0..12u32 {
            let (w, h) = (10 + i * 7, 5 + i * 3);
            let mut img = RgbaImage::new(w, h);
            for y in 0..h {
                for x in 0..w {
                    let a = ((x + i) % 256) as u8;
                    img.put_pixel(x, y, Rgba([x as u8, y as u8, i as u8, a]));
                }
            }
            img.save(dir.path().join(format!("icon_{i:02}.png"))).unwrap();
        }
        let cfg = AtlasConfig::default();
        let images = crate::catalog::scan_dir(dir.path(), &cfg).unwrap();
        let layout = layout_rows(&pack_rows(images, cfg.max_row_width), cfg.max_row_width);

        let parallel = compose(&layout, true).unwrap();
        let sequential = compose(&layout, false).unwrap();
        assert_eq!(parallel.dimensions(), sequential.dimensions());
        assert_eq!(parallel.as_raw(), sequential.as_raw());
    }

    #[test]
    fn blit_clips_at_canvas_edge() {
        let src = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 9]));
        let mut canvas = new_transparent_canvas(3, 3);
        blit_rgba(&src, &mut canvas, 2, 2);
        assert_eq!(*canvas.get_pixel(2, 2), Rgba([9, 9, 9, 9]));
        assert_eq!(*canvas.get_pixel(1, 1), TRANSPARENT);
    }
}
