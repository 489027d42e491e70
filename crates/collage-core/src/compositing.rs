//! Two-pass rendering of a packed layout: measure the canvas, then paste every
//! image at its row's scale.

use crate::config::CollageConfig;
use crate::error::{CollageError, Result};
use crate::geometry::{fit_within, scale};
use crate::model::{Layout, RenderReport, Row};
use crate::source::ImageSource;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use std::fmt::Debug;
use tracing::{debug, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Rendered canvas and what went into it.
pub struct Rendered {
    pub canvas: RgbImage,
    pub report: RenderReport,
}

/// Canvas height for `layout`: one `floor(row_height / coefficient) + margin` band per
/// non-empty row.
pub fn measure<K>(layout: &Layout<K>, margin: u32) -> Result<u32> {
    if layout.non_empty_rows().next().is_none() {
        return Err(CollageError::EmptyLayout);
    }
    let height = layout.canvas_height(margin);
    if height == 0 {
        return Err(CollageError::ZeroHeight);
    }
    u32::try_from(height).map_err(|_| {
        CollageError::InvalidConfig(format!("canvas height {height} exceeds {}", u32::MAX))
    })
}

/// Renders `layout` onto a fresh `layout.width x measured height` canvas.
///
/// Images are reloaded from `source`. One that fails to load is logged, not counted,
/// and leaves no gap in its row. If none of them loads the canvas would be blank, and
/// [`CollageError::ZeroHeight`] is returned instead.
#[instrument(skip_all, fields(rows = layout.rows.len(), width = layout.width))]
pub fn render<K, S>(layout: &Layout<K>, source: &S, cfg: &CollageConfig) -> Result<Rendered>
where
    K: Debug + Send + Sync,
    S: ImageSource<K> + ?Sized,
{
    let height = measure(layout, cfg.margin)?;
    let mut canvas = RgbImage::from_pixel(layout.width, height, Rgb(cfg.background));
    debug!(width = layout.width, height, "allocated canvas");

    let mut report = RenderReport {
        width: layout.width,
        height,
        ..Default::default()
    };
    let mut y = 0u32;
    for row in layout.non_empty_rows() {
        let mut x = 0u32;
        for (key, prepared) in row.items.iter().zip(prepare_row(row, layout, source, cfg)) {
            match prepared {
                Ok(img) => {
                    blit_rgb(&img, &mut canvas, x, y);
                    x = x.saturating_add(img.width()).saturating_add(cfg.margin);
                    report.images_used += 1;
                }
                Err(e) => {
                    warn!(?key, error = %e, "skip image while rendering");
                    report.render_failures += 1;
                }
            }
        }
        y = y.saturating_add(row.rendered_height(layout.row_height, cfg.margin));
    }
    if report.images_used == 0 {
        warn!(failures = report.render_failures, "no image could be rendered");
        return Err(CollageError::ZeroHeight);
    }
    Ok(Rendered { canvas, report })
}

fn prepare_row<K, S>(
    row: &Row<K>,
    layout: &Layout<K>,
    source: &S,
    cfg: &CollageConfig,
) -> Vec<Result<RgbImage>>
where
    K: Send + Sync,
    S: ImageSource<K> + ?Sized,
{
    let target = row.target_height(layout.row_height);
    let bounds = (
        (layout.width as f64 / row.coefficient) as u32,
        target as u32,
    );
    let prepare = |key: &K| -> Result<RgbImage> {
        let img = source.open(key)?;
        Ok(fit_to_row(img, target, bounds).to_rgb8())
    };

    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            return row.items.par_iter().map(prepare).collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = cfg;
    row.items.iter().map(prepare).collect()
}

/// Scales `img` to the row's `target` height.
///
/// Enlarging uses a Lanczos resize to exactly `size * k`; shrinking uses the fast
/// thumbnail path bounded by `bounds`.
pub fn fit_to_row(img: DynamicImage, target: f64, bounds: (u32, u32)) -> DynamicImage {
    let size = (img.width(), img.height());
    if size.1 == 0 {
        return img;
    }
    let k = target / size.1 as f64;
    if k > 1.0 {
        let (w, h) = scale(size, k);
        img.resize_exact(w.max(1), h.max(1), FilterType::Lanczos3)
    } else {
        let (w, h) = fit_within(size, bounds);
        if (w, h) == size {
            img
        } else {
            img.thumbnail_exact(w, h)
        }
    }
}

/// Copy `src` into `canvas` with its top-left corner at (dx, dy), clipping at the
/// canvas edges.
pub fn blit_rgb(src: &RgbImage, canvas: &mut RgbImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    if dx >= cw || dy >= ch {
        return;
    }
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
