use crate::compositing::{Rendered, render};
use crate::config::CollageConfig;
use crate::error::Result;
use crate::model::{CollageReport, Layout};
use crate::packer::pack;
use crate::source::ImageSource;
use image::DynamicImage;
use std::fmt::Debug;
use std::time::Instant;
use tracing::{info, instrument};

/// Output of a collage run: final image, the layout it was drawn from, and a report.
pub struct CollageOutput<K = String> {
    pub image: DynamicImage,
    pub layout: Layout<K>,
    pub report: CollageReport,
}

#[instrument(skip_all, fields(count = keys.len()))]
/// Packs `keys` into rows and composites them into a single image.
///
/// Notes:
/// - Per-image load failures are logged and skipped; they show up in the report.
/// - Fails with `EmptyInput` when `keys` is empty, `EmptyLayout`/`ZeroHeight` when
///   nothing could be placed.
/// - With `cfg.greyscale` the result is a single-channel luma image, otherwise RGB.
pub fn make_collage<K, S>(keys: &[K], source: &S, cfg: &CollageConfig) -> Result<CollageOutput<K>>
where
    K: Clone + Debug + Send + Sync,
    S: ImageSource<K> + ?Sized,
{
    let start = Instant::now();
    let layout = pack(keys, source, cfg)?;
    info!(
        rows = layout.rows.len(),
        row_height = layout.row_height,
        attempts = layout.attempts,
        skipped = layout.skipped.len(),
        "packed"
    );

    let Rendered { canvas, report } = render(&layout, source, cfg)?;
    let image = finish(canvas, cfg.greyscale);
    let report = CollageReport::new(&layout, &report, keys.len(), cfg.greyscale);
    info!(
        used = report.images_used,
        width = report.width,
        height = report.height,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "collage rendered"
    );
    Ok(CollageOutput {
        image,
        layout,
        report,
    })
}

/// Wraps the canvas for saving, converting to single-channel luma when requested.
pub fn finish(canvas: image::RgbImage, greyscale: bool) -> DynamicImage {
    let image = DynamicImage::ImageRgb8(canvas);
    if greyscale {
        DynamicImage::ImageLuma8(image.to_luma8())
    } else {
        image
    }
}
