//! Row packing: partition an ordered list of images into rows of roughly equal
//! height, shrinking the target row height until no row is left with a single image.

use crate::config::CollageConfig;
use crate::error::{CollageError, Result};
use crate::model::Layout;
use crate::source::ImageSource;
use std::fmt::Debug;
use tracing::{instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub mod rows;
pub mod state;

pub use rows::{SizedImage, fill_rows};
pub use state::{PackState, Verdict, evaluate, transition};

/// Packs `keys` into rows, reading each image's oriented size from `source`.
///
/// Images whose size cannot be read are logged and left out of the layout (listed in
/// `Layout::skipped`); the order of the remaining images is preserved.
#[instrument(skip_all, fields(count = keys.len()))]
pub fn pack<K, S>(keys: &[K], source: &S, cfg: &CollageConfig) -> Result<Layout<K>>
where
    K: Clone + Debug + Send + Sync,
    S: ImageSource<K> + ?Sized,
{
    cfg.validate()?;
    if keys.is_empty() {
        return Err(CollageError::EmptyInput);
    }
    let (items, skipped) = probe(keys, source, cfg);
    Ok(run(&items, &skipped, cfg))
}

/// Layout-only packing from known sizes `(key, width, height)`; no image access.
pub fn pack_sizes<K: Clone>(items: Vec<(K, u32, u32)>, cfg: &CollageConfig) -> Result<Layout<K>> {
    cfg.validate()?;
    if items.is_empty() {
        return Err(CollageError::EmptyInput);
    }
    let items: Vec<SizedImage<K>> = items
        .into_iter()
        .map(|(key, w, h)| SizedImage::new(key, w, h))
        .collect();
    Ok(run(&items, &[], cfg))
}

fn run<K: Clone>(items: &[SizedImage<K>], skipped: &[K], cfg: &CollageConfig) -> Layout<K> {
    let mut state = PackState::start(cfg);
    loop {
        state = match transition(state, items, skipped, cfg) {
            PackState::Converged(layout) => return layout,
            next => next,
        };
    }
}

/// Reads every image's oriented size once, keeping input order.
fn probe<K, S>(keys: &[K], source: &S, cfg: &CollageConfig) -> (Vec<SizedImage<K>>, Vec<K>)
where
    K: Clone + Debug + Send + Sync,
    S: ImageSource<K> + ?Sized,
{
    #[cfg(feature = "parallel")]
    let sizes: Vec<Result<(u32, u32)>> = if cfg.parallel {
        keys.par_iter().map(|k| source.dimensions(k)).collect()
    } else {
        keys.iter().map(|k| source.dimensions(k)).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let sizes: Vec<Result<(u32, u32)>> = {
        let _ = cfg;
        keys.iter().map(|k| source.dimensions(k)).collect()
    };

    let mut items = Vec::with_capacity(keys.len());
    let mut skipped = Vec::new();
    for (key, size) in keys.iter().zip(sizes) {
        match size {
            Ok((w, h)) if w > 0 && h > 0 => items.push(SizedImage {
                key: key.clone(),
                size: (w, h),
            }),
            Ok((w, h)) => {
                warn!(?key, w, h, "skip image with empty dimensions");
                skipped.push(key.clone());
            }
            Err(e) => {
                warn!(?key, error = %e, "skip image");
                skipped.push(key.clone());
            }
        }
    }
    (items, skipped)
}
