//! Core library for arranging photographs into a row-packed collage.
//!
//! - Orientation: EXIF tags 1-8 map to a small [`Transform`] enum applied before sizing
//! - Packing: images fill rows in order with a soft wrap; the target row height shrinks
//!   until no row is left holding a single image
//! - Compositing: rows are scaled to span the canvas width and pasted onto one RGB canvas
//!
//! Quick example:
//! ```ignore
//! use collage_core::{CollageConfig, FsSource, make_collage};
//! # fn main() -> anyhow::Result<()> {
//! let keys = vec!["a.jpg".to_string(), "b.png".to_string()];
//! let cfg = CollageConfig::builder().with_dimensions(1200, 300).build();
//! let out = make_collage(&keys, &FsSource, &cfg)?;
//! println!("{} photos used", out.report.images_used);
//! out.image.save("collage.jpg")?;
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod model;
pub mod orientation;
pub mod packer;
pub mod pipeline;
pub mod source;

pub use compositing::{Rendered, measure, render};
pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use orientation::{Step, Transform, normalize};
pub use packer::{pack, pack_sizes};
pub use pipeline::*;
pub use source::{FsSource, ImageSource, MemorySource};

/// Convenience prelude for common types and functions.
/// Importing `collage_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{CollageConfig, CollageConfigBuilder, MARGIN_SIZE};
    pub use crate::error::CollageError;
    pub use crate::model::{CollageReport, Layout, RenderReport, Row};
    pub use crate::orientation::Transform;
    pub use crate::packer::{PackState, SizedImage, Verdict};
    pub use crate::source::{FsSource, ImageSource, MemorySource};
    pub use crate::{CollageOutput, make_collage, measure, pack, pack_sizes, render};
}
