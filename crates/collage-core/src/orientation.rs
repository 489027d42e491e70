//! EXIF orientation as a small set of geometric transforms.
//!
//! Each of the 8 EXIF orientation values maps to one [`Transform`], which in turn
//! expands to at most two primitive [`Step`]s applied in order. Rotations are
//! clockwise and canvas-expanding: a 90° turn of a `w x h` image yields `h x w`.
//!
//! ```text
//!     tag  transform          steps
//!     1    Identity           -
//!     2    MirrorH            mirror-h
//!     3    Rotate180          rot180
//!     4    MirrorV            rot180 + mirror-h  (== mirror-v)
//!     5    Rotate90MirrorH    rot90 + mirror-h
//!     6    Rotate90           rot90
//!     7    Rotate270MirrorH   rot270 + mirror-h
//!     8    Rotate270          rot270
//! ```

use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Primitive geometric operation on an image.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    Rotate90,
    Rotate180,
    Rotate270,
    MirrorH,
    MirrorV,
}

impl Step {
    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Step::Rotate90 => image.rotate90(),
            Step::Rotate180 => image.rotate180(),
            Step::Rotate270 => image.rotate270(),
            Step::MirrorH => image.fliph(),
            Step::MirrorV => image.flipv(),
        }
    }

    pub fn apply_to_size(self, (w, h): (u32, u32)) -> (u32, u32) {
        match self {
            Step::Rotate90 | Step::Rotate270 => (h, w),
            Step::Rotate180 | Step::MirrorH | Step::MirrorV => (w, h),
        }
    }
}

/// Canonicalizing transform for one EXIF orientation value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    #[default]
    Identity,
    MirrorH,
    Rotate180,
    MirrorV,
    Rotate90MirrorH,
    Rotate90,
    Rotate270MirrorH,
    Rotate270,
}

impl Transform {
    /// Indexed by EXIF value - 1.
    const ALL: [Self; 8] = [
        Self::Identity,
        Self::MirrorH,
        Self::Rotate180,
        Self::MirrorV,
        Self::Rotate90MirrorH,
        Self::Rotate90,
        Self::Rotate270MirrorH,
        Self::Rotate270,
    ];

    /// Create from an EXIF orientation tag (1-8). Returns `None` for invalid values.
    pub fn from_exif(value: u8) -> Option<Self> {
        if (1..=8).contains(&value) {
            Some(Self::ALL[(value - 1) as usize])
        } else {
            None
        }
    }

    /// Convert back to the EXIF orientation tag (1-8).
    pub fn to_exif(self) -> u8 {
        Self::ALL
            .iter()
            .position(|&t| t == self)
            .map_or(1, |i| (i + 1) as u8)
    }

    /// Primitive operations in application order.
    pub fn steps(self) -> &'static [Step] {
        match self {
            Transform::Identity => &[],
            Transform::MirrorH => &[Step::MirrorH],
            Transform::Rotate180 => &[Step::Rotate180],
            // rot180 + mirror-h collapses to a single vertical mirror
            Transform::MirrorV => &[Step::MirrorV],
            Transform::Rotate90MirrorH => &[Step::Rotate90, Step::MirrorH],
            Transform::Rotate90 => &[Step::Rotate90],
            Transform::Rotate270MirrorH => &[Step::Rotate270, Step::MirrorH],
            Transform::Rotate270 => &[Step::Rotate270],
        }
    }

    pub fn is_identity(self) -> bool {
        self == Transform::Identity
    }

    /// Whether this transform swaps width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(
            self,
            Transform::Rotate90
                | Transform::Rotate270
                | Transform::Rotate90MirrorH
                | Transform::Rotate270MirrorH
        )
    }

    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        self.steps().iter().fold(image, |img, step| step.apply(img))
    }

    pub fn apply_to_size(self, size: (u32, u32)) -> (u32, u32) {
        self.steps().iter().fold(size, |s, step| step.apply_to_size(s))
    }
}

impl From<image::metadata::Orientation> for Transform {
    fn from(o: image::metadata::Orientation) -> Self {
        use image::metadata::Orientation;
        #[allow(unreachable_patterns)]
        match o {
            Orientation::NoTransforms => Transform::Identity,
            Orientation::FlipHorizontal => Transform::MirrorH,
            Orientation::Rotate180 => Transform::Rotate180,
            Orientation::FlipVertical => Transform::MirrorV,
            Orientation::Rotate90FlipH => Transform::Rotate90MirrorH,
            Orientation::Rotate90 => Transform::Rotate90,
            Orientation::Rotate270FlipH => Transform::Rotate270MirrorH,
            Orientation::Rotate270 => Transform::Rotate270,
            _ => Transform::Identity,
        }
    }
}

/// Returns `image` in canonical orientation given its optional EXIF tag.
///
/// A missing or out-of-range tag leaves the image unchanged. The result carries no
/// orientation of its own, so normalizing it again with `None` is a no-op.
pub fn normalize(image: DynamicImage, orientation: Option<u8>) -> DynamicImage {
    match orientation.and_then(Transform::from_exif) {
        Some(t) if !t.is_identity() => t.apply(image),
        _ => image,
    }
}
