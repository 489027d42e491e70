//! Resolution of image references to dimensions and pixels.

use crate::error::{CollageError, Result};
use crate::orientation::Transform;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::collections::HashMap;
use std::path::Path;

/// Resolves image references of type `K`.
///
/// Both methods report sizes and pixels in canonical orientation. A failure is a
/// per-image load error: callers skip the reference and carry on.
pub trait ImageSource<K>: Sync {
    /// Oriented `(width, height)`, without decoding pixels where the format allows.
    fn dimensions(&self, key: &K) -> Result<(u32, u32)>;
    /// Decoded, orientation-normalized image.
    fn open(&self, key: &K) -> Result<DynamicImage>;
}

/// Reads images from the filesystem, honouring the EXIF orientation tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl<K: AsRef<Path>> ImageSource<K> for FsSource {
    fn dimensions(&self, key: &K) -> Result<(u32, u32)> {
        let mut decoder = ImageReader::open(key.as_ref())?
            .with_guessed_format()?
            .into_decoder()?;
        let transform = read_transform(&mut decoder);
        Ok(transform.apply_to_size(decoder.dimensions()))
    }

    fn open(&self, key: &K) -> Result<DynamicImage> {
        let mut decoder = ImageReader::open(key.as_ref())?
            .with_guessed_format()?
            .into_decoder()?;
        let transform = read_transform(&mut decoder);
        let image = DynamicImage::from_decoder(decoder)?;
        Ok(transform.apply(image))
    }
}

// Absent or unreadable metadata is the common case and means "no transform".
fn read_transform(decoder: &mut impl ImageDecoder) -> Transform {
    decoder
        .orientation()
        .map(Transform::from)
        .unwrap_or_default()
}

/// In-memory images keyed by name, each with an optional EXIF orientation tag.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    images: HashMap<String, (DynamicImage, Option<u8>)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, image: DynamicImage) {
        self.images.insert(key.into(), (image, None));
    }

    /// Inserts an image as stored on disk, i.e. before its orientation is applied.
    pub fn insert_oriented(&mut self, key: impl Into<String>, image: DynamicImage, orientation: u8) {
        self.images.insert(key.into(), (image, Some(orientation)));
    }

    pub fn with(mut self, key: impl Into<String>, image: DynamicImage) -> Self {
        self.insert(key, image);
        self
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    fn entry(&self, key: &str) -> Result<&(DynamicImage, Option<u8>)> {
        self.images
            .get(key)
            .ok_or_else(|| CollageError::UnknownKey(key.to_string()))
    }
}

impl<K: AsRef<str>> ImageSource<K> for MemorySource {
    fn dimensions(&self, key: &K) -> Result<(u32, u32)> {
        let (image, orientation) = self.entry(key.as_ref())?;
        let transform = orientation.and_then(Transform::from_exif).unwrap_or_default();
        Ok(transform.apply_to_size((image.width(), image.height())))
    }

    fn open(&self, key: &K) -> Result<DynamicImage> {
        let (image, orientation) = self.entry(key.as_ref())?;
        Ok(crate::orientation::normalize(image.clone(), *orientation))
    }
}
