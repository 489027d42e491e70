use crate::geometry::fit_within;
use crate::model::Row;

/// An image reference with its oriented, full-resolution size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizedImage<K> {
    pub key: K,
    pub size: (u32, u32),
}

impl<K> SizedImage<K> {
    pub fn new(key: K, w: u32, h: u32) -> Self {
        Self { key, size: (w, h) }
    }

    /// Width after shrinking (never enlarging) into a `width x row_height` box.
    pub fn packed_width(&self, width: u32, row_height: u32) -> u32 {
        fit_within(self.size, (width, row_height)).0
    }
}

/// Splits `items` into rows, in order, for one target row height.
///
/// Soft wrap: a row is closed only once its accumulated width is strictly greater
/// than `width`, checked before the next image is added. A row can therefore run
/// past `width` by up to one image. The last row is always closed, even when empty.
pub fn fill_rows<K: Clone>(
    items: &[SizedImage<K>],
    width: u32,
    row_height: u32,
    margin: u32,
) -> Vec<Row<K>> {
    let mut rows = Vec::new();
    let mut line: Vec<K> = Vec::new();
    let mut x = 0u32;
    for item in items {
        if x > width {
            rows.push(Row::close(x, width, std::mem::take(&mut line)));
            x = 0;
        }
        x = x
            .saturating_add(item.packed_width(width, row_height))
            .saturating_add(margin);
        line.push(item.key.clone());
    }
    rows.push(Row::close(x, width, line));
    rows
}
