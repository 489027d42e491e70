use serde::{Deserialize, Serialize};

/// A horizontal band of the collage.
///
/// `extent` is the raw accumulated width of the row at packing scale, margins
/// included; `coefficient` is `extent / target width`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Row<K = String> {
    pub coefficient: f64,
    pub extent: u32,
    pub items: Vec<K>,
}

impl<K> Row<K> {
    /// Closes a row whose accumulated width is `extent` on a `width` wide canvas.
    pub fn close(extent: u32, width: u32, items: Vec<K>) -> Self {
        Self {
            coefficient: extent as f64 / width as f64,
            extent,
            items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Height every image in this row is scaled to at render time.
    pub fn target_height(&self, row_height: u32) -> f64 {
        row_height as f64 / self.coefficient
    }

    /// Vertical space the row occupies on the canvas (0 for an empty row).
    pub fn rendered_height(&self, row_height: u32, margin: u32) -> u32 {
        if self.is_empty() {
            return 0;
        }
        (self.target_height(row_height).floor() as u32).saturating_add(margin)
    }
}

/// Result of packing: ordered rows plus the geometry that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout<K = String> {
    pub rows: Vec<Row<K>>,
    /// Target canvas width.
    pub width: u32,
    /// Row height the accepted packing was computed with.
    pub row_height: u32,
    /// Row height the packer started from.
    pub initial_row_height: u32,
    /// Number of packing attempts (1 when the first packing was accepted).
    pub attempts: u32,
    /// Inputs dropped because their dimensions could not be read.
    pub skipped: Vec<K>,
}

impl<K> Layout<K> {
    pub fn non_empty_rows(&self) -> impl Iterator<Item = &Row<K>> {
        self.rows.iter().filter(|r| !r.is_empty())
    }

    /// All placed keys in row order, then intra-row order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.rows.iter().flat_map(|r| r.items.iter())
    }

    pub fn image_count(&self) -> usize {
        self.rows.iter().map(Row::len).sum()
    }

    /// True when some row holds at most one image while other rows exist.
    pub fn has_orphans(&self) -> bool {
        self.rows.len() > 1 && self.rows.iter().any(|r| r.len() <= 1)
    }

    /// Canvas height: sum of the rendered heights of all non-empty rows.
    pub fn canvas_height(&self, margin: u32) -> u64 {
        self.non_empty_rows()
            .map(|r| r.rendered_height(self.row_height, margin) as u64)
            .sum()
    }
}

/// Outcome of the compositing pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderReport {
    /// Images pasted onto the canvas.
    pub images_used: usize,
    /// Images that failed to reload while rendering.
    pub render_failures: usize,
    pub width: u32,
    pub height: u32,
}

/// Summary of a whole collage run, returned instead of printed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollageReport {
    /// Image references handed to the packer.
    pub images_total: usize,
    pub images_used: usize,
    /// References dropped while probing dimensions.
    pub images_skipped: usize,
    pub render_failures: usize,
    /// Non-empty rows on the canvas.
    pub rows: usize,
    pub attempts: u32,
    pub initial_row_height: u32,
    pub final_row_height: u32,
    pub width: u32,
    pub height: u32,
    pub greyscale: bool,
}

impl CollageReport {
    pub fn new<K>(layout: &Layout<K>, render: &RenderReport, images_total: usize, greyscale: bool) -> Self {
        Self {
            images_total,
            images_used: render.images_used,
            images_skipped: layout.skipped.len(),
            render_failures: render.render_failures,
            rows: layout.non_empty_rows().count(),
            attempts: layout.attempts,
            initial_row_height: layout.initial_row_height,
            final_row_height: layout.row_height,
            width: render.width,
            height: render.height,
            greyscale,
        }
    }

    /// Images that did not make it onto the canvas for any reason.
    pub fn images_dropped(&self) -> usize {
        self.images_skipped + self.render_failures
    }

    /// Returns a human-readable summary of the run.
    pub fn summary(&self) -> String {
        format!(
            "{} photos used, Skipped: {}, Rows: {}, Row height: {} -> {} px ({} attempts), Canvas: {}x{}{}",
            self.images_used,
            self.images_dropped(),
            self.rows,
            self.initial_row_height,
            self.final_row_height,
            self.attempts,
            self.width,
            self.height,
            if self.greyscale { " (greyscale)" } else { "" },
        )
    }
}
