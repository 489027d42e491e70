use crate::model::Layout;
use serde_json::{Value, json};

/// Serialize a `Layout` as `{ rows, meta }`, with each row's canvas offset and height
/// resolved for `margin`. Empty rows are left out, as they are at render time.
pub fn layout_to_json<K: ToString>(layout: &Layout<K>, margin: u32) -> Value {
    let mut y = 0u32;
    let rows_val = layout
        .non_empty_rows()
        .enumerate()
        .map(|(index, row)| {
            let height = row.rendered_height(layout.row_height, margin);
            let images: Vec<String> = row.items.iter().map(ToString::to_string).collect();
            let val = json!({
                "index": index,
                "y": y,
                "height": height,
                "coefficient": row.coefficient,
                "extent": row.extent,
                "images": images,
            });
            y = y.saturating_add(height);
            val
        })
        .collect::<Vec<_>>();
    let skipped: Vec<String> = layout.skipped.iter().map(ToString::to_string).collect();
    json!({
        "rows": rows_val,
        "meta": {
            "app": "collage",
            "version": env!("CARGO_PKG_VERSION"),
            "width": layout.width,
            "height": y,
            "rowHeight": layout.row_height,
            "initialRowHeight": layout.initial_row_height,
            "attempts": layout.attempts,
            "margin": margin,
            "skipped": skipped,
        }
    })
}
