use super::rows::{SizedImage, fill_rows};
use crate::config::CollageConfig;
use crate::model::{Layout, Row};
use tracing::{debug, warn};

/// States of the row-height convergence search.
///
/// `Packing` fills rows for a row height, `Evaluating` decides whether the rows are
/// balanced, `Converged` holds the accepted layout and is a fixpoint.
#[derive(Debug, Clone)]
pub enum PackState<K> {
    Packing {
        row_height: u32,
        attempt: u32,
    },
    Evaluating {
        row_height: u32,
        attempt: u32,
        rows: Vec<Row<K>>,
    },
    Converged(Layout<K>),
}

impl<K> PackState<K> {
    pub fn start(cfg: &CollageConfig) -> Self {
        PackState::Packing {
            row_height: cfg.row_height,
            attempt: 1,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, PackState::Converged(_))
    }
}

/// What `Evaluating` concludes about a set of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Zero or one row: nothing to rebalance.
    SingleRow,
    /// Every row holds at least two images.
    Balanced,
    /// Some row holds one image (or none) while other rows exist.
    Orphaned,
}

pub fn evaluate<K>(rows: &[Row<K>]) -> Verdict {
    if rows.len() <= 1 {
        Verdict::SingleRow
    } else if rows.iter().any(|r| r.len() <= 1) {
        Verdict::Orphaned
    } else {
        Verdict::Balanced
    }
}

/// Advances the search by one step. Pure: the same inputs always give the same state.
pub fn transition<K: Clone>(
    state: PackState<K>,
    items: &[SizedImage<K>],
    skipped: &[K],
    cfg: &CollageConfig,
) -> PackState<K> {
    match state {
        PackState::Packing {
            row_height,
            attempt,
        } => PackState::Evaluating {
            row_height,
            attempt,
            rows: fill_rows(items, cfg.width, row_height, cfg.margin),
        },
        PackState::Evaluating {
            row_height,
            attempt,
            rows,
        } => {
            let verdict = evaluate(&rows);
            debug!(attempt, row_height, rows = rows.len(), ?verdict, "evaluated packing");
            if verdict != Verdict::Orphaned {
                return converge(rows, row_height, attempt, skipped, cfg);
            }
            match row_height.checked_sub(cfg.shrink_step).filter(|h| *h >= 1) {
                Some(next) => PackState::Packing {
                    row_height: next,
                    attempt: attempt + 1,
                },
                None => {
                    warn!(
                        row_height,
                        attempt, "row height exhausted with single-image rows left; accepting"
                    );
                    converge(rows, row_height, attempt, skipped, cfg)
                }
            }
        }
        done @ PackState::Converged(_) => done,
    }
}

fn converge<K: Clone>(
    rows: Vec<Row<K>>,
    row_height: u32,
    attempts: u32,
    skipped: &[K],
    cfg: &CollageConfig,
) -> PackState<K> {
    PackState::Converged(Layout {
        rows,
        width: cfg.width,
        row_height,
        initial_row_height: cfg.row_height,
        attempts,
        skipped: skipped.to_vec(),
    })
}
