//! Order book depth search shared by the planner and the execution engine.

use crate::domain::book::PriceLevel;
use crate::domain::money::Price;
use crate::domain::pair::PairMetadata;

/// Index of the first level at or after `start` with a positive price and a
/// size within the pair's `[min_qty, max_qty]` bounds.
#[must_use]
pub fn find_workable_depth(levels: &[PriceLevel], start: usize, meta: &PairMetadata) -> Option<usize> {
    levels
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, level)| {
            level.price() > Price::ZERO && level.size() >= meta.min_qty && level.size() <= meta.max_qty
        })
        .map(|(idx, _)| idx)
}
