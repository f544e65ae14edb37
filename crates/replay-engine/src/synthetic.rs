//! Keep-alive events for auto-advancing category series
//!
//! A series with `auto_advance` set gets one fabricated sample per elapsed
//! `advance_interval` since its last update. The fabricated sample repeats
//! the last category and moves x forward by `advance_increment`, so an idle
//! series keeps drawing without the trace recording redundant samples.

use crate::registry::{CategorySeries, EntityRegistry};
use netsim_replay_shared::{AppendCategoryValue, Nanoseconds};

/// The keep-alive event `series` would receive next, if any.
///
/// Needs at least one existing sample to copy the category from.
pub fn next_for_series(series: &CategorySeries) -> Option<AppendCategoryValue> {
    if !series.auto_advances() {
        return None;
    }

    let last = series.samples().last()?;
    let due = series
        .last_updated()
        .checked_add(series.def().advance_interval)?;

    Some(AppendCategoryValue {
        entity_id: series.id(),
        time: due,
        value: last.x + series.def().advance_increment,
        category: last.category,
    })
}

/// Earliest keep-alive event due at or before `until`.
///
/// Ties between series resolve to the lower entity id.
pub fn next_due(registry: &EntityRegistry, until: Nanoseconds) -> Option<AppendCategoryValue> {
    registry
        .auto_advancing()
        .iter()
        .filter_map(|&id| registry.category_series(id))
        .filter_map(next_for_series)
        .filter(|event| event.time <= until)
        .min_by_key(|event| (event.time, event.entity_id))
}

/// Upper bound on keep-alive events fabricated while the cursor moves
/// forward across `span` nanoseconds.
///
/// Every elapsed interval becomes one undo record, so this is also the
/// memory cost of such a move.
pub fn max_keep_alives(registry: &EntityRegistry, span: Nanoseconds) -> u64 {
    let span = span.max(0);
    registry
        .auto_advancing()
        .iter()
        .filter_map(|&id| registry.category_series(id))
        .filter_map(|series| span.checked_div(series.def().advance_interval))
        .map(|count| u64::try_from(count).unwrap_or(0))
        .fold(0u64, u64::saturating_add)
}
