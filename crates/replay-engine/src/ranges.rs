//! Range propagation to aggregate collections

use crate::registry::EntityRegistry;
use netsim_replay_config::RangeRewindPolicy;
use netsim_replay_shared::{AxisRange, EntityId, Point};

/// Axis ranges of a set of entities captured before an event touched them
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSnapshot {
    entries: Vec<(EntityId, AxisRange, AxisRange)>,
}

impl RangeSnapshot {
    pub fn entries(&self) -> &[(EntityId, AxisRange, AxisRange)] {
        &self.entries
    }
}

/// Widens collection ranges as member series receive values.
///
/// Under [`RangeRewindPolicy::Restore`] it also captures the ranges an event
/// may touch so the undo of that event can put them back.
#[derive(Debug, Clone, Copy)]
pub struct RangePropagator {
    padding: f64,
    rewind: RangeRewindPolicy,
}

impl RangePropagator {
    pub fn new(padding: f64, rewind: RangeRewindPolicy) -> Self {
        Self { padding, rewind }
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    pub fn rewind_policy(&self) -> RangeRewindPolicy {
        self.rewind
    }

    /// Widen every collection containing `series_id`. Returns how many
    /// collections changed.
    pub fn propagate(&self, registry: &mut EntityRegistry, series_id: EntityId, point: Point) -> usize {
        let mut widened = 0;
        registry.for_each_collection_containing(series_id, |collection| {
            if collection.observe(point, self.padding) {
                log::trace!(
                    "[RangePropagator] Collection {} widened for series {}: x={:?} y={:?}",
                    collection.id(),
                    series_id,
                    collection.x_range(),
                    collection.y_range()
                );
                widened += 1;
            }
        });
        widened
    }

    /// Ranges of `entity_id` and of every collection containing it, or
    /// `None` when ranges are monotone and nothing needs saving
    pub fn capture(&self, registry: &EntityRegistry, entity_id: EntityId) -> Option<RangeSnapshot> {
        if self.rewind == RangeRewindPolicy::Monotone {
            return None;
        }

        let entries = std::iter::once(entity_id)
            .chain(registry.collections_containing(entity_id).iter().copied())
            .filter_map(|id| {
                let entity = registry.get(id).ok()?;
                let (x, y) = entity.ranges()?;
                Some((id, x, y))
            })
            .collect();

        Some(RangeSnapshot { entries })
    }

    pub fn restore(registry: &mut EntityRegistry, snapshot: &RangeSnapshot) {
        for &(id, x, y) in &snapshot.entries {
            if let Some(entity) = registry.entity_mut(id) {
                entity.set_ranges(x, y);
            }
        }
    }
}
