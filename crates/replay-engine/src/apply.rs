//! Forward-apply and inverse-apply for each event kind

use crate::queue::{EventOrigin, UndoKind, UndoRecord};
use crate::ranges::RangePropagator;
use crate::registry::{CategorySample, CategorySeries, EntityRegistry, PointSeries};
use netsim_replay_shared::{EntityId, Nanoseconds, ReplayError, ReplayResult, TraceEvent};

fn point_series(
    registry: &mut EntityRegistry,
    id: EntityId,
    time: Nanoseconds,
) -> ReplayResult<&mut PointSeries> {
    registry
        .point_series_mut(id)
        .ok_or(ReplayError::UnknownEntity { id, time })
}

fn category_series(
    registry: &mut EntityRegistry,
    id: EntityId,
    time: Nanoseconds,
) -> ReplayResult<&mut CategorySeries> {
    registry
        .category_series_mut(id)
        .ok_or(ReplayError::UnknownEntity { id, time })
}

/// Apply `event` to its target and return the record that inverts it
pub(crate) fn apply_event(
    registry: &mut EntityRegistry,
    propagator: &RangePropagator,
    event: TraceEvent,
    origin: EventOrigin,
) -> ReplayResult<UndoRecord> {
    registry.validate_event(&event)?;

    let ranges = propagator.capture(registry, event.entity_id());
    let padding = propagator.padding();

    let kind = match event {
        TraceEvent::AppendPoint(e) => {
            point_series(registry, e.entity_id, e.time)?.append(e.point, padding);
            propagator.propagate(registry, e.entity_id, e.point);
            UndoKind::AppendPoint(e)
        }
        TraceEvent::AppendPoints(e) => {
            let series = point_series(registry, e.entity_id, e.time)?;
            for point in &e.points {
                series.append(*point, padding);
            }
            for point in &e.points {
                propagator.propagate(registry, e.entity_id, *point);
            }
            let count = e.points.len();
            UndoKind::AppendPoints { event: e, count }
        }
        TraceEvent::ClearSeries(e) => {
            let cleared = point_series(registry, e.entity_id, e.time)?.take_samples();
            UndoKind::ClearSeries { event: e, cleared }
        }
        TraceEvent::AppendCategoryValue(e) => {
            let sample = CategorySample {
                x: e.value,
                category: e.category,
            };
            let previous_update =
                category_series(registry, e.entity_id, e.time)?.append(sample, e.time, padding);
            UndoKind::AppendCategoryValue {
                event: e,
                previous_update,
            }
        }
        TraceEvent::AppendLog(e) => {
            if !registry.append_log(e.entity_id, &e.text) {
                return Err(ReplayError::UnknownEntity {
                    id: e.entity_id,
                    time: e.time,
                });
            }
            UndoKind::AppendLog(e)
        }
    };

    Ok(UndoRecord {
        kind,
        origin,
        ranges,
    })
}

/// Invert an applied record. Returns the original event when it should go
/// back onto the forward queue; synthetic events are dropped.
pub(crate) fn invert_record(
    registry: &mut EntityRegistry,
    record: UndoRecord,
) -> ReplayResult<Option<TraceEvent>> {
    let UndoRecord {
        kind,
        origin,
        ranges,
    } = record;

    let event: TraceEvent = match kind {
        UndoKind::AppendPoint(e) => {
            point_series(registry, e.entity_id, e.time)?.truncate_by(1);
            e.into()
        }
        UndoKind::AppendPoints { event, count } => {
            point_series(registry, event.entity_id, event.time)?.truncate_by(count);
            event.into()
        }
        UndoKind::ClearSeries { event, cleared } => {
            point_series(registry, event.entity_id, event.time)?.restore_samples(cleared);
            event.into()
        }
        UndoKind::AppendCategoryValue {
            event,
            previous_update,
        } => {
            category_series(registry, event.entity_id, event.time)?.remove_last(previous_update);
            event.into()
        }
        UndoKind::AppendLog(e) => {
            if !registry.pop_log(e.entity_id) {
                return Err(ReplayError::UnknownEntity {
                    id: e.entity_id,
                    time: e.time,
                });
            }
            e.into()
        }
    };

    if let Some(snapshot) = &ranges {
        RangePropagator::restore(registry, snapshot);
    }

    Ok(match origin {
        EventOrigin::Recorded => Some(event),
        EventOrigin::Synthetic => None,
    })
}
