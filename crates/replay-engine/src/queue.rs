//! Forward queue and undo stack
//!
//! Between them they always hold every recorded event of the trace: pending
//! events wait in the forward queue, applied ones sit on the undo stack with
//! what is needed to invert them. Synthetic records only ever live on the
//! undo stack.

use crate::ranges::RangeSnapshot;
use netsim_replay_shared::{
    AppendCategoryValue, AppendLog, AppendPoint, AppendPoints, ClearSeries, EntityId,
    Nanoseconds, Point, TraceEvent,
};
use std::collections::VecDeque;

/// Pending events, ordered by non-decreasing time
#[derive(Debug, Clone, Default)]
pub struct ForwardQueue {
    events: VecDeque<TraceEvent>,
}

impl ForwardQueue {
    /// Build from a trace's events. The sort is stable, so events sharing
    /// a timestamp keep their recorded order.
    pub fn from_events(mut events: Vec<TraceEvent>) -> Self {
        events.sort_by_key(TraceEvent::time);
        Self {
            events: events.into(),
        }
    }

    pub fn front(&self) -> Option<&TraceEvent> {
        self.events.front()
    }

    pub fn front_time(&self) -> Option<Nanoseconds> {
        self.events.front().map(TraceEvent::time)
    }

    /// Time between the first and last pending event
    pub fn span(&self) -> Nanoseconds {
        match (self.events.front(), self.events.back()) {
            (Some(first), Some(last)) => last.time().saturating_sub(first.time()),
            _ => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter()
    }

    pub(crate) fn pop_front(&mut self) -> Option<TraceEvent> {
        self.events.pop_front()
    }

    pub(crate) fn push_front(&mut self, event: TraceEvent) {
        self.events.push_front(event);
    }
}

/// Where an applied event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrigin {
    /// Part of the loaded trace
    Recorded,
    /// Fabricated to keep an auto-advancing series moving
    Synthetic,
}

/// The applied event plus its minimal rollback payload
#[derive(Debug, Clone, PartialEq)]
pub enum UndoKind {
    /// Rollback drops the last sample
    AppendPoint(AppendPoint),
    /// Rollback drops the last `count` samples
    AppendPoints { event: AppendPoints, count: usize },
    /// Rollback restores `cleared` verbatim
    ClearSeries {
        event: ClearSeries,
        cleared: Vec<Point>,
    },
    /// Rollback drops the last sample and restores `last_updated`
    AppendCategoryValue {
        event: AppendCategoryValue,
        previous_update: Nanoseconds,
    },
    /// Rollback drops the last log entry
    AppendLog(AppendLog),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UndoRecord {
    pub kind: UndoKind,
    pub origin: EventOrigin,
    /// Ranges before the event, kept only under the restore rewind policy
    pub ranges: Option<RangeSnapshot>,
}

impl UndoRecord {
    pub fn time(&self) -> Nanoseconds {
        match &self.kind {
            UndoKind::AppendPoint(e) => e.time,
            UndoKind::AppendPoints { event, .. } => event.time,
            UndoKind::ClearSeries { event, .. } => event.time,
            UndoKind::AppendCategoryValue { event, .. } => event.time,
            UndoKind::AppendLog(e) => e.time,
        }
    }

    pub fn entity_id(&self) -> EntityId {
        match &self.kind {
            UndoKind::AppendPoint(e) => e.entity_id,
            UndoKind::AppendPoints { event, .. } => event.entity_id,
            UndoKind::ClearSeries { event, .. } => event.entity_id,
            UndoKind::AppendCategoryValue { event, .. } => event.entity_id,
            UndoKind::AppendLog(e) => e.entity_id,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.origin == EventOrigin::Synthetic
    }
}

/// Applied events, newest on top
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    records: Vec<UndoRecord>,
    synthetic: usize,
}

impl UndoStack {
    pub fn top(&self) -> Option<&UndoRecord> {
        self.records.last()
    }

    /// All records, recorded and synthetic
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records of events that came from the trace
    pub fn recorded_len(&self) -> usize {
        self.records.len() - self.synthetic
    }

    pub fn synthetic_len(&self) -> usize {
        self.synthetic
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &UndoRecord> {
        self.records.iter()
    }

    pub(crate) fn push(&mut self, record: UndoRecord) {
        if record.is_synthetic() {
            self.synthetic += 1;
        }
        self.records.push(record);
    }

    /// Pop the top record if it was applied strictly after `time`
    pub(crate) fn pop_after(&mut self, time: Nanoseconds) -> Option<UndoRecord> {
        if self.records.last()?.time() <= time {
            return None;
        }
        let record = self.records.pop()?;
        if record.is_synthetic() {
            self.synthetic -= 1;
        }
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear(entity_id: EntityId, time: Nanoseconds) -> TraceEvent {
        ClearSeries { entity_id, time }.into()
    }

    #[test]
    fn test_forward_queue_stable_time_order() {
        let queue = ForwardQueue::from_events(vec![clear(1, 20), clear(2, 10), clear(3, 20), clear(4, 10)]);

        let order: Vec<EntityId> = queue.iter().map(TraceEvent::entity_id).collect();
        assert_eq!(order, vec![2, 4, 1, 3]);
        assert_eq!(queue.front_time(), Some(10));
        assert_eq!(queue.front().map(TraceEvent::entity_id), Some(2));
        assert_eq!(queue.span(), 10);
        assert_eq!(ForwardQueue::default().span(), 0);
    }

    #[test]
    fn test_undo_stack_pop_after() {
        let mut stack = UndoStack::default();
        stack.push(UndoRecord {
            kind: UndoKind::ClearSeries {
                event: ClearSeries { entity_id: 1, time: 5 },
                cleared: vec![],
            },
            origin: EventOrigin::Recorded,
            ranges: None,
        });
        stack.push(UndoRecord {
            kind: UndoKind::AppendCategoryValue {
                event: AppendCategoryValue {
                    entity_id: 2,
                    time: 8,
                    value: 1.0,
                    category: 0,
                },
                previous_update: 0,
            },
            origin: EventOrigin::Synthetic,
            ranges: None,
        });
        assert_eq!(stack.recorded_len(), 1);
        assert_eq!(stack.synthetic_len(), 1);

        assert!(stack.pop_after(8).is_none());
        let popped = stack.pop_after(7).unwrap();
        assert!(popped.is_synthetic());
        assert_eq!(stack.synthetic_len(), 0);

        assert!(stack.pop_after(5).is_none());
        assert_eq!(stack.pop_after(4).unwrap().time(), 5);
        assert!(stack.pop_after(i64::MIN).is_none());
    }
}
