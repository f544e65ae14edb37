//! Bidirectional timeline replay engine
//!
//! Moving the cursor forward drains the forward queue up to the new time,
//! interleaving keep-alive events for auto-advancing series in time order.
//! Moving it backward pops the undo stack, inverting everything applied
//! strictly after the new time and handing recorded events back to the
//! front of the forward queue. Both drains only touch events between the
//! previous and the new cursor time.

use crate::apply::{apply_event, invert_record};
use crate::queue::{EventOrigin, ForwardQueue, UndoStack};
use crate::ranges::RangePropagator;
use crate::registry::EntityRegistry;
use crate::snapshot::ReplaySnapshot;
use crate::synthetic;
use netsim_replay_config::EngineSettings;
use netsim_replay_shared::{Nanoseconds, ReplayError, ReplayResult, Trace, TraceEvent};
use serde::Serialize;

/// Keep-alive counts above this get a warning at load, each one is an undo record
const KEEP_ALIVE_WARN_THRESHOLD: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Non-negative deltas move forward, including a repeat of the same time
    pub fn between(from: Nanoseconds, to: Nanoseconds) -> Self {
        if to >= from {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }
}

/// What a single `set_time` call did
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DrainReport {
    pub direction: Direction,
    pub from: Nanoseconds,
    pub to: Nanoseconds,
    /// Recorded events applied
    pub applied: usize,
    /// Keep-alive events fabricated and applied
    pub synthesized: usize,
    /// Recorded events inverted and requeued
    pub inverted: usize,
    /// Keep-alive events inverted and dropped
    pub discarded_synthetic: usize,
}

impl DrainReport {
    fn new(from: Nanoseconds, to: Nanoseconds) -> Self {
        Self {
            direction: Direction::between(from, to),
            from,
            to,
            applied: 0,
            synthesized: 0,
            inverted: 0,
            discarded_synthetic: 0,
        }
    }

    /// Number of events that crossed between the queue and the stack
    pub fn drained(&self) -> usize {
        self.applied + self.synthesized + self.inverted + self.discarded_synthetic
    }

    pub fn is_noop(&self) -> bool {
        self.drained() == 0
    }
}

/// Owns the registry, forward queue and undo stack of one loaded trace
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    registry: EntityRegistry,
    forward: ForwardQueue,
    undo: UndoStack,
    propagator: RangePropagator,
    settings: EngineSettings,
    current_time: Nanoseconds,
    total_events: usize,
    aborted: Option<String>,
}

impl ReplayEngine {
    /// Build the registry, validate every event against it and queue the
    /// events in time order.
    ///
    /// The cursor starts at 0, or just before the earliest event when the
    /// trace has events at negative times, so the first `set_time` never
    /// skips a pending event.
    pub fn load(trace: Trace, settings: EngineSettings) -> ReplayResult<Self> {
        let registry = EntityRegistry::from_trace(&trace).inspect_err(|err| {
            log::error!("[ReplayEngine] Rejecting trace: {}", err);
        })?;

        for event in &trace.events {
            registry.validate_event(event).inspect_err(|err| {
                log::error!("[ReplayEngine] Rejecting trace: {}", err);
            })?;
        }

        if !trace.is_time_sorted() {
            log::warn!("[ReplayEngine] Trace events are not time-sorted, sorting on load");
        }

        let total_events = trace.events.len();
        let forward = ForwardQueue::from_events(trace.events);
        let trace_span = forward.span();
        let start_time = forward
            .front_time()
            .filter(|&first| first < 0)
            .map_or(0, |first| first.saturating_sub(1));
        let propagator = RangePropagator::new(settings.range_padding, settings.range_rewind);

        log::info!(
            "[ReplayEngine] Loaded trace: {} entities, {} events, cursor at {}, range rewind {:?}",
            registry.len(),
            total_events,
            start_time,
            propagator.rewind_policy()
        );

        if settings.synthetic_events {
            let keep_alives = synthetic::max_keep_alives(&registry, trace_span);
            if keep_alives > KEEP_ALIVE_WARN_THRESHOLD {
                log::warn!(
                    "[ReplayEngine] Replaying to the last event fabricates up to {} keep-alive events",
                    keep_alives
                );
            }
        }

        Ok(Self {
            registry,
            forward,
            undo: UndoStack::default(),
            propagator,
            settings,
            current_time: start_time,
            total_events,
            aborted: None,
        })
    }

    /// Replace the loaded trace. On error the current session is kept as is.
    pub fn reload(&mut self, trace: Trace) -> ReplayResult<()> {
        *self = Self::load(trace, self.settings.clone())?;
        Ok(())
    }

    /// Move the cursor to `time`, draining forward or backward depending on
    /// the sign of `time - current_time`.
    ///
    /// An integrity violation during a drain aborts the session: this and
    /// every later call fail until a new trace is loaded.
    pub fn set_time(&mut self, time: Nanoseconds) -> ReplayResult<DrainReport> {
        if let Some(reason) = &self.aborted {
            return Err(ReplayError::SessionAborted {
                reason: reason.clone(),
            });
        }

        let mut report = DrainReport::new(self.current_time, time);
        let result = match report.direction {
            Direction::Forward => self.drain_forward(time, &mut report),
            Direction::Backward => self.drain_backward(time, &mut report),
        };

        if let Err(err) = result {
            log::error!(
                "[ReplayEngine] Integrity violation while draining {} -> {}: {}",
                report.from,
                time,
                err
            );
            log::warn!("[ReplayEngine] Session aborted until a new trace is loaded");
            self.aborted = Some(err.to_string());
            return Err(err);
        }

        self.current_time = time;
        if !report.is_noop() {
            log::debug!(
                "[ReplayEngine] {:?} {} -> {}: applied={} synthesized={} inverted={} discarded={}",
                report.direction,
                report.from,
                report.to,
                report.applied,
                report.synthesized,
                report.inverted,
                report.discarded_synthetic
            );
        }
        Ok(report)
    }

    fn drain_forward(&mut self, target: Nanoseconds, report: &mut DrainReport) -> ReplayResult<()> {
        loop {
            let next_recorded = self.forward.front_time().filter(|&t| t <= target);
            let next_synthetic = if self.settings.synthetic_events {
                synthetic::next_due(&self.registry, target)
            } else {
                None
            };

            // Recorded events win ties so a same-time update resets the idle clock
            let take_recorded = match (next_recorded, &next_synthetic) {
                (Some(recorded), Some(fabricated)) => recorded <= fabricated.time,
                (Some(_), None) => true,
                (None, _) => false,
            };

            let (event, origin) = if take_recorded {
                match self.forward.pop_front() {
                    Some(event) => (event, EventOrigin::Recorded),
                    None => break,
                }
            } else if let Some(fabricated) = next_synthetic {
                (TraceEvent::from(fabricated), EventOrigin::Synthetic)
            } else {
                break;
            };

            log::trace!(
                "[ReplayEngine] Apply {} ({:?}) to {} at {}",
                event.name(),
                origin,
                event.entity_id(),
                event.time()
            );

            let record = apply_event(&mut self.registry, &self.propagator, event, origin)?;
            match origin {
                EventOrigin::Recorded => report.applied += 1,
                EventOrigin::Synthetic => report.synthesized += 1,
            }
            self.undo.push(record);
        }

        Ok(())
    }

    fn drain_backward(&mut self, target: Nanoseconds, report: &mut DrainReport) -> ReplayResult<()> {
        while let Some(record) = self.undo.pop_after(target) {
            log::trace!(
                "[ReplayEngine] Invert record for {} at {} (synthetic: {})",
                record.entity_id(),
                record.time(),
                record.is_synthetic()
            );

            match invert_record(&mut self.registry, record)? {
                Some(event) => {
                    self.forward.push_front(event);
                    report.inverted += 1;
                }
                None => report.discarded_synthetic += 1,
            }
        }

        Ok(())
    }

    pub fn current_time(&self) -> Nanoseconds {
        self.current_time
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn forward_queue(&self) -> &ForwardQueue {
        &self.forward
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Recorded events still waiting to be applied
    pub fn pending_events(&self) -> usize {
        self.forward.len()
    }

    /// Recorded events currently applied
    pub fn applied_events(&self) -> usize {
        self.undo.recorded_len()
    }

    /// Keep-alive events currently applied
    pub fn synthetic_events(&self) -> usize {
        self.undo.synthetic_len()
    }

    /// Number of recorded events in the loaded trace
    pub fn total_events(&self) -> usize {
        self.total_events
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    pub fn snapshot(&self) -> ReplaySnapshot {
        ReplaySnapshot::capture(
            &self.registry,
            self.current_time,
            self.pending_events(),
            self.applied_events(),
            self.synthetic_events(),
        )
    }
}
