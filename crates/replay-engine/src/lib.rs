//! Replay engine for NetSim chart traces
//! Scrubs a recorded trace forward and backward, keeping every series,
//! collection and log stream consistent with the cursor time

mod apply;
pub mod catalog;
pub mod engine;
pub mod logs;
pub mod queue;
pub mod ranges;
pub mod registry;
pub mod selection;
pub mod snapshot;
pub mod synthetic;

pub use catalog::{catalog, SeriesListing};
pub use engine::{Direction, DrainReport, ReplayEngine};
pub use logs::{LogStream, UnifiedEntry, UnifiedLog};
pub use queue::{EventOrigin, ForwardQueue, UndoKind, UndoRecord, UndoStack};
pub use ranges::{RangePropagator, RangeSnapshot};
pub use registry::{CategorySample, CategorySeries, Collection, Entity, EntityRegistry, PointSeries};
pub use selection::{SelectionBoard, ViewId, ViewSlot};
pub use snapshot::{EntitySnapshot, ReplaySnapshot};

pub use netsim_replay_config::{EngineSettings, RangeRewindPolicy, SortOrder};
pub use netsim_replay_shared::{ReplayError, ReplayResult, Trace, TraceEvent};
